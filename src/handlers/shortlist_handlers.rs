use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::context::Actor;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::shortlist::{self, QuestionnaireUrlForm, SelectionForm, ShortlistBatch};
use crate::models::shortlist::matcher::SubstringMatcher;
use crate::responses::{ApiResponse, SUCCESS_GET, SUCCESS_SAVE};

/// GET /api/shortlist/suggest/{planning_id} - Matching vendors per kind.
pub async fn suggest(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let candidates = shortlist::suggest_vendors(&pool, &SubstringMatcher, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, candidates)))
}

/// POST /api/shortlist - Confirm vendors for a planning record.
pub async fn store(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<ShortlistBatch>,
) -> Result<HttpResponse, AppError> {
    if body.vendors.is_empty() {
        return Err(AppError::Validation("at least one vendor is required".to_string()));
    }

    let mut entries = Vec::with_capacity(body.vendors.len());
    for form in &body.vendors {
        entries.push(shortlist::store_entry(&pool, body.planning_id, form).await?);
    }

    let details = serde_json::json!({
        "vendor_ids": entries.iter().map(|e| e.vendor_id).collect::<Vec<_>>(),
        "summary": format!("{} vendor(s) shortlisted", entries.len())
    });
    let _ = crate::audit::log(&pool, actor.user_id, "shortlist.stored", "planning", body.planning_id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, entries)))
}

pub async fn list(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let entries = shortlist::list_by_planning(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, entries)))
}

/// POST /api/shortlist/selection - Resource ids picked for the questionnaire.
pub async fn save_selection(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<SelectionForm>,
) -> Result<HttpResponse, AppError> {
    let saved = shortlist::save_selected_resource_ids(&pool, &body).await?;

    let details = serde_json::json!({
        "vendor_id": body.vendor_id,
        "selection": saved,
        "summary": "Questionnaire resources selected"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "shortlist.selection_saved", "planning", body.planning_id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, saved)))
}

pub async fn read_selection(
    pool: web::Data<PgPool>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (planning_id, vendor_id) = path.into_inner();
    let selection = shortlist::find_selection(&pool, planning_id, vendor_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, selection)))
}

/// GET /api/shortlist/questionnaire-url/{planning_id}/{vendor_id}
pub async fn read_questionnaire_url(
    pool: web::Data<PgPool>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (planning_id, vendor_id) = path.into_inner();
    let entry = shortlist::find_by_vendor(&pool, planning_id, vendor_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SUCCESS_GET,
        serde_json::json!({ "shortlist_id": entry.id, "url_kuisioner": entry.questionnaire_url }),
    )))
}

/// GET /api/shortlist/{id}/identify/{planning_id}
pub async fn identify(
    pool: web::Data<PgPool>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (shortlist_id, planning_id) = path.into_inner();
    let items = shortlist::identify_by_shortlist(&pool, shortlist_id, planning_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, items)))
}

/// POST /api/shortlist/questionnaire-url
pub async fn save_questionnaire_url(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<QuestionnaireUrlForm>,
) -> Result<HttpResponse, AppError> {
    let entry = shortlist::save_questionnaire_url(&pool, &body).await?;

    let details = serde_json::json!({
        "vendor_id": entry.vendor_id,
        "url": entry.questionnaire_url,
        "summary": "Questionnaire document attached"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "shortlist.questionnaire_saved", "shortlist", entry.id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, entry)))
}

/// POST /api/shortlist/{id}/link - Time-limited questionnaire link.
pub async fn generate_link(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let shortlist_id = path.into_inner();
    let link = shortlist::generate_link(
        &pool,
        &config.public_base_url,
        config.survey_link_expire_days,
        shortlist_id,
    )
    .await?;

    let details = serde_json::json!({
        "expires_at": link.expires_at,
        "summary": "Questionnaire link generated"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "shortlist.link_generated", "shortlist", shortlist_id, details).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(SUCCESS_SAVE, link)))
}
