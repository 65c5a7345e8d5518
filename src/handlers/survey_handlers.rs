use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::context::Actor;
use crate::errors::AppError;
use crate::models::{shortlist, survey};
use crate::models::survey::{EntryDataForm, RemarksForm, SupervisorVerificationForm};
use crate::responses::{ApiResponse, SUCCESS_GET, SUCCESS_SAVE};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// GET /api/survey/entry/{id} - `id` is a shortlist row or a planning record.
pub async fn entry(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let data = survey::get_entry_data(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, data)))
}

/// GET /api/survey-kuisioner/get-data-survey?token=
pub async fn entry_by_token(
    pool: web::Data<PgPool>,
    query: web::Query<TokenQuery>,
) -> Result<HttpResponse, AppError> {
    let shortlist_id = shortlist::resolve_token(&pool, &query.token).await?;
    let data = survey::get_entry_data(&pool, shortlist_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, data)))
}

/// POST /api/survey/entry
pub async fn save_entry(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<EntryDataForm>,
) -> Result<HttpResponse, AppError> {
    let saved = survey::save_entry_data(&pool, &body).await?;

    let details = serde_json::json!({
        "planning_id": body.planning_id,
        "vendor_id": body.vendor_id,
        "items_saved": saved.items_saved,
        "summary": "Survey entry data saved"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "survey.entry_saved", "shortlist", saved.shortlist_id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, saved)))
}

/// POST /api/survey/remarks
pub async fn save_remarks(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<RemarksForm>,
) -> Result<HttpResponse, AppError> {
    let remarks = survey::save_remarks(&pool, &body).await?;

    let details = serde_json::json!({
        "field_officer_id": remarks.field_officer_id,
        "supervisor_id": remarks.supervisor_id,
        "summary": "Survey remarks saved"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "survey.remarks_saved", "planning", remarks.planning_id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, remarks)))
}

pub async fn remarks(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let remarks = survey::find_remarks(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, remarks)))
}

/// POST /api/survey/verification - Supervisor notes and checks.
pub async fn submit_verification(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<SupervisorVerificationForm>,
) -> Result<HttpResponse, AppError> {
    let record = survey::submit_supervisor_verification(&pool, &body).await?;

    let details = serde_json::json!({
        "vendor_id": body.vendor_id,
        "checks": body.checks.len(),
        "status": record.status,
        "summary": "Supervisor verification submitted"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "survey.verified", "planning", record.id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, record)))
}

pub async fn checks(
    pool: web::Data<PgPool>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (vendor_id, planning_id) = path.into_inner();
    let rows = survey::list_checks(&pool, vendor_id, planning_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, rows)))
}
