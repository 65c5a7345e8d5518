use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::context::Actor;
use crate::errors::AppError;
use crate::models::requirement::{self, RequirementItemForm, RequirementKind};
use crate::responses::{ApiResponse, SUCCESS_GET, SUCCESS_SAVE};

fn kind_from_path(raw: &str) -> Result<RequirementKind, AppError> {
    RequirementKind::parse(raw)
        .ok_or_else(|| AppError::Validation(format!("unknown requirement kind '{raw}'")))
}

/// GET /api/requirements/{planning_id} - All items grouped by kind.
pub async fn list_all(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let items = requirement::items_by_kind(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, items)))
}

pub async fn list_kind(
    pool: web::Data<PgPool>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse, AppError> {
    let (planning_id, kind) = path.into_inner();
    let kind = kind_from_path(&kind)?;
    let items = requirement::list_by_planning(&pool, planning_id, kind).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, items)))
}

/// POST /api/requirements/{planning_id}/{kind} - Create or update one item.
pub async fn store(
    pool: web::Data<PgPool>,
    actor: Actor,
    path: web::Path<(i64, String)>,
    body: web::Json<RequirementItemForm>,
) -> Result<HttpResponse, AppError> {
    let (planning_id, kind) = path.into_inner();
    let kind = kind_from_path(&kind)?;
    let item = requirement::store_item(&pool, planning_id, kind, &body).await?;

    let details = serde_json::json!({
        "kind": kind,
        "name": item.name,
        "planning_id": planning_id,
        "summary": format!("{kind} item '{}' saved", item.name)
    });
    let _ = crate::audit::log(&pool, actor.user_id, "requirement.saved", "requirement_item", item.id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, item)))
}
