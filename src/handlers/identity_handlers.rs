use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::context::Actor;
use crate::errors::AppError;
use crate::models::identity::{self, IdentityClaims, RegistrationForm, RoleUpdate};
use crate::responses::{ApiResponse, SUCCESS_GET, SUCCESS_SAVE};
use crate::storage::StorageUrls;

/// POST /api/identity/sync - Create or refresh the local user behind
/// verified provider claims.
pub async fn sync(
    pool: web::Data<PgPool>,
    body: web::Json<IdentityClaims>,
) -> Result<HttpResponse, AppError> {
    let user = identity::sync_external(&pool, &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, user)))
}

/// POST /api/identity/sync/batch - One page of the provider directory.
pub async fn sync_batch(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<Vec<IdentityClaims>>,
) -> Result<HttpResponse, AppError> {
    let synced = identity::sync_batch(&pool, &body).await?;
    log::info!("Directory sync: {synced} of {} entries applied", body.len());

    let details = serde_json::json!({
        "received": body.len(),
        "synced": synced,
        "summary": "Directory page synced"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "identity.synced", "identity", 0, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SUCCESS_SAVE,
        serde_json::json!({ "synced": synced }),
    )))
}

/// POST /api/identity/register - Self registration.
pub async fn register(
    pool: web::Data<PgPool>,
    body: web::Json<RegistrationForm>,
) -> Result<HttpResponse, AppError> {
    let id = identity::register(&pool, &body).await?;

    let details = serde_json::json!({
        "nik": body.nik,
        "email": body.email,
        "summary": "User registered"
    });
    let _ = crate::audit::log(&pool, id, "identity.registered", "identity", id, details).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        SUCCESS_SAVE,
        serde_json::json!({ "id": id }),
    )))
}

/// POST /api/identity/role
pub async fn update_role(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<RoleUpdate>,
) -> Result<HttpResponse, AppError> {
    let user = identity::update_role(&pool, body.user_id, &body.role).await?;

    let details = serde_json::json!({
        "role": body.role,
        "summary": format!("Role set to {}", body.role)
    });
    let _ = crate::audit::log(&pool, actor.user_id, "identity.role_updated", "identity", user.id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, user)))
}

pub async fn list_roles(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let roles = identity::list_roles(&pool).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, roles)))
}

/// GET /api/identity/pending - Registrations awaiting verification.
pub async fn list_pending(
    pool: web::Data<PgPool>,
    urls: web::Data<StorageUrls>,
) -> Result<HttpResponse, AppError> {
    let users = identity::list_pending_verification(&pool, &urls).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, users)))
}

pub async fn read(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let user = identity::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, user)))
}

/// GET /api/identity/external/{external_id} - Lookup by directory id.
pub async fn read_external(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = identity::find_by_external_id(&pool, path.trim())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, user)))
}
