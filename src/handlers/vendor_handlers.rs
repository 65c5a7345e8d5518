use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::context::Actor;
use crate::errors::AppError;
use crate::models::vendor::{self, NewVendor, VendorWithResources};
use crate::responses::{ApiResponse, SUCCESS_GET, SUCCESS_SAVE};

pub async fn list(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let vendors = vendor::list_summaries(&pool).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, vendors)))
}

/// GET /api/vendors/{id} - Vendor with its declared resources.
pub async fn read(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let found = vendor::find_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;
    let resources = vendor::find_resources(&pool, id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SUCCESS_GET,
        VendorWithResources { vendor: found, resources },
    )))
}

/// POST /api/vendors
pub async fn create(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<NewVendor>,
) -> Result<HttpResponse, AppError> {
    let created = vendor::create(&pool, &body).await?;

    let details = serde_json::json!({
        "name": created.name,
        "resources": body.resources.len(),
        "summary": format!("Vendor '{}' registered", created.name)
    });
    let _ = crate::audit::log(&pool, actor.user_id, "vendor.created", "vendor", created.id, details).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(SUCCESS_SAVE, created)))
}
