use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::audit;
use crate::errors::AppError;
use crate::responses::{ApiResponse, SUCCESS_GET};

#[derive(Deserialize)]
pub struct AuditQuery {
    limit: Option<i64>,
}

/// GET /api/audit?limit= - Latest workflow mutations, newest first.
pub async fn list(
    pool: web::Data<PgPool>,
    query: web::Query<AuditQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let entries = audit::recent(&pool, limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, entries)))
}
