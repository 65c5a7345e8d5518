use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: i64,
    pub actor_id: i64,
    pub action: String,
    pub target_type: String,
    pub target_id: i64,
    pub details: String,
}

/// Record a workflow mutation. Callers ignore the result: a failed audit
/// write never fails the request.
pub async fn log(
    pool: &PgPool,
    actor_id: i64,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Value,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "INSERT INTO audit_log (actor_id, action, target_type, target_id, details) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(actor_id)
    .bind(action)
    .bind(target_type)
    .bind(target_id)
    .bind(details.to_string())
    .execute(pool)
    .await;

    if let Err(e) = result {
        log::warn!("Audit write for {action} failed: {e}");
        return Err(e.into());
    }
    Ok(())
}

/// Most recent entries first.
pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<AuditEntry>, AppError> {
    let rows = sqlx::query_as::<_, AuditEntry>(
        "SELECT id, actor_id, action, target_type, target_id, details \
         FROM audit_log ORDER BY id DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
