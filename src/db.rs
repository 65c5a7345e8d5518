use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::errors::AppError;

/// Embedded schema migrations from `migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn init_pool(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    log::info!(
        "Database pool ready (max {} connections)",
        config.db_max_connections
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}
