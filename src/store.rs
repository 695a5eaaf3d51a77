//! Connection pool setup.

use crate::error::AppError;
use crate::settings::Settings;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Opens the shared pool. Every repository clones this handle; the pool is the only shared state.
pub async fn connect(settings: &Settings) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .acquire_timeout(settings.request_timeout)
        .connect(&settings.database_url)
        .await?;
    tracing::info!(max_connections = settings.db_max_connections, "database pool ready");
    Ok(pool)
}
