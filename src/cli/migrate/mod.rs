//! Migrate command - creates the PostgreSQL schema for the credential store

use tracing::info;

use crate::infrastructure::storage::{connect_pool, run_storage_migrations};

/// Apply pending migrations to `storage.database_url`
pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;

    let pool = connect_pool(&crate::postgres_config(&config)?).await?;
    let version = run_storage_migrations(&pool).await?;

    match version {
        Some(v) => info!(version = v, "Database schema is up to date"),
        None => info!("No migrations applied"),
    }

    pool.close().await;

    Ok(())
}
