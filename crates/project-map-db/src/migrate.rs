use sqlx::PgPool;
use tracing::info;

/// Create or upgrade the `project_map` table and its `(sector, id)` index
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running project_map migrations...");
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    info!("Database migrations completed");
    Ok(())
}
