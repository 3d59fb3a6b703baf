//! Database migration command.
//!
//! Applies the schema migrations in `crates/api/migrations/` and creates the
//! session store's table.

use tower_sessions_sqlx_store::PostgresStore;

use newsdesk_api::db::MIGRATOR;

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running schema migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete");
    Ok(())
}
