//! CLI subcommands.

pub mod ingest;
pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;

use newsdesk_api::db;

/// Connect using `POSTGRES_CONN_STR`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    let database_url = std::env::var("POSTGRES_CONN_STR")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "POSTGRES_CONN_STR not set")?;

    let pool = db::create_pool(&database_url).await?;
    tracing::info!("Connected to database");
    Ok(pool)
}
