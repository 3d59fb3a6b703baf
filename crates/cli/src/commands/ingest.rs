//! Fetch news for every stored tag and store it.

use newsdesk_api::config::NewsApiConfig;
use newsdesk_api::db::PgNewsRepository;
use newsdesk_api::ingest::{self, NewsApiClient};

/// Run one ingest pass against the news API.
///
/// Configuration is validated before connecting to the database.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, a news request
/// fails, or a store operation fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = NewsApiConfig::from_env()?;
    let source = NewsApiClient::new(&config)?;

    let pool = super::connect().await?;
    let store = PgNewsRepository::new(pool);

    let summary = ingest::run(&store, &source).await?;
    tracing::info!(
        tags = summary.tags,
        articles = summary.articles,
        "Ingest finished"
    );
    Ok(())
}
