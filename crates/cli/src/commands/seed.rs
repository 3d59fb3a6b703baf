//! Seed the content store from a JSON file.

use std::path::Path;

use newsdesk_api::db::PgNewsRepository;
use newsdesk_api::seed::{self, SeedFile};

/// Load `path` and write its articles and tags.
///
/// The file is parsed and validated before connecting to the database.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or a store
/// operation fails.
pub async fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(path = %path.display(), "Loading seed file");
    let file = SeedFile::load(path)?;
    tracing::info!(articles = file.articles.len(), "Parsed seed file");

    let pool = super::connect().await?;
    let store = PgNewsRepository::new(pool);

    let summary = seed::apply(&store, &file).await?;
    tracing::info!(
        articles = summary.articles,
        tag_links = summary.tag_links,
        "Seeding complete"
    );
    Ok(())
}
