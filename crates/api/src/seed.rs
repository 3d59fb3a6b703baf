//! News seed files.
//!
//! A seed file is a JSON array of articles:
//!
//! ```json
//! [
//!   {
//!     "title": "Rust 2024 edition released",
//!     "content": "...",
//!     "author": "Desk",
//!     "url": "https://example.com/rust-2024",
//!     "tags": ["tech", "rust"]
//!   }
//! ]
//! ```
//!
//! The article text is read from `body`; `content` is accepted as an alias
//! for it. Applying a seed is idempotent: tags are matched by name, articles
//! by URL, and existing links are left alone. The file is loaded once by the
//! caller and passed by reference.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::db::{ContentStore, RepositoryError};
use crate::models::NewArticle;

/// Errors that can occur while loading or applying a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("article #{index} is invalid: {reason}")]
    Invalid { index: usize, reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One article in a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedArticle {
    pub title: String,
    #[serde(alias = "content")]
    pub body: String,
    pub author: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A parsed seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SeedFile {
    pub articles: Vec<SeedArticle>,
}

/// Counts reported after applying a seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub articles: usize,
    pub tag_links: usize,
}

impl SeedFile {
    /// Parse a seed file from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for malformed JSON and `SeedError::Invalid`
    /// for articles with an empty title, author or tag name.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let file: Self = serde_json::from_str(json)?;
        file.validate()?;
        Ok(file)
    }

    /// Read and parse a seed file from disk.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Io` if the file cannot be read, otherwise the
    /// errors of [`SeedFile::from_json`].
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), SeedError> {
        for (index, article) in self.articles.iter().enumerate() {
            let reason = if article.title.trim().is_empty() {
                Some("empty title")
            } else if article.author.trim().is_empty() {
                Some("empty author")
            } else if article.tags.iter().any(|t| t.trim().is_empty()) {
                Some("empty tag name")
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(SeedError::Invalid {
                    index,
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Write a seed into the content store.
///
/// # Errors
///
/// Returns the first store error; earlier articles stay written, and
/// re-running the seed completes the rest.
pub async fn apply(store: &dyn ContentStore, seed: &SeedFile) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    for article in &seed.articles {
        let id = store
            .create_article(&NewArticle {
                title: article.title.trim().to_string(),
                body: article.body.clone(),
                author: article.author.trim().to_string(),
                url: article.url.clone().filter(|u| !u.trim().is_empty()),
                created_at: article.published_at,
            })
            .await?;

        let mut tag_ids = Vec::with_capacity(article.tags.len());
        for name in &article.tags {
            tag_ids.push(store.create_tag(name.trim()).await?.id);
        }
        store.add_tags_to_article(id, &tag_ids).await?;

        summary.articles += 1;
        summary.tag_links += tag_ids.len();
    }

    tracing::info!(
        articles = summary.articles,
        tag_links = summary.tag_links,
        "Seed applied"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    const SEED: &str = r#"[
        {
            "title": "Match report",
            "content": "Home side wins.",
            "author": "Sports desk",
            "url": "https://news.test/match",
            "tags": ["sports"]
        },
        {
            "title": "Chip launch",
            "body": "New silicon.",
            "author": "Tech desk",
            "url": "https://news.test/chip",
            "published_at": "2025-03-01T12:00:00Z",
            "tags": ["tech", "sports", "tech"]
        }
    ]"#;

    #[test]
    fn test_parse_accepts_content_and_body() {
        let seed = SeedFile::from_json(SEED).unwrap();
        assert_eq!(seed.articles.len(), 2);
        assert_eq!(seed.articles[0].body, "Home side wins.");
        assert_eq!(seed.articles[1].body, "New silicon.");
        assert!(seed.articles[1].published_at.is_some());
    }

    #[test]
    fn test_parse_rejects_empty_title() {
        let json = r#"[{"title": " ", "body": "b", "author": "a"}]"#;
        assert!(matches!(
            SeedFile::from_json(json),
            Err(SeedError::Invalid { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let store = MemoryStore::new();
        let seed = SeedFile::from_json(SEED).unwrap();

        apply(&store, &seed).await.unwrap();
        apply(&store, &seed).await.unwrap();

        let articles = store.list_articles().await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(store.list_all_tags().await.unwrap().len(), 2);

        let chip = articles.iter().find(|a| a.title == "Chip launch").unwrap();
        assert_eq!(chip.tags.len(), 2);
    }
}
