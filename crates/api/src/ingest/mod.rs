//! News ingestion.
//!
//! Pulls recent articles for every stored tag from a [`NewsSource`] and
//! writes them through the [`ContentStore`]:
//!
//! ```text
//! list_all_tags -> fetch_for_tag (per tag) -> merge_by_url -> create_article
//!                                                          -> add_tags_to_article
//! ```
//!
//! The same story is usually returned for several tags. Results are merged
//! by URL so each article is written once and carries every tag it was
//! found under. Writes are idempotent, so re-running an ingest only adds
//! what is new. There are no retries: the first failing request or write
//! aborts the run.

pub mod newsapi;

pub use newsapi::NewsApiClient;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use newsdesk_core::TagId;

use crate::db::{ContentStore, RepositoryError};
use crate::models::{NewArticle, Tag};

/// Errors that can occur while ingesting news.
#[derive(Debug, Error)]
pub enum IngestError {
    /// HTTP request to the news source failed.
    #[error("news source request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The news source answered with a non-success status.
    #[error("news source returned status {status} for tag '{tag}'")]
    Status { tag: String, status: u16 },

    /// The news source reported an error in its response body.
    #[error("news source rejected the request: {0}")]
    Rejected(String),

    /// The search URL could not be built.
    #[error("invalid news source URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One article as reported by a news source, already normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArticle {
    pub title: String,
    pub body: String,
    pub author: String,
    /// Source URL, the merge and storage key.
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// A source of news articles searchable by tag.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch recent articles matching `tag`.
    async fn fetch_for_tag(&self, tag: &Tag) -> Result<Vec<FetchedArticle>, IngestError>;
}

/// A fetched article together with every tag it was found under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedArticle {
    pub article: FetchedArticle,
    /// Each tag at most once, in the order the article was found under them.
    pub tags: Vec<TagId>,
}

/// Counts reported after an ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Tags searched.
    pub tags: usize,
    /// Articles returned by the source, before merging.
    pub fetched: usize,
    /// Distinct articles written.
    pub articles: usize,
    /// Article-tag links written.
    pub tag_links: usize,
}

/// Merge per-tag results by article URL.
///
/// The first occurrence of a URL decides the article's fields and its
/// position in the output; later occurrences only contribute their tag.
pub fn merge_by_url<I>(batches: I) -> Vec<MergedArticle>
where
    I: IntoIterator<Item = (TagId, Vec<FetchedArticle>)>,
{
    let mut merged: Vec<MergedArticle> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (tag_id, articles) in batches {
        for article in articles {
            if let Some(entry) = index.get(&article.url).and_then(|&i| merged.get_mut(i)) {
                if !entry.tags.contains(&tag_id) {
                    entry.tags.push(tag_id);
                }
                continue;
            }

            index.insert(article.url.clone(), merged.len());
            merged.push(MergedArticle {
                article,
                tags: vec![tag_id],
            });
        }
    }

    merged
}

/// Fetch news for every stored tag and write it into the content store.
///
/// # Errors
///
/// Returns the first source or store error. Articles written before the
/// failure stay written.
pub async fn run(
    store: &dyn ContentStore,
    source: &dyn NewsSource,
) -> Result<IngestSummary, IngestError> {
    let tags = store.list_all_tags().await?;
    let mut summary = IngestSummary {
        tags: tags.len(),
        ..IngestSummary::default()
    };

    let mut batches = Vec::with_capacity(tags.len());
    for tag in &tags {
        let articles = source.fetch_for_tag(tag).await?;
        tracing::debug!(tag = %tag.name, tag_id = %tag.id, fetched = articles.len(), "Fetched news for tag");
        summary.fetched += articles.len();
        batches.push((tag.id, articles));
    }

    for merged in merge_by_url(batches) {
        let MergedArticle { article, tags } = merged;
        let id = store
            .create_article(&NewArticle {
                title: article.title,
                body: article.body,
                author: article.author,
                url: Some(article.url),
                created_at: article.published_at,
            })
            .await?;
        store.add_tags_to_article(id, &tags).await?;

        summary.articles += 1;
        summary.tag_links += tags.len();
    }

    tracing::info!(
        tags = summary.tags,
        fetched = summary.fetched,
        articles = summary.articles,
        tag_links = summary.tag_links,
        "Ingest complete"
    );
    Ok(summary)
}
