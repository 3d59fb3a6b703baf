//! NewsAPI `everything` search client.
//!
//! One request per tag: `q=<tag name>`, English only, newest first, limited
//! to the configured lookback window. The key travels in the `X-Api-Key`
//! header so it never appears in logged URLs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{FetchedArticle, IngestError, NewsSource};
use crate::config::NewsApiConfig;
use crate::models::Tag;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const UNKNOWN_AUTHOR: &str = "Unknown";
/// Title NewsAPI substitutes for articles withdrawn by their publisher.
const REMOVED_TITLE: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

/// Client for the NewsAPI search endpoint.
#[derive(Clone)]
pub struct NewsApiClient {
    inner: Arc<NewsApiClientInner>,
}

struct NewsApiClientInner {
    client: reqwest::Client,
    api_key: SecretString,
    url: String,
    lookback: chrono::Duration,
    page_size: u32,
}

impl NewsApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &NewsApiConfig) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            inner: Arc::new(NewsApiClientInner {
                client,
                api_key: config.api_key.clone(),
                url: config.url.clone(),
                lookback: config.lookback,
                page_size: config.page_size,
            }),
        })
    }

    fn search_url(&self, query: &str, now: DateTime<Utc>) -> Result<Url, IngestError> {
        let from = (now - self.inner.lookback).format("%Y-%m-%d").to_string();
        let mut url = Url::parse(&self.inner.url)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("from", &from)
            .append_pair("language", "en")
            .append_pair("sortBy", "publishedAt")
            .append_pair("pageSize", &self.inner.page_size.to_string());
        Ok(url)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(skip(self, tag), fields(tag = %tag.name))]
    async fn fetch_for_tag(&self, tag: &Tag) -> Result<Vec<FetchedArticle>, IngestError> {
        let url = self.search_url(&tag.name, Utc::now())?;

        let response = self
            .inner
            .client
            .get(url)
            .header("X-Api-Key", self.inner.api_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "News search failed");
            return Err(IngestError::Status {
                tag: tag.name.clone(),
                status: status.as_u16(),
            });
        }

        let body: EverythingResponse = response.json().await?;
        into_articles(body)
    }
}

fn into_articles(response: EverythingResponse) -> Result<Vec<FetchedArticle>, IngestError> {
    if response.status != "ok" {
        return Err(IngestError::Rejected(
            response.message.unwrap_or(response.status),
        ));
    }
    Ok(response.articles.into_iter().filter_map(normalize).collect())
}

/// Convert one API entry, dropping entries that cannot be stored.
///
/// The body falls back to the description when the content is missing, and
/// the author to `"Unknown"`.
fn normalize(entry: ApiArticle) -> Option<FetchedArticle> {
    let url = non_empty(entry.url)?;
    let title = non_empty(entry.title).filter(|t| t != REMOVED_TITLE)?;

    Some(FetchedArticle {
        title,
        body: non_empty(entry.content)
            .or_else(|| non_empty(entry.description))
            .unwrap_or_default(),
        author: non_empty(entry.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        url,
        published_at: entry.published_at,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
