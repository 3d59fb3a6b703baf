//! Article and tag domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use newsdesk_core::{ArticleId, TagId};

/// A tag articles can be filed under and readers can favorite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// An article together with every tag linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Linked tags, each at most once.
    pub tags: Vec<Tag>,
}

/// An article about to be stored.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub author: String,
    /// Source URL; articles with the same URL are stored once.
    pub url: Option<String>,
    /// Publication time; defaults to the time of insertion.
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of an article ⟷ tag join.
///
/// Join queries return one of these per (article, tag) pair. `tag_id` and
/// `tag_name` are `NULL` for an article without tags under an outer join.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleTagRow {
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    pub author: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tag_id: Option<TagId>,
    pub tag_name: Option<String>,
}

impl ArticleTagRow {
    /// The tag carried by this row, if the join produced one.
    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        match (self.tag_id, &self.tag_name) {
            (Some(id), Some(name)) => Some(Tag {
                id,
                name: name.clone(),
            }),
            _ => None,
        }
    }
}
