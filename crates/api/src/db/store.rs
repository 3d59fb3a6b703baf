//! Store traits the HTTP layer depends on.

use async_trait::async_trait;

use newsdesk_core::{ArticleId, Email, TagId, UserId};

use super::RepositoryResult;
use crate::models::{Article, NewArticle, Tag, User};

/// Persistence for readers, keyed by the identity provider's subject identifier.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert the user or update its email, returning the stored row.
    ///
    /// Must be a single atomic operation: concurrent first logins for the same
    /// `external_id` yield one user with one internal ID.
    async fn upsert_user(&self, external_id: &str, email: &Email) -> RepositoryResult<User>;

    /// Look a user up by the provider's subject identifier.
    async fn get_user_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<User>>;

    /// Look a user up by email.
    async fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;
}

/// Persistence and aggregation for articles, tags and favorites.
///
/// Every article returned carries exactly the tags linked to it at query time,
/// each once. Lists of articles are ordered newest first.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Get one article with its tags.
    async fn get_article(&self, id: ArticleId) -> RepositoryResult<Option<Article>>;

    /// List every article, newest first.
    async fn list_articles(&self) -> RepositoryResult<Vec<Article>>;

    /// List the articles linked to `tag_id`, newest first.
    async fn list_articles_by_tag(&self, tag_id: TagId) -> RepositoryResult<Vec<Article>>;

    /// List the tags linked to one article.
    async fn list_tags_for_article(&self, article_id: ArticleId) -> RepositoryResult<Vec<Tag>>;

    /// List every tag.
    async fn list_all_tags(&self) -> RepositoryResult<Vec<Tag>>;

    /// Mark `tag_id` as a favorite of `user_id`. Adding twice is a no-op.
    ///
    /// Returns [`super::RepositoryError::NotFound`] if the tag or user does not exist.
    async fn add_favorite(&self, user_id: UserId, tag_id: TagId) -> RepositoryResult<()>;

    /// Remove a favorite. Removing a missing link is a no-op.
    async fn remove_favorite(&self, user_id: UserId, tag_id: TagId) -> RepositoryResult<()>;

    /// List the user's favorite tags.
    async fn list_favorite_tags(&self, user_id: UserId) -> RepositoryResult<Vec<Tag>>;

    /// List articles linked to any of the user's favorite tags, each once,
    /// newest first.
    async fn list_favorite_articles(&self, user_id: UserId) -> RepositoryResult<Vec<Article>>;

    /// Create a tag, or return the existing tag with the same name.
    async fn create_tag(&self, name: &str) -> RepositoryResult<Tag>;

    /// Store an article, or return the ID of the existing article with the same URL.
    async fn create_article(&self, article: &NewArticle) -> RepositoryResult<ArticleId>;

    /// Link tags to an article. Existing links are left as they are.
    async fn add_tags_to_article(
        &self,
        article_id: ArticleId,
        tag_ids: &[TagId],
    ) -> RepositoryResult<()>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> RepositoryResult<()>;
}
