//! In-memory store for tests and local development.
//!
//! Implements both store traits over plain collections guarded by a single
//! async mutex. Article queries build the same join rows `PostgreSQL` would
//! return and run them through [`group_article_rows`], so both backends share
//! the aggregation code path.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use newsdesk_core::{ArticleId, Email, TagId, UserId};

use super::{ContentStore, IdentityStore, RepositoryError, RepositoryResult, group_article_rows};
use crate::models::{Article, ArticleTagRow, NewArticle, Tag, User};

#[derive(Debug, Clone)]
struct StoredArticle {
    id: ArticleId,
    title: String,
    body: String,
    author: String,
    url: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tags: Vec<Tag>,
    articles: Vec<StoredArticle>,
    article_tags: BTreeSet<(ArticleId, TagId)>,
    favorites: BTreeSet<(UserId, TagId)>,
    next_user_id: i32,
    next_tag_id: i32,
    next_article_id: i32,
}

impl Tables {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    /// One join row per (article, tag) pair, plus a tagless row for untagged
    /// articles, for every article accepted by `filter`.
    fn join_rows(&self, filter: impl Fn(ArticleId) -> bool) -> Vec<ArticleTagRow> {
        let mut rows = Vec::new();
        for article in self.articles.iter().filter(|a| filter(a.id)) {
            let linked: Vec<&Tag> = self
                .article_tags
                .range((article.id, TagId::new(i32::MIN))..=(article.id, TagId::new(i32::MAX)))
                .filter_map(|(_, tag_id)| self.tags.iter().find(|t| t.id == *tag_id))
                .collect();

            let base = ArticleTagRow {
                id: article.id,
                title: article.title.clone(),
                body: article.body.clone(),
                author: article.author.clone(),
                url: article.url.clone(),
                created_at: article.created_at,
                tag_id: None,
                tag_name: None,
            };

            if linked.is_empty() {
                rows.push(base);
            } else {
                rows.extend(linked.into_iter().map(|tag| ArticleTagRow {
                    tag_id: Some(tag.id),
                    tag_name: Some(tag.name.clone()),
                    ..base.clone()
                }));
            }
        }
        rows
    }
}

/// In-memory implementation of [`IdentityStore`] and [`ContentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while set, every operation fails with
    /// [`RepositoryError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> RepositoryResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn upsert_user(&self, external_id: &str, email: &Email) -> RepositoryResult<User> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;

        if let Some(user) = tables.users.iter_mut().find(|u| u.external_id == external_id) {
            user.email = email.clone();
            return Ok(user.clone());
        }

        let user = User {
            id: UserId::new(Tables::next_id(&mut tables.next_user_id)),
            external_id: external_id.to_owned(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == *email).cloned())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_article(&self, id: ArticleId) -> RepositoryResult<Option<Article>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        let rows = tables.join_rows(|article_id| article_id == id);
        Ok(group_article_rows(rows).into_iter().next())
    }

    async fn list_articles(&self) -> RepositoryResult<Vec<Article>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(group_article_rows(tables.join_rows(|_| true)))
    }

    async fn list_articles_by_tag(&self, tag_id: TagId) -> RepositoryResult<Vec<Article>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        let rows = tables.join_rows(|id| tables.article_tags.contains(&(id, tag_id)));
        Ok(group_article_rows(rows))
    }

    async fn list_tags_for_article(&self, article_id: ArticleId) -> RepositoryResult<Vec<Tag>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .tags
            .iter()
            .filter(|t| tables.article_tags.contains(&(article_id, t.id)))
            .cloned()
            .collect())
    }

    async fn list_all_tags(&self) -> RepositoryResult<Vec<Tag>> {
        self.check_available()?;
        Ok(self.tables.lock().await.tags.clone())
    }

    async fn add_favorite(&self, user_id: UserId, tag_id: TagId) -> RepositoryResult<()> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;

        let tag_exists = tables.tags.iter().any(|t| t.id == tag_id);
        let user_exists = tables.users.iter().any(|u| u.id == user_id);
        if !tag_exists || !user_exists {
            return Err(RepositoryError::NotFound("tag or user".to_owned()));
        }

        tables.favorites.insert((user_id, tag_id));
        Ok(())
    }

    async fn remove_favorite(&self, user_id: UserId, tag_id: TagId) -> RepositoryResult<()> {
        self.check_available()?;
        self.tables.lock().await.favorites.remove(&(user_id, tag_id));
        Ok(())
    }

    async fn list_favorite_tags(&self, user_id: UserId) -> RepositoryResult<Vec<Tag>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .tags
            .iter()
            .filter(|t| tables.favorites.contains(&(user_id, t.id)))
            .cloned()
            .collect())
    }

    async fn list_favorite_articles(&self, user_id: UserId) -> RepositoryResult<Vec<Article>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        let rows = tables.join_rows(|id| {
            tables
                .article_tags
                .iter()
                .any(|(a, t)| *a == id && tables.favorites.contains(&(user_id, *t)))
        });
        Ok(group_article_rows(rows))
    }

    async fn create_tag(&self, name: &str) -> RepositoryResult<Tag> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;

        if let Some(tag) = tables.tags.iter().find(|t| t.name == name) {
            return Ok(tag.clone());
        }

        let tag = Tag {
            id: TagId::new(Tables::next_id(&mut tables.next_tag_id)),
            name: name.to_owned(),
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }

    async fn create_article(&self, article: &NewArticle) -> RepositoryResult<ArticleId> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;

        if let Some(url) = &article.url
            && let Some(existing) = tables
                .articles
                .iter()
                .find(|a| a.url.as_deref() == Some(url.as_str()))
        {
            return Ok(existing.id);
        }

        let id = ArticleId::new(Tables::next_id(&mut tables.next_article_id));
        tables.articles.push(StoredArticle {
            id,
            title: article.title.clone(),
            body: article.body.clone(),
            author: article.author.clone(),
            url: article.url.clone(),
            created_at: article.created_at.unwrap_or_else(Utc::now),
        });
        Ok(id)
    }

    async fn add_tags_to_article(
        &self,
        article_id: ArticleId,
        tag_ids: &[TagId],
    ) -> RepositoryResult<()> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;

        if !tables.articles.iter().any(|a| a.id == article_id) {
            return Err(RepositoryError::NotFound("article or tag".to_owned()));
        }
        for tag_id in tag_ids {
            if !tables.tags.iter().any(|t| t.id == *tag_id) {
                return Err(RepositoryError::NotFound("article or tag".to_owned()));
            }
        }

        tables
            .article_tags
            .extend(tag_ids.iter().map(|tag_id| (article_id, *tag_id)));
        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.check_available()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn article(title: &str, hour: u32) -> NewArticle {
        NewArticle {
            title: title.to_owned(),
            body: format!("{title} body"),
            author: "desk".to_owned(),
            url: None,
            created_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()),
        }
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_user_keeps_id_and_updates_email() {
        let store = MemoryStore::new();

        let first = store.upsert_user("g-1", &email("a@example.com")).await.unwrap();
        let second = store.upsert_user("g-1", &email("b@example.com")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.email.as_str(), "b@example.com");

        let found = store.get_user_by_email(&email("b@example.com")).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(first.id));
        assert!(store.get_user_by_email(&email("a@example.com")).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_logins_create_one_user() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut logins = tokio::task::JoinSet::new();
        for i in 0..32 {
            let store = store.clone();
            logins.spawn(async move {
                store
                    .upsert_user("g-race", &email(&format!("r{i}@example.com")))
                    .await
            });
        }

        let mut ids = std::collections::HashSet::new();
        while let Some(result) = logins.join_next().await {
            ids.insert(result.unwrap().unwrap().id);
        }

        assert_eq!(ids.len(), 1);
        assert_eq!(store.tables.lock().await.users.len(), 1);
    }

    #[tokio::test]
    async fn test_filtered_articles_carry_full_tag_set() {
        let store = MemoryStore::new();
        let sports = store.create_tag("sports").await.unwrap();
        let tech = store.create_tag("tech").await.unwrap();

        let a1 = store.create_article(&article("one", 1)).await.unwrap();
        let a2 = store.create_article(&article("two", 2)).await.unwrap();
        store.add_tags_to_article(a1, &[sports.id, tech.id]).await.unwrap();
        store.add_tags_to_article(a2, &[tech.id]).await.unwrap();

        let by_sports = store.list_articles_by_tag(sports.id).await.unwrap();
        assert_eq!(by_sports.len(), 1);
        assert_eq!(by_sports[0].id, a1);
        assert_eq!(by_sports[0].tags, vec![sports.clone(), tech.clone()]);

        let by_tech = store.list_articles_by_tag(tech.id).await.unwrap();
        let ids: Vec<ArticleId> = by_tech.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![a2, a1]);
    }

    #[tokio::test]
    async fn test_favorite_articles_deduplicated() {
        let store = MemoryStore::new();
        let user = store.upsert_user("g-1", &email("a@example.com")).await.unwrap();
        let sports = store.create_tag("sports").await.unwrap();
        let tech = store.create_tag("tech").await.unwrap();
        let world = store.create_tag("world").await.unwrap();

        let both = store.create_article(&article("both", 3)).await.unwrap();
        let other = store.create_article(&article("other", 4)).await.unwrap();
        store.add_tags_to_article(both, &[sports.id, tech.id, world.id]).await.unwrap();
        store.add_tags_to_article(other, &[world.id]).await.unwrap();

        store.add_favorite(user.id, sports.id).await.unwrap();
        store.add_favorite(user.id, tech.id).await.unwrap();
        store.add_favorite(user.id, tech.id).await.unwrap();

        let favorites = store.list_favorite_tags(user.id).await.unwrap();
        assert_eq!(favorites, vec![sports.clone(), tech.clone()]);

        let articles = store.list_favorite_articles(user.id).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, both);
        assert_eq!(articles[0].tags.len(), 3);
    }

    #[tokio::test]
    async fn test_add_favorite_unknown_tag_is_not_found() {
        let store = MemoryStore::new();
        let user = store.upsert_user("g-1", &email("a@example.com")).await.unwrap();

        let err = store.add_favorite(user.id, TagId::new(99)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_favorite_is_noop() {
        let store = MemoryStore::new();
        let user = store.upsert_user("g-1", &email("a@example.com")).await.unwrap();

        store.remove_favorite(user.id, TagId::new(1)).await.unwrap();
        assert!(store.list_favorite_tags(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let store = MemoryStore::new();

        let t1 = store.create_tag("sports").await.unwrap();
        let t2 = store.create_tag("sports").await.unwrap();
        assert_eq!(t1, t2);

        let mut new = article("one", 1);
        new.url = Some("https://example.com/one".to_owned());
        let a1 = store.create_article(&new).await.unwrap();
        let a2 = store.create_article(&new).await.unwrap();
        assert_eq!(a1, a2);
        assert_eq!(store.list_articles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.list_articles().await,
            Err(RepositoryError::Unavailable)
        ));
        assert!(store.health_check().await.is_err());

        store.set_unavailable(false);
        assert!(store.health_check().await.is_ok());
    }
}
