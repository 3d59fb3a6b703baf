//! Article, tag and favorite repository.
//!
//! Queries that return articles select one row per (article, tag) pair and
//! hand the rows to [`group_article_rows`]. Filters (a single tag, a reader's
//! favorites) pick article IDs first and then join *all* tags of those
//! articles, so filtered articles still carry their full tag set.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use newsdesk_core::{ArticleId, TagId, UserId};

use super::{ContentStore, RepositoryError, RepositoryResult, group_article_rows};
use crate::models::{Article, ArticleTagRow, NewArticle, Tag};

/// Repository for articles, tags and per-user favorites.
#[derive(Clone)]
pub struct PgNewsRepository {
    pool: PgPool,
}

impl PgNewsRepository {
    /// Create a new news repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgNewsRepository {
    async fn get_article(&self, id: ArticleId) -> RepositoryResult<Option<Article>> {
        let rows = sqlx::query_as::<_, ArticleTagRow>(
            r"
            SELECT a.id, a.title, a.body, a.author, a.url, a.created_at,
                   t.id AS tag_id, t.name AS tag_name
            FROM newsdesk.article a
            LEFT JOIN newsdesk.article_tag atg ON atg.article_id = a.id
            LEFT JOIN newsdesk.tag t ON t.id = atg.tag_id
            WHERE a.id = $1
            ORDER BY t.id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_article_rows(rows).into_iter().next())
    }

    async fn list_articles(&self) -> RepositoryResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleTagRow>(
            r"
            SELECT a.id, a.title, a.body, a.author, a.url, a.created_at,
                   t.id AS tag_id, t.name AS tag_name
            FROM newsdesk.article a
            LEFT JOIN newsdesk.article_tag atg ON atg.article_id = a.id
            LEFT JOIN newsdesk.tag t ON t.id = atg.tag_id
            ORDER BY a.created_at DESC, a.id DESC, t.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(group_article_rows(rows))
    }

    async fn list_articles_by_tag(&self, tag_id: TagId) -> RepositoryResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleTagRow>(
            r"
            WITH matching AS (
                SELECT article_id FROM newsdesk.article_tag WHERE tag_id = $1
            )
            SELECT a.id, a.title, a.body, a.author, a.url, a.created_at,
                   t.id AS tag_id, t.name AS tag_name
            FROM newsdesk.article a
            JOIN matching m ON m.article_id = a.id
            LEFT JOIN newsdesk.article_tag atg ON atg.article_id = a.id
            LEFT JOIN newsdesk.tag t ON t.id = atg.tag_id
            ORDER BY a.created_at DESC, a.id DESC, t.id
            ",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_article_rows(rows))
    }

    async fn list_tags_for_article(&self, article_id: ArticleId) -> RepositoryResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r"
            SELECT t.id, t.name
            FROM newsdesk.tag t
            JOIN newsdesk.article_tag atg ON atg.tag_id = t.id
            WHERE atg.article_id = $1
            ORDER BY t.id
            ",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn list_all_tags(&self) -> RepositoryResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM newsdesk.tag ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(tags)
    }

    #[instrument(skip(self), fields(user_id = %user_id, tag_id = %tag_id))]
    async fn add_favorite(&self, user_id: UserId, tag_id: TagId) -> RepositoryResult<()> {
        sqlx::query(
            r"
            INSERT INTO newsdesk.user_favorite_tag (user_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, tag_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "tag or user"))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id, tag_id = %tag_id))]
    async fn remove_favorite(&self, user_id: UserId, tag_id: TagId) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM newsdesk.user_favorite_tag WHERE user_id = $1 AND tag_id = $2")
            .bind(user_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_favorite_tags(&self, user_id: UserId) -> RepositoryResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r"
            SELECT t.id, t.name
            FROM newsdesk.tag t
            JOIN newsdesk.user_favorite_tag f ON f.tag_id = t.id
            WHERE f.user_id = $1
            ORDER BY t.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn list_favorite_articles(&self, user_id: UserId) -> RepositoryResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleTagRow>(
            r"
            WITH matching AS (
                SELECT DISTINCT atg.article_id
                FROM newsdesk.article_tag atg
                JOIN newsdesk.user_favorite_tag f ON f.tag_id = atg.tag_id
                WHERE f.user_id = $1
            )
            SELECT a.id, a.title, a.body, a.author, a.url, a.created_at,
                   t.id AS tag_id, t.name AS tag_name
            FROM newsdesk.article a
            JOIN matching m ON m.article_id = a.id
            LEFT JOIN newsdesk.article_tag atg ON atg.article_id = a.id
            LEFT JOIN newsdesk.tag t ON t.id = atg.tag_id
            ORDER BY a.created_at DESC, a.id DESC, t.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_article_rows(rows))
    }

    async fn create_tag(&self, name: &str) -> RepositoryResult<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            r"
            INSERT INTO newsdesk.tag (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            ",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    #[instrument(skip(self, article), fields(title = %article.title))]
    async fn create_article(&self, article: &NewArticle) -> RepositoryResult<ArticleId> {
        let id: ArticleId = sqlx::query_scalar(
            r"
            INSERT INTO newsdesk.article (title, body, author, url, created_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, now()))
            ON CONFLICT (url) DO UPDATE SET url = EXCLUDED.url
            RETURNING id
            ",
        )
        .bind(&article.title)
        .bind(&article.body)
        .bind(&article.author)
        .bind(article.url.as_deref())
        .bind(article.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn add_tags_to_article(
        &self,
        article_id: ArticleId,
        tag_ids: &[TagId],
    ) -> RepositoryResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = tag_ids.iter().map(TagId::as_i32).collect();
        sqlx::query(
            r"
            INSERT INTO newsdesk.article_tag (article_id, tag_id)
            SELECT $1, tag_id FROM UNNEST($2::int4[]) AS tag_id
            ON CONFLICT (article_id, tag_id) DO NOTHING
            ",
        )
        .bind(article_id)
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "article or tag"))?;

        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
