//! User repository for database operations.
//!
//! Users are keyed for login by the identity provider's subject identifier
//! (`external_id`); the internal `id` is what favorites reference.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use newsdesk_core::{Email, UserId};

use super::{IdentityStore, RepositoryError, RepositoryResult};
use crate::models::User;

/// Raw `newsdesk.user` row before the email is validated.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    external_id: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            external_id: row.external_id,
            email,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgUserRepository {
    /// Insert or update in one statement so concurrent first logins for the
    /// same subject converge on a single row.
    #[instrument(skip(self, email), fields(external_id = %external_id))]
    async fn upsert_user(&self, external_id: &str, email: &Email) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO newsdesk.user (external_id, email)
            VALUES ($1, $2)
            ON CONFLICT (external_id) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, external_id, email, created_at
            ",
        )
        .bind(external_id)
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get_user_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, external_id, email, created_at
            FROM newsdesk.user
            WHERE external_id = $1
            ",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        // Emails are not unique across subjects; prefer the oldest account.
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, external_id, email, created_at
            FROM newsdesk.user
            WHERE email = $1
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
