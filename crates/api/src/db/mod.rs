//! Database operations for the news backend.
//!
//! # Database: `newsdesk`
//!
//! ## Tables
//!
//! - `user` - Readers, keyed by the identity provider's subject identifier
//! - `tag` - Tags articles are filed under
//! - `article` - News articles
//! - `article_tag` - Article ⟷ tag links
//! - `user_favorite_tag` - Reader ⟷ favorite tag links
//! - `tower_sessions.session` - Session records (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p newsdesk-cli -- migrate
//! ```
//!
//! Handlers never talk to `PostgreSQL` directly: they go through the
//! [`IdentityStore`] and [`ContentStore`] traits, implemented by
//! [`PgUserRepository`] / [`PgNewsRepository`] in production and by
//! [`MemoryStore`] in tests.

pub mod aggregate;
pub mod memory;
pub mod news;
pub mod store;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use aggregate::group_article_rows;
pub use memory::MemoryStore;
pub use news::PgNewsRepository;
pub use store::{ContentStore, IdentityStore};
pub use users::PgUserRepository;

/// Schema migrations for the `newsdesk` schema.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Constraint violation other than a missing reference.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store cannot be reached.
    #[error("store unavailable")]
    Unavailable,
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Classify a sqlx error raised by a write, turning foreign-key violations
    /// into [`RepositoryError::NotFound`] for the given entity description.
    pub(crate) fn from_write(err: sqlx::Error, missing: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_foreign_key_violation() {
                return Self::NotFound(missing.to_owned());
            }
            if db_err.is_unique_violation() {
                return Self::Conflict(db_err.message().to_owned());
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
