//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{ContentStore, IdentityStore, PgNewsRepository, PgUserRepository};
use crate::oauth::{GoogleProvider, IdentityProvider};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Stores and the identity
/// provider sit behind trait objects so tests can swap in in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    users: Arc<dyn IdentityStore>,
    content: Arc<dyn ContentStore>,
    provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create a new application state from explicit components.
    #[must_use]
    pub fn new(
        config: AppConfig,
        users: Arc<dyn IdentityStore>,
        content: Arc<dyn ContentStore>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                content,
                provider,
            }),
        }
    }

    /// Create the production state: `PostgreSQL` stores and Google sign-in.
    #[must_use]
    pub fn postgres(config: AppConfig, pool: PgPool) -> Self {
        let provider = GoogleProvider::new(&config.google);
        Self::new(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgNewsRepository::new(pool)),
            Arc::new(provider),
        )
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the identity store.
    #[must_use]
    pub fn users(&self) -> &dyn IdentityStore {
        self.inner.users.as_ref()
    }

    /// Get the content store.
    #[must_use]
    pub fn content(&self) -> &dyn ContentStore {
        self.inner.content.as_ref()
    }

    /// Get the identity provider.
    #[must_use]
    pub fn provider(&self) -> &dyn IdentityProvider {
        self.inner.provider.as_ref()
    }
}
