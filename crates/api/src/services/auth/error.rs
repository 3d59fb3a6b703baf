//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::oauth::ProviderError;

/// Errors that can occur during the sign-in flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The callback's `state` is absent or does not match the stored token.
    #[error("invalid oauth state")]
    StateMismatch,

    /// The provider redirected back with an error (e.g. the user declined).
    #[error("provider denied authorization: {0}")]
    ProviderDenied(String),

    /// The callback carried no authorization code.
    #[error("missing authorization code")]
    MissingCode,

    /// The operating system could not supply random bytes.
    #[error("random number generator unavailable")]
    Randomness,

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Code exchange or profile fetch failed.
    #[error("identity provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider reported an email that does not parse.
    #[error("invalid email from provider: {0}")]
    InvalidEmail(#[from] newsdesk_core::EmailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Whether the failure was caused by the request rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::StateMismatch | Self::ProviderDenied(_) | Self::MissingCode
        )
    }
}
