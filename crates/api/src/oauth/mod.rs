//! Identity provider integration.
//!
//! The sign-in flow talks to the provider only through [`IdentityProvider`],
//! so tests can substitute a scripted provider for [`GoogleProvider`].

pub mod google;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

pub use google::GoogleProvider;

/// Errors raised while talking to the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{operation} failed with status {status}")]
    Status {
        operation: &'static str,
        status: u16,
    },

    /// The provider's response could not be used.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Access token obtained from the code exchange. Never logged.
#[derive(Debug, Clone)]
pub struct AccessToken(pub SecretString);

/// Identity reported by the provider's userinfo endpoint.
///
/// Lives only for the duration of one callback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Provider's stable subject identifier.
    pub external_id: String,
    /// Email as reported by the provider (validated by the caller).
    pub email: String,
}

/// An OAuth 2.0 authorization-code identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to redirect the browser to, carrying the anti-forgery `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, ProviderError>;

    /// Fetch the signed-in user's identity with a bearer token.
    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderProfile, ProviderError>;
}
