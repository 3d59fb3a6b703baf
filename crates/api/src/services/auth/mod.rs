//! Authentication service.
//!
//! Drives the Google sign-in state machine over the request's session:
//!
//! ```text
//! Anonymous --begin_login--> StateIssued --complete_login--> Authenticated
//!     ^                                                            |
//!     +------------------------------logout-------------------------+
//! ```
//!
//! The anti-forgery state token is single use: it is removed from the
//! session as soon as a callback presents a matching value.

mod error;

pub use error::AuthError;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use newsdesk_core::Email;

use crate::db::IdentityStore;
use crate::models::{User, session_keys};
use crate::oauth::IdentityProvider;

/// Number of random bytes in an anti-forgery state token (256 bits).
const STATE_BYTES: usize = 32;

/// Query parameters of the provider's redirect back to us.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn IdentityStore,
    provider: &'a dyn IdentityProvider,
    session_lifetime: Option<Duration>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn IdentityStore,
        provider: &'a dyn IdentityProvider,
        session_lifetime: Option<Duration>,
    ) -> Self {
        Self {
            users,
            provider,
            session_lifetime,
        }
    }

    /// Issue a fresh state token and return the provider URL to redirect to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Randomness` if no secure random bytes are available
    /// and `AuthError::Session` if the token cannot be stored. No URL is
    /// produced in either case.
    pub async fn begin_login(&self, session: &Session) -> Result<String, AuthError> {
        let state = generate_state()?;
        session.insert(session_keys::OAUTH_STATE, &state).await?;
        Ok(self.provider.authorization_url(&state))
    }

    /// Validate the callback and sign the session in.
    ///
    /// The state check happens before anything else; on mismatch the
    /// provider is never contacted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StateMismatch`, `AuthError::ProviderDenied` or
    /// `AuthError::MissingCode` for bad callbacks, and a server-side variant if
    /// the code exchange, profile fetch, user upsert or session write fails.
    #[instrument(skip_all)]
    pub async fn complete_login(
        &self,
        session: &Session,
        query: CallbackQuery,
    ) -> Result<User, AuthError> {
        let stored: Option<String> = session.get(session_keys::OAUTH_STATE).await?;
        match (stored.as_deref(), query.state.as_deref()) {
            (Some(expected), Some(returned)) if constant_time_compare(expected, returned) => {}
            _ => return Err(AuthError::StateMismatch),
        }
        session.remove::<String>(session_keys::OAUTH_STATE).await?;

        if let Some(error) = query.error {
            tracing::warn!(
                error = %error,
                description = query.error_description.as_deref().unwrap_or_default(),
                "Provider denied authorization"
            );
            return Err(AuthError::ProviderDenied(error));
        }

        let code = query
            .code
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingCode)?;

        let token = self.provider.exchange_code(&code).await?;
        let profile = self.provider.fetch_profile(&token).await?;
        let email = Email::parse(&profile.email)?;

        let user = self.users.upsert_user(&profile.external_id, &email).await?;

        session.insert(session_keys::AUTHENTICATED, true).await?;
        session
            .insert(session_keys::USER_ID, &user.external_id)
            .await?;
        session
            .insert(session_keys::EMAIL, user.email.as_str())
            .await?;
        match self.session_lifetime {
            Some(lifetime) => {
                let expires_at = expiry_epoch(chrono::Utc::now().timestamp(), lifetime);
                session.insert(session_keys::EXPIRES_AT, expires_at).await?;
            }
            None => {
                session.remove::<i64>(session_keys::EXPIRES_AT).await?;
            }
        }

        // New identity, new session ID.
        session.cycle_id().await?;

        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    /// Sign the session out and invalidate it.
    ///
    /// Safe to call on an anonymous or already-invalidated session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn logout(session: &Session) -> Result<(), AuthError> {
        session.insert(session_keys::AUTHENTICATED, false).await?;
        session.flush().await?;
        Ok(())
    }
}

/// Generate a URL-safe anti-forgery token from the OS random source.
///
/// # Errors
///
/// Returns `AuthError::Randomness` if the OS source fails; callers must not
/// fall back to a weaker generator.
pub fn generate_state() -> Result<String, AuthError> {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::error!(error = %e, "OS random source failed");
        AuthError::Randomness
    })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Epoch second at which a session signed in at `now` stops being trusted.
///
/// Saturates instead of wrapping, so an oversized lifetime never yields an
/// epoch in the past.
fn expiry_epoch(now: i64, lifetime: Duration) -> i64 {
    now.saturating_add(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_sign_loss)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use secrecy::SecretString;

    use super::*;
    use crate::db::MemoryStore;
    use crate::oauth::{AccessToken, ProviderError, ProviderProfile};

    struct ScriptedProvider {
        profile: ProviderProfile,
        fail_exchange: bool,
        exchanges: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(external_id: &str, email: &str) -> Self {
            Self {
                profile: ProviderProfile {
                    external_id: external_id.to_string(),
                    email: email.to_string(),
                },
                fail_exchange: false,
                exchanges: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedProvider {
        fn authorization_url(&self, state: &str) -> String {
            format!("https://provider.test/auth?state={state}")
        }

        async fn exchange_code(&self, _code: &str) -> Result<AccessToken, ProviderError> {
            self.exchanges.fetch_add(1, Ordering::SeqCst);
            if self.fail_exchange {
                return Err(ProviderError::Status {
                    operation: "token exchange",
                    status: 400,
                });
            }
            Ok(AccessToken(SecretString::from("token")))
        }

        async fn fetch_profile(
            &self,
            _token: &AccessToken,
        ) -> Result<ProviderProfile, ProviderError> {
            Ok(self.profile.clone())
        }
    }

    fn session() -> Session {
        Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    async fn issued_state(service: &AuthService<'_>, session: &Session) -> String {
        let url = service.begin_login(session).await.unwrap();
        url.rsplit_once("state=").unwrap().1.to_string()
    }

    fn callback(state: Option<&str>, code: Option<&str>) -> CallbackQuery {
        CallbackQuery {
            code: code.map(ToString::to_string),
            state: state.map(ToString::to_string),
            ..CallbackQuery::default()
        }
    }

    #[test]
    fn test_generate_state_is_url_safe_and_unique() {
        let a = generate_state().unwrap();
        let b = generate_state().unwrap();

        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }

    #[tokio::test]
    async fn test_successful_login_sets_session() {
        let store = MemoryStore::new();
        let provider = ScriptedProvider::new("g-42", "reader@example.com");
        let service = AuthService::new(&store, &provider, Some(Duration::from_secs(60)));
        let session = session();

        let state = issued_state(&service, &session).await;
        let user = service
            .complete_login(&session, callback(Some(&state), Some("code")))
            .await
            .unwrap();

        assert_eq!(user.external_id, "g-42");
        assert_eq!(
            session
                .get::<bool>(session_keys::AUTHENTICATED)
                .await
                .unwrap(),
            Some(true)
        );
        assert_eq!(
            session
                .get::<String>(session_keys::USER_ID)
                .await
                .unwrap()
                .as_deref(),
            Some("g-42")
        );
        assert!(
            session
                .get::<i64>(session_keys::EXPIRES_AT)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            session
                .get::<String>(session_keys::OAUTH_STATE)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_expiry_epoch_saturates() {
        assert_eq!(expiry_epoch(1_000, Duration::from_secs(60)), 1_060);
        assert_eq!(expiry_epoch(1_000, Duration::from_secs(u64::MAX)), i64::MAX);
        assert_eq!(
            expiry_epoch(1_700_000_000, Duration::from_secs(i64::MAX as u64)),
            i64::MAX
        );
    }

    #[tokio::test]
    async fn test_oversized_lifetime_still_signs_in() {
        let store = MemoryStore::new();
        let provider = ScriptedProvider::new("g-42", "reader@example.com");
        let service = AuthService::new(
            &store,
            &provider,
            Some(Duration::from_secs(i64::MAX as u64)),
        );
        let session = session();

        let state = issued_state(&service, &session).await;
        service
            .complete_login(&session, callback(Some(&state), Some("code")))
            .await
            .unwrap();

        let expires_at = session
            .get::<i64>(session_keys::EXPIRES_AT)
            .await
            .unwrap()
            .unwrap();
        assert!(expires_at > chrono::Utc::now().timestamp());
        assert_eq!(
            crate::middleware::identity::resolve(Some(&session), &store).await,
            Some(store.get_user_by_external_id("g-42").await.unwrap().unwrap().id)
        );
    }

    #[tokio::test]
    async fn test_state_mismatch_never_exchanges() {
        let store = MemoryStore::new();
        let provider = ScriptedProvider::new("g-42", "reader@example.com");
        let service = AuthService::new(&store, &provider, None);
        let session = session();

        let _ = issued_state(&service, &session).await;
        let err = service
            .complete_login(&session, callback(Some("forged"), Some("code")))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::StateMismatch));
        assert!(err.is_client_error());
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_callback_without_login_is_rejected() {
        let store = MemoryStore::new();
        let provider = ScriptedProvider::new("g-42", "reader@example.com");
        let service = AuthService::new(&store, &provider, None);

        let err = service
            .complete_login(&session(), callback(Some("anything"), Some("code")))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::StateMismatch));
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let store = MemoryStore::new();
        let provider = ScriptedProvider::new("g-42", "reader@example.com");
        let service = AuthService::new(&store, &provider, None);
        let session = session();

        let state = issued_state(&service, &session).await;
        service
            .complete_login(&session, callback(Some(&state), Some("code")))
            .await
            .unwrap();

        let replay = service
            .complete_login(&session, callback(Some(&state), Some("code")))
            .await
            .unwrap_err();
        assert!(matches!(replay, AuthError::StateMismatch));
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_denial_and_missing_code() {
        let store = MemoryStore::new();
        let provider = ScriptedProvider::new("g-42", "reader@example.com");
        let service = AuthService::new(&store, &provider, None);
        let session = session();

        let state = issued_state(&service, &session).await;
        let denied = CallbackQuery {
            state: Some(state),
            error: Some("access_denied".to_string()),
            ..CallbackQuery::default()
        };
        let err = service.complete_login(&session, denied).await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderDenied(_)));

        let state = issued_state(&service, &session).await;
        let err = service
            .complete_login(&session, callback(Some(&state), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCode));
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exchange_failure_leaves_session_anonymous() {
        let store = MemoryStore::new();
        let mut provider = ScriptedProvider::new("g-42", "reader@example.com");
        provider.fail_exchange = true;
        let service = AuthService::new(&store, &provider, None);
        let session = session();

        let state = issued_state(&service, &session).await;
        let err = service
            .complete_login(&session, callback(Some(&state), Some("code")))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Provider(_)));
        assert!(!err.is_client_error());
        assert!(
            session
                .get::<bool>(session_keys::AUTHENTICATED)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_invalid_provider_email_is_server_error() {
        let store = MemoryStore::new();
        let provider = ScriptedProvider::new("g-42", "not-an-email");
        let service = AuthService::new(&store, &provider, None);
        let session = session();

        let state = issued_state(&service, &session).await;
        let err = service
            .complete_login(&session, callback(Some(&state), Some("code")))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidEmail(_)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let session = session();
        session
            .insert(session_keys::AUTHENTICATED, true)
            .await
            .unwrap();

        AuthService::logout(&session).await.unwrap();
        AuthService::logout(&session).await.unwrap();

        assert!(
            session
                .get::<bool>(session_keys::AUTHENTICATED)
                .await
                .unwrap()
                .is_none()
        );
    }
}
