//! Session middleware configuration.
//!
//! Sessions are carried in an encrypted (private) cookie named
//! `news-session`; the record itself lives in the session store
//! (`PostgreSQL` in production, memory in tests).

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "news-session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over any session store.
///
/// The returned layer uses plaintext cookies; callers wrap it with
/// [`SessionManagerLayer::with_private`] and [`session_key`].
#[must_use]
pub fn create_session_layer<S>(store: S, config: &AppConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Derive the 64-byte cookie encryption key from `SESSION_SECRET`.
#[must_use]
pub fn session_key(config: &AppConfig) -> Key {
    let digest = Sha512::digest(config.session.secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}
