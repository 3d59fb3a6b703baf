//! Integration tests for Newsdesk.
//!
//! # Running Tests
//!
//! ```bash
//! # Router-level tests (in-process, no external services)
//! cargo test -p newsdesk-integration-tests
//!
//! # Including PostgreSQL store tests
//! TEST_DATABASE_URL=postgres://localhost/newsdesk_test \
//!     cargo test -p newsdesk-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Google sign-in state machine through the router
//! - `news_routes` - Public article and tag endpoints
//! - `favorites` - Per-reader favorite tags
//! - `postgres_store` - Store implementations against a live database (ignored)
//!
//! The router tests drive the real [`newsdesk_api::app`] with
//! [`tower::ServiceExt::oneshot`], an in-memory content/identity store, an
//! in-memory session store and a scripted identity provider.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use secrecy::SecretString;
use tower::ServiceExt;

use newsdesk_api::config::AppConfig;
use newsdesk_api::db::MemoryStore;
use newsdesk_api::middleware::SESSION_COOKIE_NAME;
use newsdesk_api::oauth::{AccessToken, IdentityProvider, ProviderError, ProviderProfile};
use newsdesk_api::state::AppState;

/// High-entropy session secret used by every test app.
pub const TEST_SESSION_SECRET: &str = "k7Qp2Lx9Vb4Nz8Rt1Wc6Hy3Jm5Fd0GsA";

/// Configuration with test values for every required variable.
#[must_use]
pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("POSTGRES_CONN_STR", "postgres://unused/newsdesk"),
        ("GOOGLE_OAUTH_CLIENT_ID", "test-client"),
        ("GOOGLE_OAUTH_CLIENT_SECRET", "GOCSPX-testvalue"),
        ("SESSION_SECRET", TEST_SESSION_SECRET),
        ("SESSION_LIFETIME_SECONDS", "3600"),
        ("LOGGING_LEVEL", "warn"),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap()
}

/// Scripted identity provider that records every code exchange.
pub struct FakeProvider {
    profile: std::sync::Mutex<ProviderProfile>,
    fail_exchange: AtomicBool,
    fail_profile: AtomicBool,
    exchanges: AtomicUsize,
}

impl FakeProvider {
    #[must_use]
    pub fn new(external_id: &str, email: &str) -> Self {
        Self {
            profile: std::sync::Mutex::new(ProviderProfile {
                external_id: external_id.to_string(),
                email: email.to_string(),
            }),
            fail_exchange: AtomicBool::new(false),
            fail_profile: AtomicBool::new(false),
            exchanges: AtomicUsize::new(0),
        }
    }

    /// Change the identity returned by subsequent logins.
    pub fn set_profile(&self, external_id: &str, email: &str) {
        *self.profile.lock().unwrap() = ProviderProfile {
            external_id: external_id.to_string(),
            email: email.to_string(),
        };
    }

    pub fn fail_exchange(&self, fail: bool) {
        self.fail_exchange.store(fail, Ordering::SeqCst);
    }

    pub fn fail_profile(&self, fail: bool) {
        self.fail_profile.store(fail, Ordering::SeqCst);
    }

    /// Number of code exchanges attempted so far.
    #[must_use]
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "https://accounts.test/o/oauth2/auth?state={}&access_type=offline",
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, ProviderError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                operation: "token exchange",
                status: 400,
            });
        }
        Ok(AccessToken(SecretString::from(format!("token-for-{code}"))))
    }

    async fn fetch_profile(&self, _token: &AccessToken) -> Result<ProviderProfile, ProviderError> {
        if self.fail_profile.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                operation: "userinfo request",
                status: 401,
            });
        }
        Ok(self.profile.lock().unwrap().clone())
    }
}

/// The application wired to in-memory fakes.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub provider: Arc<FakeProvider>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(FakeProvider::new("google-1", "reader@example.com"));
        let state = AppState::new(
            test_config(),
            store.clone(),
            store.clone(),
            provider.clone(),
        );
        let router = newsdesk_api::app(state, tower_sessions::MemoryStore::default());

        Self {
            router,
            store,
            provider,
        }
    }

    /// Send one request, optionally carrying a session cookie.
    pub async fn request(&self, method: Method, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.request(Method::GET, uri, cookie).await
    }

    /// Start a login; returns the issued state and the session cookie.
    pub async fn begin_login(&self) -> (String, String) {
        let response = self.get("/auth/google/login", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let state = state_from_location(&response);
        let cookie = session_cookie(&response).expect("login must set a session cookie");
        (state, cookie)
    }

    /// Complete a full sign-in and return the authenticated session cookie.
    pub async fn sign_in(&self) -> String {
        let (state, cookie) = self.begin_login().await;
        let uri = format!(
            "/auth/google/callback?state={}&code=test-code",
            urlencoding::encode(&state)
        );
        let response = self.get(&uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        session_cookie(&response).unwrap_or(cookie)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the `news-session=...` pair from a response's `Set-Cookie`
/// headers, ready to send back in a `Cookie` header.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(ToString::to_string)
}

/// Full `Set-Cookie` header for the session cookie, attributes included.
#[must_use]
pub fn session_set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(ToString::to_string)
}

/// Read the `state` query parameter of a redirect's `Location`.
#[must_use]
pub fn state_from_location(response: &Response<Body>) -> String {
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect must carry a Location header");
    let url = url::Url::parse(location).unwrap();
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("authorization URL must carry state")
}

/// Collect a response body as a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
