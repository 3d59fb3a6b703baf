//! Newsdesk API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `POSTGRES_CONN_STR` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `GOOGLE_OAUTH_CLIENT_ID` - Google OAuth client ID
//! - `GOOGLE_OAUTH_CLIENT_SECRET` - Google OAuth client secret
//! - `SESSION_SECRET` - Session cookie encryption secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SERVER_HOST` - Bind address (default: 0.0.0.0:8000)
//! - `SERVER_READ_TIMEOUT` - Per-request deadline in seconds (default: 15)
//! - `SERVER_SHUTDOWN_WAIT` - Seconds open connections may drain after a shutdown signal (default: 3)
//! - `PUBLIC_BASE_URL` - Public URL; `https` turns on `Secure` cookies (default: <http://localhost:8000>)
//! - `LOGGING_PRETTY` - Human-readable logs instead of JSON (default: true)
//! - `LOGGING_LEVEL` - Log level when `RUST_LOG` is unset (default: debug)
//! - `GOOGLE_OAUTH_REDIRECT_URL` - OAuth callback URL (default: <http://localhost:8000/auth/google/callback>)
//! - `GOOGLE_OAUTH_SCOPES` - Comma-separated scopes (default: userinfo.email)
//! - `SESSION_LIFETIME_SECONDS` - Absolute lifetime of a signed-in session (at most ten years)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! ## News ingestion (CLI `ingest` only, see [`NewsApiConfig`])
//! - `NEWSAPI_KEY` - News API key (required for ingestion)
//! - `NEWSAPI_URL` - Search endpoint (default: <https://newsapi.org/v2/everything>)
//! - `NEWSAPI_LOOKBACK_DAYS` - How far back to search (default: 30)
//! - `NEWSAPI_PAGE_SIZE` - Articles requested per tag, 1-100 (default: 100)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_SERVER_HOST: &str = "0.0.0.0:8000";
const DEFAULT_READ_TIMEOUT_SECS: &str = "15";
const DEFAULT_SHUTDOWN_WAIT_SECS: &str = "3";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REDIRECT_URL: &str = "http://localhost:8000/auth/google/callback";
const DEFAULT_SCOPES: &str = "https://www.googleapis.com/auth/userinfo.email";
const DEFAULT_NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";
const DEFAULT_NEWSAPI_LOOKBACK_DAYS: &str = "30";
const DEFAULT_NEWSAPI_PAGE_SIZE: &str = "100";
const MAX_NEWSAPI_PAGE_SIZE: u32 = 100;

/// Upper bound for `SESSION_LIFETIME_SECONDS` (ten years).
const MAX_SESSION_LIFETIME_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// HTTP server settings
    pub server: ServerConfig,
    /// Log output settings
    pub logging: LoggingConfig,
    /// Google OAuth client settings
    pub google: GoogleOAuthConfig,
    /// Session cookie settings
    pub session: SessionConfig,
    /// Sentry error tracking settings
    pub sentry: SentryConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind
    pub addr: SocketAddr,
    /// Deadline applied to every request
    pub read_timeout: Duration,
    /// How long in-flight connections may drain after a shutdown signal
    pub shutdown_wait: Duration,
    /// Public base URL the service is reached at
    pub public_base_url: String,
}

/// Log output settings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Human-readable output; JSON when false
    pub pretty: bool,
    /// Default level directive when `RUST_LOG` is unset
    pub level: String,
}

/// Google OAuth client settings.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Callback URL registered with Google
    pub redirect_url: String,
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_url", &self.redirect_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret the cookie encryption key is derived from
    pub secret: SecretString,
    /// Absolute lifetime of a signed-in session, if limited
    pub lifetime: Option<Duration>,
}

/// Sentry error tracking settings.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let database_url = env
            .optional("POSTGRES_CONN_STR")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("POSTGRES_CONN_STR".to_string()))?;

        let server = ServerConfig {
            addr: env.parsed("SERVER_HOST", DEFAULT_SERVER_HOST)?,
            read_timeout: Duration::from_secs(
                env.parsed("SERVER_READ_TIMEOUT", DEFAULT_READ_TIMEOUT_SECS)?,
            ),
            shutdown_wait: Duration::from_secs(
                env.parsed("SERVER_SHUTDOWN_WAIT", DEFAULT_SHUTDOWN_WAIT_SECS)?,
            ),
            public_base_url: env.or_default("PUBLIC_BASE_URL", DEFAULT_PUBLIC_BASE_URL),
        };
        url::Url::parse(&server.public_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PUBLIC_BASE_URL".to_string(), e.to_string())
        })?;

        let logging = LoggingConfig {
            pretty: env.parsed("LOGGING_PRETTY", "true")?,
            level: parse_level(&env.or_default("LOGGING_LEVEL", "debug"))?,
        };

        let client_secret = env.required("GOOGLE_OAUTH_CLIENT_SECRET")?;
        reject_placeholder(&client_secret, "GOOGLE_OAUTH_CLIENT_SECRET")?;
        let google = GoogleOAuthConfig {
            client_id: env.required("GOOGLE_OAUTH_CLIENT_ID")?,
            client_secret: SecretString::from(client_secret),
            redirect_url: env.or_default("GOOGLE_OAUTH_REDIRECT_URL", DEFAULT_REDIRECT_URL),
            scopes: parse_scopes(&env.or_default("GOOGLE_OAUTH_SCOPES", DEFAULT_SCOPES)),
        };

        let secret = env.required("SESSION_SECRET")?;
        validate_secret_strength(&secret, "SESSION_SECRET")?;
        let secret = SecretString::from(secret);
        validate_session_secret(&secret, "SESSION_SECRET")?;
        let lifetime = match env.optional("SESSION_LIFETIME_SECONDS") {
            Some(raw) => Some(parse_lifetime(&raw)?),
            None => None,
        };

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
        };

        Ok(Self {
            database_url,
            server,
            logging,
            google,
            session: SessionConfig { secret, lifetime },
            sentry,
        })
    }

    /// Whether the session cookie should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.server.public_base_url.starts_with("https://")
    }
}

/// News API settings used by the `ingest` command.
///
/// Loaded separately from [`AppConfig`]: the HTTP server never talks to the
/// news API. Implements `Debug` manually to redact the key.
#[derive(Clone)]
pub struct NewsApiConfig {
    pub api_key: SecretString,
    /// Search endpoint
    pub url: String,
    /// Only articles published within this window are requested
    pub lookback: chrono::Duration,
    /// Articles requested per tag
    pub page_size: u32,
}

impl std::fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("api_key", &"[REDACTED]")
            .field("url", &self.url)
            .field("lookback", &self.lookback)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl NewsApiConfig {
    /// Load news API settings from environment variables (`.env` honored).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `NEWSAPI_KEY` is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build news API settings from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`NewsApiConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let api_key = env.required("NEWSAPI_KEY")?;
        reject_placeholder(&api_key, "NEWSAPI_KEY")?;

        let url = env.or_default("NEWSAPI_URL", DEFAULT_NEWSAPI_URL);
        url::Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("NEWSAPI_URL".to_string(), e.to_string()))?;

        let lookback_days: u16 = env.parsed("NEWSAPI_LOOKBACK_DAYS", DEFAULT_NEWSAPI_LOOKBACK_DAYS)?;

        let page_size: u32 = env.parsed("NEWSAPI_PAGE_SIZE", DEFAULT_NEWSAPI_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_NEWSAPI_PAGE_SIZE {
            return Err(ConfigError::InvalidEnvVar(
                "NEWSAPI_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_NEWSAPI_PAGE_SIZE}"),
            ));
        }

        Ok(Self {
            api_key: SecretString::from(api_key),
            url,
            lookback: chrono::Duration::days(i64::from(lookback_days)),
            page_size,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the error reporting used by every field.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable (or its default) with `FromStr`.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

fn parse_level(raw: &str) -> Result<String, ConfigError> {
    let level = raw.trim().to_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(level),
        _ => Err(ConfigError::InvalidEnvVar(
            "LOGGING_LEVEL".to_string(),
            format!("unknown level '{raw}'"),
        )),
    }
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_lifetime(raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::InvalidEnvVar("SESSION_LIFETIME_SECONDS".to_string(), e.to_string())
    })?;
    if secs == 0 || secs > MAX_SESSION_LIFETIME_SECS {
        return Err(ConfigError::InvalidEnvVar(
            "SESSION_LIFETIME_SECONDS".to_string(),
            format!("must be between 1 and {MAX_SESSION_LIFETIME_SECS}"),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject values that look like a placeholder copied from documentation.
fn reject_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    reject_placeholder(secret, var_name)?;

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SESSION_SECRET: &str = "k7Qp2Lx9Vb4Nz8Rt1Wc6Hy3Jm5Fd0GsA";

    fn vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("POSTGRES_CONN_STR", "postgres://localhost/newsdesk"),
            ("GOOGLE_OAUTH_CLIENT_ID", "client-id.apps.googleusercontent.com"),
            ("GOOGLE_OAUTH_CLIENT_SECRET", "GOCSPX-4f8Kq2mZ"),
            ("SESSION_SECRET", SESSION_SECRET),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            map.insert((*k).to_string(), (*v).to_string());
        }
        map
    }

    fn load(map: &HashMap<String, String>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&vars(&[])).unwrap();

        assert_eq!(config.server.addr.to_string(), "0.0.0.0:8000");
        assert_eq!(config.server.read_timeout, Duration::from_secs(15));
        assert_eq!(config.server.shutdown_wait, Duration::from_secs(3));
        assert!(config.logging.pretty);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.google.redirect_url, DEFAULT_REDIRECT_URL);
        assert_eq!(config.google.scopes, vec![DEFAULT_SCOPES.to_string()]);
        assert!(config.session.lifetime.is_none());
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_database_url_fallback() {
        let mut map = vars(&[]);
        map.remove("POSTGRES_CONN_STR");
        assert!(matches!(load(&map), Err(ConfigError::MissingEnvVar(_))));

        map.insert("DATABASE_URL".to_string(), "postgres://fly/db".to_string());
        let config = load(&map).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/db");
    }

    #[test]
    fn test_scopes_are_comma_separated() {
        let config = load(&vars(&[("GOOGLE_OAUTH_SCOPES", "openid, email ,,profile")])).unwrap();
        assert_eq!(config.google.scopes, vec!["openid", "email", "profile"]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&vars(&[("SERVER_READ_TIMEOUT", "soon")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&vars(&[("LOGGING_LEVEL", "loud")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&vars(&[("SESSION_LIFETIME_SECONDS", "0")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&vars(&[("SERVER_HOST", "localhost")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&vars(&[("SERVER_SHUTDOWN_WAIT", "-1")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_shutdown_wait() {
        let config = load(&vars(&[("SERVER_SHUTDOWN_WAIT", "10")])).unwrap();
        assert_eq!(config.server.shutdown_wait, Duration::from_secs(10));
    }

    #[test]
    fn test_session_lifetime_is_capped() {
        let max = MAX_SESSION_LIFETIME_SECS.to_string();
        let config = load(&vars(&[("SESSION_LIFETIME_SECONDS", &max)])).unwrap();
        assert_eq!(
            config.session.lifetime,
            Some(Duration::from_secs(MAX_SESSION_LIFETIME_SECS))
        );

        let over = (MAX_SESSION_LIFETIME_SECS + 1).to_string();
        let huge = i64::MAX.to_string();
        for raw in [over.as_str(), huge.as_str()] {
            assert!(matches!(
                load(&vars(&[("SESSION_LIFETIME_SECONDS", raw)])),
                Err(ConfigError::InvalidEnvVar(_, _))
            ));
        }
    }

    fn news_api(extra: &[(&str, &str)]) -> Result<NewsApiConfig, ConfigError> {
        let mut map: HashMap<String, String> = HashMap::from([(
            "NEWSAPI_KEY".to_string(),
            "3f9c1e7a2b8d4c6e".to_string(),
        )]);
        for (k, v) in extra {
            map.insert((*k).to_string(), (*v).to_string());
        }
        NewsApiConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_news_api_defaults() {
        let config = news_api(&[]).unwrap();
        assert_eq!(config.url, DEFAULT_NEWSAPI_URL);
        assert_eq!(config.lookback, chrono::Duration::days(30));
        assert_eq!(config.page_size, 100);
        assert!(!format!("{config:?}").contains("3f9c1e7a2b8d4c6e"));
    }

    #[test]
    fn test_news_api_validation() {
        assert!(matches!(
            NewsApiConfig::from_lookup(|_| None),
            Err(ConfigError::MissingEnvVar(_))
        ));
        assert!(matches!(
            news_api(&[("NEWSAPI_KEY", "your-api-key")]),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        for page_size in ["0", "101"] {
            assert!(matches!(
                news_api(&[("NEWSAPI_PAGE_SIZE", page_size)]),
                Err(ConfigError::InvalidEnvVar(_, _))
            ));
        }
        assert!(matches!(
            news_api(&[("NEWSAPI_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_https_base_url_enables_secure_cookies() {
        let config = load(&vars(&[
            ("PUBLIC_BASE_URL", "https://news.example.org"),
            ("SESSION_LIFETIME_SECONDS", "3600"),
        ]))
        .unwrap();
        assert!(config.secure_cookies());
        assert_eq!(config.session.lifetime, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(validate_secret_strength("your-session-key-here", "TEST_VAR").is_err());
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
        assert!(
            validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").is_err()
        );
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_short_session_secret_rejected() {
        let result = load(&vars(&[("SESSION_SECRET", "aB3$xY9!mK2@")]));
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&vars(&[])).unwrap();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("client-id.apps.googleusercontent.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("GOCSPX-4f8Kq2mZ"));
        assert!(!debug_output.contains(SESSION_SECRET));
        assert!(!debug_output.contains("postgres://localhost/newsdesk"));
    }
}
