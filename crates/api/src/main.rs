//! Newsdesk API - News and tags backend.
//!
//! Serves public article and tag listings plus per-reader favorite tags
//! behind Google sign-in.
//!
//! # Architecture
//!
//! - Axum web framework, JSON responses
//! - Google OAuth 2.0 for sign-in
//! - tower-sessions with a `PostgreSQL` store and encrypted cookies
//! - `PostgreSQL` for users, articles, tags and favorites
//!
//! Migrations are NOT run automatically on startup. Run them explicitly via:
//! `cargo run -p newsdesk-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use sentry::integrations::tracing as sentry_tracing;
use tokio::sync::Notify;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use newsdesk_api::config::{AppConfig, LoggingConfig, SentryConfig};
use newsdesk_api::db;
use newsdesk_api::state::AppState;

/// How often expired session records are purged from `PostgreSQL`.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SentryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing: `RUST_LOG` wins, otherwise `LOGGING_LEVEL` applies to
/// our crates and `tower_http`.
fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.level;
        format!("newsdesk_api={level},tower_http={level},tower_sessions=warn,sqlx=warn").into()
    });

    let pretty = config.pretty.then(tracing_subscriber::fmt::layer);
    let json = (!config.pretty).then(|| tracing_subscriber::fmt::layer().json());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty)
        .with(json)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (needed for Sentry init)
    let config = AppConfig::from_env()?;

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config.sentry);
    init_tracing(&config.logging);
    if config.sentry.dsn.is_some() {
        tracing::info!("Sentry initialized");
    }

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;

    // Abandoned logins and signed-out sessions leave expired rows behind.
    let cleanup = tokio::spawn(
        session_store
            .clone()
            .continuously_delete_expired(SESSION_CLEANUP_INTERVAL),
    );

    let addr = config.server.addr;
    let shutdown_wait = config.server.shutdown_wait;
    let state = AppState::postgres(config, pool);

    let app = newsdesk_api::app(state, session_store)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("newsdesk-api listening on {}", addr);

    let signalled = Arc::new(Notify::new());
    let graceful = {
        let signalled = signalled.clone();
        async move {
            shutdown_signal().await;
            signalled.notify_one();
        }
    };
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();

    let served = with_drain_deadline(server, &signalled, shutdown_wait).await;
    cleanup.abort();
    match served {
        Some(result) => result?,
        None => tracing::warn!(
            wait_secs = shutdown_wait.as_secs(),
            "Shutdown wait elapsed, dropping open connections"
        ),
    }

    Ok(())
}

/// Drive `server` to completion, but give up once `wait` has passed after
/// `signalled` fires. Returns `None` when the deadline cut the drain short.
async fn with_drain_deadline<F>(server: F, signalled: &Notify, wait: Duration) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        output = server => Some(output),
        () = async {
            signalled.notified().await;
            tokio::time::sleep(wait).await;
        } => None,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
