//! Newsdesk API library.
//!
//! News and tags backend with Google sign-in and per-reader favorite tags.
//! The HTTP application is built by [`app`], which takes the session store
//! as a parameter so the binary can use `PostgreSQL` and tests can use memory.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::state::AppState;

/// Build the HTTP application.
///
/// See [`middleware`] for the layer order. Sentry layers are added by the
/// binary on top of the returned router.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config())
        .with_private(middleware::session_key(state.config()));
    let read_timeout = state.config().server.read_timeout;

    routes::routes()
        .layer(from_fn_with_state(
            state.clone(),
            middleware::resolve_identity_middleware,
        ))
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            read_timeout,
        ))
        .with_state(state)
}
