//! Welcome and health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::middleware::OptionalUser;
use crate::state::AppState;

/// Welcome text.
///
/// # Route
///
/// `GET /`
pub async fn home(OptionalUser(user): OptionalUser) -> String {
    match user {
        Some(id) => format!("Welcome to newsdesk, reader {id}"),
        None => "Welcome to newsdesk".to_string(),
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the content store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.content().health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
