//! Google sign-in route handlers.
//!
//! - Login: stores a fresh state token and redirects to Google
//! - Callback: validates state, exchanges the code and signs the session in
//! - Logout: signs the session out and expires the cookie

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user};
use crate::services::auth::{AuthService, CallbackQuery};
use crate::state::AppState;

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(
        state.users(),
        state.provider(),
        state.config().session.lifetime,
    )
}

/// Initiate Google sign-in.
///
/// # Route
///
/// `GET /auth/google/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let url = auth_service(&state).begin_login(&session).await?;
    Ok(Redirect::temporary(&url))
}

/// Handle Google's redirect back after consent.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect> {
    auth_service(&state).complete_login(&session, query).await?;
    Ok(Redirect::to("/"))
}

/// Sign out.
///
/// # Route
///
/// `GET /auth/google/logout`
pub async fn logout(session: Session) -> Result<Redirect> {
    AuthService::logout(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
