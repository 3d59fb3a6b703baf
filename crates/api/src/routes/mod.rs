//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                       - Welcome text
//! GET    /health                 - Liveness check
//! GET    /health/ready           - Readiness check (store reachable)
//!
//! # Google sign-in
//! GET    /auth/google/login      - Redirect to Google
//! GET    /auth/google/callback   - Handle OAuth callback
//! GET    /auth/google/logout     - Sign out
//!
//! # News (public)
//! GET    /news                   - All articles
//! GET    /news/{id}              - One article
//! GET    /news/{id}/tags         - Tags of one article
//! GET    /tags                   - All tags
//! GET    /tags/{id}/news         - Articles with a tag
//!
//! # Favorites (requires sign-in)
//! GET    /user/tags              - Favorite tags
//! POST   /user/tags/{id}         - Add favorite
//! DELETE /user/tags/{id}         - Remove favorite
//! GET    /user/news              - Articles with a favorite tag
//! ```

pub mod auth;
pub mod health;
pub mod news;
pub mod tags;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the Google sign-in routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
}

/// Create the public news and tag routes router.
pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(news::index))
        .route("/news/{id}", get(news::show))
        .route("/news/{id}/tags", get(news::tags))
        .route("/tags", get(tags::index))
        .route("/tags/{id}/news", get(tags::news))
}

/// Create the favorites routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(user::favorite_tags))
        .route(
            "/tags/{id}",
            post(user::add_favorite).delete(user::remove_favorite),
        )
        .route("/news", get(user::favorite_news))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth/google", auth_routes())
        .merge(news_routes())
        .nest("/user", user_routes())
}
