//! Per-reader favorite route handlers.
//!
//! Every handler requires a signed-in reader; anonymous requests get 401
//! before any store access.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use newsdesk_core::TagId;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::{Article, Tag};
use crate::state::AppState;

/// List the reader's favorite tags.
///
/// # Route
///
/// `GET /user/tags`
pub async fn favorite_tags(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<Tag>>> {
    Ok(Json(state.content().list_favorite_tags(user_id).await?))
}

/// Add a favorite tag. Adding an existing favorite succeeds.
///
/// # Route
///
/// `POST /user/tags/{id}`
pub async fn add_favorite(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let tag_id: TagId = id.parse()?;
    state.content().add_favorite(user_id, tag_id).await?;
    tracing::info!(operation = "add_favorite", user_id = %user_id, tag_id = %tag_id, "Favorite added");
    Ok(StatusCode::OK)
}

/// Remove a favorite tag. Removing a missing favorite succeeds.
///
/// # Route
///
/// `DELETE /user/tags/{id}`
pub async fn remove_favorite(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let tag_id: TagId = id.parse()?;
    state.content().remove_favorite(user_id, tag_id).await?;
    tracing::info!(operation = "remove_favorite", user_id = %user_id, tag_id = %tag_id, "Favorite removed");
    Ok(StatusCode::OK)
}

/// List articles filed under any of the reader's favorite tags.
///
/// # Route
///
/// `GET /user/news`
pub async fn favorite_news(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<Article>>> {
    Ok(Json(state.content().list_favorite_articles(user_id).await?))
}
