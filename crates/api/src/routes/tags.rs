//! Tag route handlers (public).

use axum::{
    Json,
    extract::{Path, State},
};

use newsdesk_core::TagId;

use crate::error::Result;
use crate::models::{Article, Tag};
use crate::state::AppState;

/// List every tag.
///
/// # Route
///
/// `GET /tags`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Tag>>> {
    Ok(Json(state.content().list_all_tags().await?))
}

/// List the articles filed under one tag, newest first.
///
/// # Route
///
/// `GET /tags/{id}/news`
pub async fn news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Article>>> {
    let id: TagId = id.parse()?;
    Ok(Json(state.content().list_articles_by_tag(id).await?))
}
