//! Article route handlers (public).

use axum::{
    Json,
    extract::{Path, State},
};

use newsdesk_core::ArticleId;

use crate::error::{AppError, Result};
use crate::models::{Article, Tag};
use crate::state::AppState;

/// List every article, newest first.
///
/// # Route
///
/// `GET /news`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Article>>> {
    Ok(Json(state.content().list_articles().await?))
}

/// Show one article with its tags.
///
/// # Route
///
/// `GET /news/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>> {
    let id: ArticleId = id.parse()?;

    state
        .content()
        .get_article(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("article {id}")))
}

/// List the tags of one article.
///
/// # Route
///
/// `GET /news/{id}/tags`
pub async fn tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Tag>>> {
    let id: ArticleId = id.parse()?;
    Ok(Json(state.content().list_tags_for_article(id).await?))
}
