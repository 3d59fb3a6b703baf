//! Authorization extractors.
//!
//! Both extractors read the [`ResolvedIdentity`] attached by
//! [`resolve_identity_middleware`](super::resolve_identity_middleware);
//! neither touches the session or the store.

use axum::{extract::FromRequestParts, http::request::Parts};

use newsdesk_core::UserId;

use super::ResolvedIdentity;
use crate::error::AppError;

fn resolved(parts: &Parts) -> Option<UserId> {
    parts
        .extensions
        .get::<ResolvedIdentity>()
        .and_then(|identity| identity.0)
}

/// Extractor that requires a signed-in reader.
///
/// Rejects with 401 when the request resolved to no identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user_id): RequireUser) -> String {
///     format!("Hello, reader {user_id}!")
/// }
/// ```
pub struct RequireUser(pub UserId);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        resolved(parts)
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("sign in required".to_string()))
    }
}

/// Extractor that optionally gets the signed-in reader.
///
/// Unlike `RequireUser`, this never rejects.
pub struct OptionalUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(resolved(parts)))
    }
}
