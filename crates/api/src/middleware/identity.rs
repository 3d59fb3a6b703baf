//! Request identity resolution.
//!
//! Runs on every request after the session layer and attaches a
//! [`ResolvedIdentity`] extension. It never rejects a request: any problem
//! with the session or the identity lookup simply yields an anonymous
//! request. Handlers read the result through
//! [`OptionalUser`](super::OptionalUser) and [`RequireUser`](super::RequireUser).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;
use tracing::Span;

use newsdesk_core::UserId;

use crate::db::IdentityStore;
use crate::error::set_sentry_user;
use crate::models::session_keys;
use crate::state::AppState;

/// Internal user ID of the signed-in reader, or `None` for anonymous requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedIdentity(pub Option<UserId>);

/// Middleware that resolves the session to an internal user ID.
pub async fn resolve_identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let user_id = resolve(session.as_ref(), state.users()).await;

    if let Some(id) = user_id {
        Span::current().record("user_id", id.as_i32());
        set_sentry_user(&id);
    }

    request.extensions_mut().insert(ResolvedIdentity(user_id));
    next.run(request).await
}

/// Resolve a session to an internal user ID.
///
/// Returns `None` when the session is missing or unreadable, not marked
/// authenticated, past its `expires_at`, has no subject, or the subject is
/// unknown to the store (or the store fails).
pub async fn resolve(session: Option<&Session>, users: &dyn IdentityStore) -> Option<UserId> {
    let session = session?;

    let authenticated = read::<bool>(session, session_keys::AUTHENTICATED)
        .await
        .unwrap_or(false);
    if !authenticated {
        return None;
    }

    // An expired session is ignored, not purged.
    if let Some(expires_at) = read::<i64>(session, session_keys::EXPIRES_AT).await
        && expires_at <= chrono::Utc::now().timestamp()
    {
        tracing::debug!("Session past expires_at, treating as anonymous");
        return None;
    }

    let external_id = read::<String>(session, session_keys::USER_ID)
        .await
        .filter(|id| !id.is_empty())?;

    match users.get_user_by_external_id(&external_id).await {
        Ok(Some(user)) => Some(user.id),
        Ok(None) => {
            tracing::debug!("Session subject has no user record");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, operation = "resolve_identity", "Identity lookup failed");
            None
        }
    }
}

/// Read a session value, treating read and decode errors as absence.
async fn read<T>(session: &Session, key: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned + Send,
{
    match session.get::<T>(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, key, "Unreadable session value");
            None
        }
    }
}
