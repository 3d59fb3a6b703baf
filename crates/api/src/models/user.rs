//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use newsdesk_core::{Email, UserId};

/// A reader who has signed in at least once.
///
/// Keyed for login purposes by `external_id`, the identity provider's stable
/// subject identifier. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Store-assigned internal ID.
    pub id: UserId,
    /// Identity provider's subject identifier (unique, immutable).
    pub external_id: String,
    /// Email reported by the provider at the most recent login.
    pub email: Email,
    /// When the user first signed in.
    pub created_at: DateTime<Utc>,
}
