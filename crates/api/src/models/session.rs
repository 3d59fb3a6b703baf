//! Session-related types.
//!
//! Keys stored in the session for the Google sign-in flow and the resulting
//! authenticated state.

/// Session keys for authentication data.
pub mod session_keys {
    /// Anti-forgery token issued at login and checked on callback.
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Whether the session belongs to a signed-in user.
    pub const AUTHENTICATED: &str = "authenticated";

    /// The provider's subject identifier for the signed-in user.
    pub const USER_ID: &str = "user_id";

    /// Email reported by the provider at login.
    pub const EMAIL: &str = "email";

    /// Unix timestamp (seconds) after which the authenticated state is ignored.
    pub const EXPIRES_AT: &str = "expires_at";
}
