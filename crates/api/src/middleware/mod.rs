//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. Timeout (`SERVER_READ_TIMEOUT`)
//! 3. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 4. Request ID (add unique ID to each request)
//! 5. Session layer (tower-sessions, private cookie)
//! 6. Identity resolver (session -> `ResolvedIdentity`)

pub mod auth;
pub mod identity;
pub mod request_id;
pub mod session;

pub use auth::{OptionalUser, RequireUser};
pub use identity::{ResolvedIdentity, resolve_identity_middleware};
pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_key};
