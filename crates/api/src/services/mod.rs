//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Google sign-in state machine over the request session

pub mod auth;
