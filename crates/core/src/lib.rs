//! Newsdesk Core - Shared types library.
//!
//! This crate provides common types used across all Newsdesk components:
//! - `api` - HTTP backend serving articles, tags and per-user favorites
//! - `cli` - Command-line tools for migrations, seeding and user lookup
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
