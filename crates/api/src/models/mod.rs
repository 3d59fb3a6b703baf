//! Domain models for the news backend.
//!
//! These types represent validated domain objects separate from the row types
//! the stores read from `PostgreSQL`.

pub mod news;
pub mod session;
pub mod user;

pub use news::{Article, ArticleTagRow, NewArticle, Tag};
pub use session::session_keys;
pub use user::User;
