//! Bookmarks Module
//!
//! CRUD over a single `bookmarks` table: a title, an absolute http(s) URL,
//! an optional description and a 0-5 rating.
//!
//! # Features
//!
//! - Data access through [`BookmarkStore`]
//! - Typed request payloads with validation ([`CreateBookmarkPayload`], [`UpdateBookmarkPayload`])
//! - HTML sanitization of free-text fields before they are returned
//! - Ready-to-use HTTP handlers and routes, mounted under [`BASE_PATH`]
//! - Database migrations included
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookmarks_api::bookmarks;
//!
//! let app = Router::new()
//!     .nest(bookmarks::BASE_PATH, bookmarks::routes())
//!     .with_state(app_state);
//!
//! let store = bookmarks::BookmarkStore::new(db.connection());
//! let bookmark = store.insert(new_bookmark).await?;
//! ```

mod handler;
mod payload;
mod routes;
mod sanitize;
mod store;

pub use payload::{CreateBookmarkPayload, UpdateBookmarkPayload};
pub use routes::{BASE_PATH, routes};
pub use sanitize::{sanitize_bookmark, sanitize_html};
pub use store::*;

// ============================================================================
// Migrations
// ============================================================================

/// Returns the migrations for the bookmarks module, in application order.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "bookmarks_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
