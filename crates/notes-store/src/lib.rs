//! notes-store: Storage layer for the notes API
//!
//! This crate provides:
//! - PostgreSQL storage for users, notes and request logs
//! - The paginated list query builder (filter, search, allow-listed sort,
//!   `LIMIT`/`OFFSET`)
//! - Migration management
//! - Type-safe database operations via sqlx
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_store::{Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let page = store.list_notes(user_id, &params.resolve(&NOTE_SORT_FIELDS)).await?;
//! ```

pub mod error;
pub mod models;
pub mod query;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use query::{ListQuery, PaginatedQuery, SqlArg, build_paginated_query, escape_like};
pub use store::{Store, StoreConfig};

// Re-export notes-core for downstream crates
pub use notes_core;
