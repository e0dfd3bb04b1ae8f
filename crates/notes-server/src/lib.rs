//! notes-server: HTTP API server for the notes API
//!
//! This crate provides:
//! - Registration, login and bearer-token authentication
//! - Per-user note CRUD with image attachments
//! - Paginated, searchable listings of notes and request logs
//! - A request log recorded for every call, persisted in the background
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - Request/response capture into the `logs` table
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! let (sink, _worker) = RequestLogSink::start(store.clone(), config.request_log_queue_capacity);
//! let state = AppState::new(store, &config, sink);
//! let app = routes::build_router(state);
//! ```

pub mod accounts;
pub mod attachments;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod request_log;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use request_log::RequestLogSink;
pub use state::AppState;

// Re-export dependent crates
pub use notes_core;
pub use notes_store;
