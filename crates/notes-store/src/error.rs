//! Error types for the storage layer.

use notes_core::{LogId, NoteId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Connection(#[from] sqlx::Error),

    /// A user with this email already exists.
    ///
    /// Raised from the unique-constraint violation on `users.email`, not
    /// from a lookup before the insert.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// Note does not exist or is owned by someone else.
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),

    /// Request log record does not exist.
    #[error("log not found: {0}")]
    LogNotFound(LogId),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Whether this error means "no such row for this caller".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoteNotFound(_) | Self::LogNotFound(_))
    }
}
