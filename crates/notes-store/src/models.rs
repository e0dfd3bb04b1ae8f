//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for sqlx
//! queries. None of them implement `Serialize`: the HTTP layer builds its own
//! response types, which keeps `password_hash` from ever reaching a client.

use chrono::{DateTime, Utc};
use notes_core::{LogId, NoteId, UserId};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }
}

/// Input for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Database row for the `notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    /// Owner; never changes after insert.
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    /// File name inside the attachment directory.
    pub attachment_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteRow {
    pub fn note_id(&self) -> NoteId {
        NoteId::from_uuid(self.id)
    }

    pub fn owner(&self) -> UserId {
        UserId::from_uuid(self.user_id)
    }
}

/// Input for creating a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub attachment_path: Option<String>,
}

/// Partial update of a note. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub attachment_path: Option<String>,
}

impl NoteChanges {
    /// True when applying these changes would not modify anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.attachment_path.is_none()
    }
}

/// Database row for the `logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct RequestLogRow {
    pub id: Uuid,
    /// When the request started.
    pub datetime: DateTime<Utc>,
    pub method: String,
    pub endpoint: String,
    /// Header map with secrets already redacted.
    pub headers: serde_json::Value,
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
}

impl RequestLogRow {
    pub fn log_id(&self) -> LogId {
        LogId::from_uuid(self.id)
    }
}

/// Input for appending a request log record.
#[derive(Debug, Clone)]
pub struct NewRequestLog {
    pub datetime: DateTime<Utc>,
    pub method: String,
    pub endpoint: String,
    pub headers: serde_json::Value,
    pub request_body: String,
    pub response_body: String,
    pub status_code: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_changes_emptiness() {
        assert!(NoteChanges::default().is_empty());
        let changes = NoteChanges {
            content: Some("updated".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn typed_ids_wrap_row_uuids() {
        let now = Utc::now();
        let row = NoteRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "t".to_string(),
            content: "c".to_string(),
            attachment_path: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(row.note_id().0, row.id);
        assert_eq!(row.owner().0, row.user_id);
    }
}
