//! Note routes: CRUD, listing and image attachments.
//!
//! Every handler scopes its store calls to the authenticated user; a note
//! owned by someone else is reported exactly like a missing one.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use notes_core::{
    ListParams, MAX_ATTACHMENT_BYTES, MAX_TITLE_CHARS, NOTE_SORT_FIELDS, NoteId, PageMeta, UserId,
    limits,
};
use notes_store::{NewNote, NoteChanges, NoteRow};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{NoteForm, UploadedFile};
use crate::state::AppState;

/// Body limit for note routes: one attachment plus form overhead.
const NOTE_BODY_LIMIT: usize = MAX_ATTACHMENT_BYTES + 1024 * 1024;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub attachment_path: Option<String>,
    /// Where the attachment can be downloaded, if there is one.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NoteRow> for NoteResponse {
    fn from(row: NoteRow) -> Self {
        let image_url = row
            .attachment_path
            .as_ref()
            .map(|_| format!("/notes/{}/image", row.id));
        Self {
            id: row.note_id(),
            user_id: row.owner(),
            title: row.title,
            content: row.content,
            attachment_path: row.attachment_path,
            image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListResponse {
    pub notes: Vec<NoteResponse>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct DeleteNoteResponse {
    pub id: NoteId,
    pub message: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_note_id(raw: &str) -> ApiResult<NoteId> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid note ID".to_string()))
}

fn check_title(title: Option<&str>) -> ApiResult<()> {
    match title {
        Some(t) if !limits::fits(t, MAX_TITLE_CHARS) => Err(ApiError::BadRequest(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters"
        ))),
        _ => Ok(()),
    }
}

/// Save a new attachment for `note`, point the row at it and drop the old
/// file. The new file is removed again if the row update fails.
async fn replace_attachment(
    state: &AppState,
    note: &NoteRow,
    owner: UserId,
    mut changes: NoteChanges,
    image: UploadedFile,
) -> ApiResult<NoteRow> {
    let attachments = state.attachments();
    let stored = attachments.save(&image.file_name, &image.bytes).await?;
    changes.attachment_path = Some(stored.clone());

    let updated = match state.store().update_note(note.note_id(), owner, &changes).await {
        Ok(row) => row,
        Err(e) => {
            attachments.remove_quietly(&stored).await;
            return Err(e.into());
        }
    };

    if let Some(old) = &note.attachment_path {
        attachments.remove_quietly(old).await;
    }

    Ok(updated)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /notes
async fn create_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    form: NoteForm,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
    let (Some(title), Some(content)) = (form.title, form.content) else {
        return Err(ApiError::BadRequest(
            "Title and content are required".to_string(),
        ));
    };
    check_title(Some(title.as_str()))?;

    let attachments = state.attachments();
    let attachment_path = match &form.image {
        Some(image) => Some(attachments.save(&image.file_name, &image.bytes).await?),
        None => None,
    };

    let inserted = state
        .store()
        .insert_note(&NewNote {
            user_id: user.user_id,
            title,
            content,
            attachment_path: attachment_path.clone(),
        })
        .await;

    let note = match inserted {
        Ok(note) => note,
        Err(e) => {
            if let Some(path) = &attachment_path {
                attachments.remove_quietly(path).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(user_id = %user.user_id, note_id = %note.id, "Note created");

    Ok((StatusCode::CREATED, Json(note.into())))
}

/// GET /notes
async fn list_notes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<NoteListResponse>> {
    let request = params.resolve(&NOTE_SORT_FIELDS);
    let page = state.store().list_notes(user.user_id, &request).await?;

    Ok(Json(NoteListResponse {
        notes: page.items.into_iter().map(NoteResponse::from).collect(),
        meta: page.meta,
    }))
}

/// GET /notes/{id}
async fn get_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<NoteResponse>> {
    let id = parse_note_id(&id)?;
    let note = state.store().get_note(id, user.user_id).await?;
    Ok(Json(note.into()))
}

/// PUT /notes/{id}: partial update; absent fields are kept.
async fn update_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    form: NoteForm,
) -> ApiResult<Json<NoteResponse>> {
    let id = parse_note_id(&id)?;

    check_title(form.title.as_deref())?;
    let changes = NoteChanges {
        title: form.title,
        content: form.content,
        attachment_path: None,
    };
    if changes.is_empty() && form.image.is_none() {
        return Err(ApiError::BadRequest(
            "Provide at least one of title, content or image".to_string(),
        ));
    }

    let updated = match form.image {
        Some(image) => {
            let existing = state.store().get_note(id, user.user_id).await?;
            replace_attachment(&state, &existing, user.user_id, changes, image).await?
        }
        None => state.store().update_note(id, user.user_id, &changes).await?,
    };

    tracing::info!(user_id = %user.user_id, note_id = %id, "Note updated");

    Ok(Json(updated.into()))
}

/// DELETE /notes/{id}
async fn delete_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteNoteResponse>> {
    let id = parse_note_id(&id)?;
    let deleted = state.store().delete_note(id, user.user_id).await?;

    if let Some(path) = &deleted.attachment_path {
        state.attachments().remove_quietly(path).await;
    }

    tracing::info!(user_id = %user.user_id, note_id = %id, "Note deleted");

    Ok(Json(DeleteNoteResponse {
        id,
        message: "Note deleted successfully".to_string(),
    }))
}

/// POST /notes/{id}/image: attach or replace the image.
async fn upload_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    form: NoteForm,
) -> ApiResult<Json<NoteResponse>> {
    let id = parse_note_id(&id)?;
    let image = form
        .image
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let existing = state.store().get_note(id, user.user_id).await?;
    let updated =
        replace_attachment(&state, &existing, user.user_id, NoteChanges::default(), image).await?;

    tracing::info!(user_id = %user.user_id, note_id = %id, "Note image uploaded");

    Ok(Json(updated.into()))
}

/// GET /notes/{id}/image: serve the attached image.
async fn get_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_note_id(&id)?;
    let note = state.store().get_note(id, user.user_id).await?;
    let path = note
        .attachment_path
        .ok_or_else(|| ApiError::NotFound("Note has no image".to_string()))?;

    let stored = state.attachments().read(&path).await?;

    Ok(([(header::CONTENT_TYPE, stored.content_type)], stored.bytes).into_response())
}

/// Build note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", post(create_note).get(list_notes))
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/notes/{id}/image", post(upload_image).get(get_image))
        .layer(DefaultBodyLimit::max(NOTE_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(attachment_path: Option<&str>) -> NoteRow {
        let now = Utc::now();
        NoteRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Groceries".to_string(),
            content: "milk".to_string(),
            attachment_path: attachment_path.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_parse_note_id() {
        assert!(parse_note_id(&Uuid::new_v4().to_string()).is_ok());
        let err = parse_note_id("42").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_check_title_length() {
        assert!(check_title(None).is_ok());
        assert!(check_title(Some("t".repeat(MAX_TITLE_CHARS).as_str())).is_ok());
        let err = check_title(Some("t".repeat(MAX_TITLE_CHARS + 1).as_str())).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_note_response_image_url() {
        let with_image = row(Some("abc.png"));
        let id = with_image.id;
        let response = NoteResponse::from(with_image);
        assert_eq!(response.image_url, Some(format!("/notes/{}/image", id)));

        let response = NoteResponse::from(row(None));
        assert!(response.image_url.is_none());
    }

    #[test]
    fn test_list_response_flattens_meta() {
        let response = NoteListResponse {
            notes: vec![row(None).into()],
            meta: PageMeta::new(25, 3, 10),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["notes"].as_array().unwrap().len(), 1);
        assert_eq!(json["total"], 25);
        assert_eq!(json["page"], 3);
        assert_eq!(json["limit"], 10);
        assert_eq!(json["total_pages"], 3);
    }

    #[test]
    fn test_delete_response_serialize() {
        let id = NoteId::new();
        let json = serde_json::to_value(DeleteNoteResponse {
            id,
            message: "Note deleted successfully".to_string(),
        })
        .unwrap();
        assert_eq!(json["id"], id.to_string());
    }
}
