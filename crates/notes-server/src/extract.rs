//! Request body extractors that reject with [`ApiError`] instead of axum's
//! plain-text rejections.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body; malformed input becomes a 400 with the usual error body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

// ============================================================================
// Note Forms
// ============================================================================

/// Multipart field names accepted for the attached image.
pub const IMAGE_FIELDS: &[&str] = &["image", "image_path"];

/// A file received in a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-side file name; only its extension is used.
    pub file_name: String,
    pub bytes: Bytes,
}

/// Fields of a note create/update request.
///
/// Empty strings are treated as absent.
#[derive(Debug, Default)]
pub struct NoteForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<UploadedFile>,
}

#[derive(Debug, Deserialize)]
struct NoteJson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl NoteForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = NoteForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" | "content" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    if name == "title" {
                        form.title = non_empty(Some(text));
                    } else {
                        form.content = non_empty(Some(text));
                    }
                }
                n if IMAGE_FIELDS.contains(&n) => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    // Browsers send an empty part when no file was chosen.
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        form.image = Some(UploadedFile { file_name, bytes });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

impl FromRequest<AppState> for NoteForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(body) = Json::<NoteJson>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(Self {
                title: non_empty(body.title),
                content: non_empty(body.content),
                image: None,
            })
        }
    }
}
