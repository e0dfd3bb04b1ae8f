//! Attachment policy: which image files a note may carry.

use thiserror::Error;

/// Accepted attachment extensions (lowercase, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Largest accepted attachment, in bytes (5 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Reasons an uploaded file is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    /// Extension missing or not in [`ALLOWED_EXTENSIONS`].
    #[error("invalid file type: allowed extensions are .jpg, .jpeg, .png, .gif")]
    InvalidFileType,

    /// File is larger than [`MAX_ATTACHMENT_BYTES`].
    #[error("file too large: {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    /// Zero-length upload.
    #[error("uploaded file is empty")]
    Empty,
}

/// Validate an uploaded file name and return its canonical extension.
///
/// The extension is compared case-insensitively and must match exactly.
pub fn attachment_extension(file_name: &str) -> Result<&'static str, AttachmentError> {
    let (_, ext) = file_name
        .rsplit_once('.')
        .ok_or(AttachmentError::InvalidFileType)?;

    ALLOWED_EXTENSIONS
        .iter()
        .copied()
        .find(|allowed| allowed.eq_ignore_ascii_case(ext))
        .ok_or(AttachmentError::InvalidFileType)
}

/// Check the size of an upload against the policy.
pub fn check_size(size: usize) -> Result<(), AttachmentError> {
    if size == 0 {
        return Err(AttachmentError::Empty);
    }
    if size > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge {
            size,
            max: MAX_ATTACHMENT_BYTES,
        });
    }
    Ok(())
}

/// MIME type to serve a stored attachment with, by extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
