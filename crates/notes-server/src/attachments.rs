//! On-disk storage for note attachments.
//!
//! Files are written under a single directory with generated names
//! (`<uuid>.<ext>`). The database only records that name, never a client
//! supplied path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use notes_core::{AttachmentError, attachment_extension, check_size, content_type_for};
use uuid::Uuid;

/// Attachment storage failures.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentStoreError {
    /// The upload violates the attachment policy.
    #[error(transparent)]
    Rejected(#[from] AttachmentError),

    /// No file with this name.
    #[error("attachment missing: {0}")]
    Missing(String),

    #[error("attachment I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored file read back for serving.
#[derive(Debug)]
pub struct StoredAttachment {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Directory-backed attachment store.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Validate and write an upload. Returns the stored name.
    pub async fn save(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, AttachmentStoreError> {
        let ext = attachment_extension(file_name)?;
        check_size(bytes.len())?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::write(self.root.join(&stored_name), bytes).await?;

        tracing::debug!(stored_name = %stored_name, size = bytes.len(), "Attachment saved");
        Ok(stored_name)
    }

    /// Read a stored attachment.
    pub async fn read(&self, stored_name: &str) -> Result<StoredAttachment, AttachmentStoreError> {
        let path = self.resolve(stored_name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(StoredAttachment {
                bytes,
                content_type: content_type_for(stored_name),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AttachmentStoreError::Missing(stored_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored attachment. A file that is already gone is not an error.
    pub async fn remove(&self, stored_name: &str) -> Result<(), AttachmentStoreError> {
        let path = self.resolve(stored_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an attachment, logging instead of failing. Used after the
    /// owning row has already changed.
    pub async fn remove_quietly(&self, stored_name: &str) {
        if let Err(e) = self.remove(stored_name).await {
            tracing::warn!(stored_name = %stored_name, error = %e, "Failed to remove attachment");
        }
    }

    /// Map a stored name to a path inside the root.
    fn resolve(&self, stored_name: &str) -> Result<PathBuf, AttachmentStoreError> {
        let plain = !stored_name.is_empty()
            && !stored_name.contains(['/', '\\'])
            && stored_name != "."
            && stored_name != "..";
        if !plain {
            return Err(AttachmentStoreError::Missing(stored_name.to_string()));
        }
        Ok(self.root.join(stored_name))
    }
}
