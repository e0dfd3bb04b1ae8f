//! notes-core: domain types shared by the notes API crates.
//!
//! This crate provides:
//! - Typed identifiers for users, notes and request logs
//! - Pagination parameters and their normalization rules (sort allow-lists,
//!   page/limit clamping, page metadata)
//! - The attachment policy (allowed image extensions, size limit)
//! - Length limits of the text columns
//!
//! It has no I/O; the storage and HTTP crates build on it.

pub mod attachment;
pub mod limits;
pub mod pagination;
pub mod types;

pub use attachment::{
    ALLOWED_EXTENSIONS, AttachmentError, MAX_ATTACHMENT_BYTES, attachment_extension, check_size,
    content_type_for,
};
pub use limits::{MAX_EMAIL_CHARS, MAX_TITLE_CHARS};
pub use pagination::{
    DEFAULT_LIMIT, DEFAULT_PAGE, LOG_SORT_FIELDS, ListParams, NOTE_SORT_FIELDS, Page, PageMeta,
    PageRequest, SortFields, SortOrder,
};
pub use types::{LogId, NoteId, UserId};
