//! Length limits mirroring the `VARCHAR` columns of the schema.

/// Longest accepted email, in characters.
pub const MAX_EMAIL_CHARS: usize = 255;

/// Longest accepted note title, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Whether `value` fits a column of `max` characters.
///
/// Counts characters, not bytes, the way PostgreSQL measures `VARCHAR(n)`.
pub fn fits(value: &str, max: usize) -> bool {
    value.chars().nth(max).is_none()
}
