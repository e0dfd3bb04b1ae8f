//! Pagination parameters for list endpoints.
//!
//! Raw query parameters arrive as [`ListParams`] and are normalized into a
//! [`PageRequest`] against the [`SortFields`] allow-list of the resource being
//! listed. Normalization never fails: unknown sort fields fall back to the
//! resource default, unknown orders to `DESC`, and out-of-range or
//! non-numeric page/limit values to their defaults.
//!
//! The resolved sort field is always one of the `&'static str` values of the
//! allow-list, so it can be interpolated into SQL as an identifier.

use serde::{Deserialize, Serialize};

/// Page used when the request omits or mangles `page`.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the request omits or mangles `limit`.
pub const DEFAULT_LIMIT: i64 = 10;

/// Sortable columns of the `notes` table.
pub const NOTE_SORT_FIELDS: SortFields =
    SortFields::new(&["created_at", "updated_at", "title"], "created_at");

/// Sortable columns of the `logs` table.
pub const LOG_SORT_FIELDS: SortFields = SortFields::new(
    &["datetime", "created_at", "method", "endpoint", "status_code"],
    "datetime",
);

// ============================================================================
// Sort Order
// ============================================================================

/// Direction of the `ORDER BY` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a requested order. Matching is case-insensitive; anything other
    /// than `asc`/`desc` yields `Desc`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// SQL keyword for this order.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

// ============================================================================
// Sort Field Allow-List
// ============================================================================

/// Allow-list of sortable columns for one resource, plus its default.
#[derive(Debug, Clone, Copy)]
pub struct SortFields {
    allowed: &'static [&'static str],
    default: &'static str,
}

impl SortFields {
    /// Create an allow-list. `default` should be a member of `allowed`.
    pub const fn new(allowed: &'static [&'static str], default: &'static str) -> Self {
        Self { allowed, default }
    }

    /// Resolve a requested sort field to an allow-listed column.
    ///
    /// Matching is exact; anything not in the list resolves to the default.
    pub fn resolve(&self, requested: Option<&str>) -> &'static str {
        requested
            .and_then(|r| self.allowed.iter().copied().find(|field| *field == r))
            .unwrap_or(self.default)
    }

    /// The allowed columns.
    pub fn allowed(&self) -> &'static [&'static str] {
        self.allowed
    }

    /// The fallback column.
    pub fn default_field(&self) -> &'static str {
        self.default
    }
}

// ============================================================================
// Raw and Resolved Parameters
// ============================================================================

/// Query parameters accepted by list endpoints, as sent by the client.
///
/// `page` and `limit` are kept as strings so that non-numeric input falls
/// back to the defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// Normalize against the allow-list of the listed resource.
    pub fn resolve(&self, fields: &SortFields) -> PageRequest {
        let search = self
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        PageRequest {
            search,
            sort_by: fields.resolve(self.sort_by.as_deref()),
            order: SortOrder::parse(self.order.as_deref()),
            page: parse_positive(self.page.as_deref(), DEFAULT_PAGE),
            limit: parse_positive(self.limit.as_deref(), DEFAULT_LIMIT),
        }
    }
}

/// Parse a strictly positive integer, falling back to `default`.
fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Normalized pagination parameters, safe to hand to the query builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Free-text search term; `None` when absent or blank.
    pub search: Option<String>,
    /// Allow-listed sort column.
    pub sort_by: &'static str,
    pub order: SortOrder,
    /// 1-based page number, always >= 1.
    pub page: i64,
    /// Page size, always >= 1.
    pub limit: i64,
}

impl PageRequest {
    /// Rows to skip before this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PageMeta {
    /// Compute metadata; `total_pages` is `ceil(total / limit)`.
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 && total > 0 {
            (total - 1) / limit + 1
        } else {
            0
        };

        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// One page of items plus its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Convert the items, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
