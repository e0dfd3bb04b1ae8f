//! Paginated list query builder.
//!
//! Every list endpoint runs the same shape of query: a fixed filter (such as
//! the owner of a note), an optional case-insensitive search over a set of
//! text columns, an allow-listed `ORDER BY`, and `LIMIT`/`OFFSET`. A matching
//! `COUNT(*)` query with the same filter and search gives the total.
//!
//! User input only ever reaches the SQL text through bind parameters. The
//! sort column comes from a [`SortFields`](notes_core::SortFields) allow-list
//! and the direction from [`SortOrder`](notes_core::SortOrder), both of which
//! are `&'static str` values owned by this codebase.

use notes_core::PageRequest;
use sqlx::postgres::PgArguments;
use uuid::Uuid;

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Uuid(Uuid),
    Text(String),
    BigInt(i64),
}

/// Static description of a listable resource.
#[derive(Debug, Clone, Copy)]
pub struct ListQuery<'a> {
    /// `SELECT <columns> FROM <table>`.
    pub select: &'a str,
    /// `SELECT COUNT(*) FROM <table>`.
    pub count: &'a str,
    /// Condition applied to every row, numbered from `$1`.
    pub filter: Option<&'a str>,
    /// Columns matched against the search term.
    pub search_columns: &'a [&'a str],
}

/// Data and count statements with their arguments, ready to bind.
#[derive(Debug, Clone)]
pub struct PaginatedQuery {
    pub data_sql: String,
    pub data_args: Vec<SqlArg>,
    pub count_sql: String,
    pub count_args: Vec<SqlArg>,
}

/// Build the data and count statements for one page.
///
/// `filter_args` are the values for the placeholders in `spec.filter`; the
/// search, limit and offset placeholders are numbered after them.
pub fn build_paginated_query(
    spec: &ListQuery<'_>,
    page: &PageRequest,
    filter_args: Vec<SqlArg>,
) -> PaginatedQuery {
    let mut conditions: Vec<String> = Vec::new();
    let mut args = filter_args;

    if let Some(filter) = spec.filter {
        conditions.push(filter.to_string());
    }

    if let Some(term) = page.search.as_deref() {
        if !spec.search_columns.is_empty() {
            args.push(SqlArg::Text(format!("%{}%", escape_like(term))));
            let placeholder = args.len();
            let matches: Vec<String> = spec
                .search_columns
                .iter()
                .map(|col| format!("{col} ILIKE ${placeholder}"))
                .collect();
            conditions.push(format!("({})", matches.join(" OR ")));
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("{}{}", spec.count, where_clause);
    let count_args = args.clone();

    let limit_idx = args.len() + 1;
    let offset_idx = args.len() + 2;
    let data_sql = format!(
        "{}{} ORDER BY {} {} LIMIT ${} OFFSET ${}",
        spec.select,
        where_clause,
        page.sort_by,
        page.order.as_sql(),
        limit_idx,
        offset_idx
    );
    args.push(SqlArg::BigInt(page.limit));
    args.push(SqlArg::BigInt(page.offset()));

    PaginatedQuery {
        data_sql,
        data_args: args,
        count_sql,
        count_args,
    }
}

/// Escape `LIKE` metacharacters so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Bind a slice of `SqlArg` to a sqlx `QueryAs`.
pub(crate) fn bind_args<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    args: &'q [SqlArg],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments> {
    for arg in args {
        match arg {
            SqlArg::Uuid(v) => q = q.bind(*v),
            SqlArg::Text(v) => q = q.bind(v.as_str()),
            SqlArg::BigInt(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `SqlArg` to a sqlx `QueryScalar`.
pub(crate) fn bind_args_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, PgArguments>,
    args: &'q [SqlArg],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, PgArguments> {
    for arg in args {
        match arg {
            SqlArg::Uuid(v) => q = q.bind(*v),
            SqlArg::Text(v) => q = q.bind(v.as_str()),
            SqlArg::BigInt(v) => q = q.bind(*v),
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_core::{ListParams, LOG_SORT_FIELDS, NOTE_SORT_FIELDS};

    const NOTES: ListQuery<'static> = ListQuery {
        select: "SELECT * FROM notes",
        count: "SELECT COUNT(*) FROM notes",
        filter: Some("user_id = $1"),
        search_columns: &["title", "content"],
    };

    const LOGS: ListQuery<'static> = ListQuery {
        select: "SELECT * FROM logs",
        count: "SELECT COUNT(*) FROM logs",
        filter: None,
        search_columns: &["method", "endpoint", "request_body", "response_body"],
    };

    fn page(search: Option<&str>) -> PageRequest {
        ListParams {
            search: search.map(str::to_string),
            page: Some("2".to_string()),
            limit: Some("5".to_string()),
            ..Default::default()
        }
        .resolve(&NOTE_SORT_FIELDS)
    }

    #[test]
    fn filter_without_search() {
        let owner = Uuid::new_v4();
        let q = build_paginated_query(&NOTES, &page(None), vec![SqlArg::Uuid(owner)]);

        assert_eq!(
            q.data_sql,
            "SELECT * FROM notes WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        assert_eq!(
            q.data_args,
            vec![SqlArg::Uuid(owner), SqlArg::BigInt(5), SqlArg::BigInt(5)]
        );
        assert_eq!(q.count_sql, "SELECT COUNT(*) FROM notes WHERE user_id = $1");
        assert_eq!(q.count_args, vec![SqlArg::Uuid(owner)]);
    }

    #[test]
    fn filter_with_search() {
        let owner = Uuid::new_v4();
        let q = build_paginated_query(&NOTES, &page(Some("milk")), vec![SqlArg::Uuid(owner)]);

        assert_eq!(
            q.data_sql,
            "SELECT * FROM notes WHERE user_id = $1 AND (title ILIKE $2 OR content ILIKE $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        assert_eq!(q.data_args[1], SqlArg::Text("%milk%".to_string()));
        assert_eq!(
            q.count_sql,
            "SELECT COUNT(*) FROM notes WHERE user_id = $1 AND (title ILIKE $2 OR content ILIKE $2)"
        );
        assert_eq!(q.count_args.len(), 2);
    }

    #[test]
    fn search_without_filter_uses_where() {
        let request = ListParams {
            search: Some("POST".to_string()),
            sort_by: Some("status_code".to_string()),
            order: Some("asc".to_string()),
            ..Default::default()
        }
        .resolve(&LOG_SORT_FIELDS);
        let q = build_paginated_query(&LOGS, &request, Vec::new());

        assert_eq!(
            q.data_sql,
            "SELECT * FROM logs WHERE (method ILIKE $1 OR endpoint ILIKE $1 OR \
             request_body ILIKE $1 OR response_body ILIKE $1) \
             ORDER BY status_code ASC LIMIT $2 OFFSET $3"
        );
        assert!(q.count_sql.starts_with("SELECT COUNT(*) FROM logs WHERE ("));
    }

    #[test]
    fn no_filter_no_search() {
        let request = ListParams::default().resolve(&LOG_SORT_FIELDS);
        let q = build_paginated_query(&LOGS, &request, Vec::new());

        assert_eq!(
            q.data_sql,
            "SELECT * FROM logs ORDER BY datetime DESC LIMIT $1 OFFSET $2"
        );
        assert_eq!(q.data_args, vec![SqlArg::BigInt(10), SqlArg::BigInt(0)]);
        assert_eq!(q.count_sql, "SELECT COUNT(*) FROM logs");
        assert!(q.count_args.is_empty());
    }

    #[test]
    fn search_term_never_reaches_sql_text() {
        let hostile = "'; DROP TABLE notes; --";
        let q = build_paginated_query(&NOTES, &page(Some(hostile)), vec![SqlArg::Uuid(Uuid::nil())]);

        assert!(!q.data_sql.contains("DROP"));
        assert!(!q.count_sql.contains("DROP"));
        assert_eq!(q.data_args[1], SqlArg::Text(format!("%{hostile}%")));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("C:\\dir"), "C:\\\\dir");
        assert_eq!(escape_like("plain"), "plain");
    }
}
