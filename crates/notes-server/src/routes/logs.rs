//! Request log routes.
//!
//! Logs are not owned by anyone: any authenticated user may browse them.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use notes_core::{LOG_SORT_FIELDS, ListParams, LogId, PageMeta};
use notes_store::RequestLogRow;
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub id: LogId,
    pub datetime: DateTime<Utc>,
    pub method: String,
    pub endpoint: String,
    pub headers: serde_json::Value,
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
}

impl From<RequestLogRow> for LogResponse {
    fn from(row: RequestLogRow) -> Self {
        Self {
            id: row.log_id(),
            datetime: row.datetime,
            method: row.method,
            endpoint: row.endpoint,
            headers: row.headers,
            request_body: row.request_body,
            response_body: row.response_body,
            status_code: row.status_code,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogListResponse {
    pub logs: Vec<LogResponse>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// GET /logs
async fn list_logs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<LogListResponse>> {
    let request = params.resolve(&LOG_SORT_FIELDS);
    let page = state.store().list_request_logs(&request).await?;

    Ok(Json(LogListResponse {
        logs: page.items.into_iter().map(LogResponse::from).collect(),
        meta: page.meta,
    }))
}

/// GET /logs/{id}
async fn get_log(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<LogResponse>> {
    let id: LogId = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid log ID".to_string()))?;
    let log = state.store().get_request_log(id).await?;
    Ok(Json(log.into()))
}

/// Build log routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_logs))
        .route("/logs/{id}", get(get_log))
}
