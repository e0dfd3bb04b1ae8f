//! Route definitions for the HTTP API.

pub mod auth;
pub mod health;
pub mod logs;
pub mod notes;

use axum::{Router, middleware};

use crate::middleware::request_log::capture_request_log;
use crate::state::AppState;

/// Build the complete router with all routes.
///
/// Every route, `/health` included, passes through the request log.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(notes::routes())
        .merge(logs::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            capture_request_log,
        ))
        .with_state(state)
}
