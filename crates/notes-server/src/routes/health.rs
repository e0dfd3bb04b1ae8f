//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// What the health check learned about the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseState {
    Ok,
    /// Reachable, but tables are missing.
    Uninitialized,
    Unavailable,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status: "ok", or "degraded" when the database is not usable.
    pub status: &'static str,
    /// Database status: "ok", "uninitialized" or "unavailable".
    pub database: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    fn new(database: DatabaseState) -> Self {
        let (status, database) = match database {
            DatabaseState::Ok => ("ok", "ok"),
            DatabaseState::Uninitialized => ("degraded", "uninitialized"),
            DatabaseState::Unavailable => ("degraded", "unavailable"),
        };
        Self {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// GET /health - Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.store().schema_ready().await {
        Ok(true) => DatabaseState::Ok,
        Ok(false) => {
            tracing::warn!("Health check found the schema incomplete");
            DatabaseState::Uninitialized
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            DatabaseState::Unavailable
        }
    };

    Json(HealthResponse::new(database))
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response() {
        let healthy = HealthResponse::new(DatabaseState::Ok);
        assert_eq!(healthy.status, "ok");
        assert_eq!(healthy.database, "ok");

        let empty = HealthResponse::new(DatabaseState::Uninitialized);
        assert_eq!(empty.status, "degraded");
        assert_eq!(empty.database, "uninitialized");

        let down = HealthResponse::new(DatabaseState::Unavailable);
        assert_eq!(down.status, "degraded");
        assert_eq!(down.database, "unavailable");
    }
}
