//! Authentication routes: register, login, me.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use notes_core::UserId;
use notes_store::UserRow;
use serde::{Deserialize, Serialize};

use crate::accounts::{self, Session};
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id(),
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /register
async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let session = accounts::register(
        state.store(),
        state.tokens(),
        &request.email,
        &request.password,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let session = accounts::login(
        state.store(),
        state.tokens(),
        &request.email,
        &request.password,
    )
    .await?;

    Ok(Json(session.into()))
}

/// GET /me: current user info.
async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<Json<MeResponse>> {
    let row = state
        .store()
        .get_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse { user: row.into() }))
}

/// Build auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}
