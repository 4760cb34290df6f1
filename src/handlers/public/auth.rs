use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Session;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetBody {
    #[serde(default)]
    pub email: String,
}

/// POST /auth/login - exchange owner credentials for a session token
///
/// ```json
/// { "success": true, "data": { "token": "eyJ...", "user": { "uid": "...", "email": "..." }, "expires_in": 604800 } }
/// ```
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> ApiResult<Session> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation_error("Email and password are required", None));
    }

    let session = state.auth.sign_in(&payload.email, &payload.password).await?;
    Ok(ApiResponse::success(session))
}

/// POST /auth/password-reset - always answers success for a well-formed email
pub async fn password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetBody>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::validation_error("A valid email is required", None));
    }

    state.auth.send_password_reset(email).await?;
    Ok(Json(json!({ "success": true })))
}
