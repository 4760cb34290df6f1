use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/auth/whoami
pub async fn whoami(Extension(identity): Extension<Identity>) -> ApiResult<Identity> {
    Ok(ApiResponse::success(identity))
}

/// DELETE /api/auth/session - revoke the token used for this request
pub async fn logout(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> ApiResult<Value> {
    state.auth.sign_out(&identity).await?;
    Ok(ApiResponse::success(json!({ "signed_out": true })))
}
