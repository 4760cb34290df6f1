use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::debug;

use crate::auth::{GateOutcome, Identity, SessionState};
use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the bearer token into a session and run it through the auth gate.
///
/// Authorized requests continue with the [`Identity`] as an extension.
/// Anything else is answered with 401 and a `Location` pointing at the login
/// route; the protected handler never runs.
pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = bearer_token(request.headers()).map(str::to_string);
    let session = match token {
        Some(token) => match state.auth.resolve(&token).await {
            Ok(identity) => SessionState::resolved(Some(identity)),
            Err(e) => {
                debug!("Session rejected: {}", e);
                SessionState::resolved(None)
            }
        },
        None => SessionState::resolved(None),
    };

    match state.gate.guard(&session, Identity::clone) {
        GateOutcome::Render(identity) => {
            debug!("Gate passed for {}", identity.email);
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        GateOutcome::Redirect(login_route) => {
            debug!("Gate redirecting {} to {}", request.uri().path(), login_route);
            redirect_to_login(&login_route)
        }
        GateOutcome::Loading => ApiError::service_unavailable("Session is still being resolved").into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn redirect_to_login(login_route: &str) -> Response {
    let api_error = ApiError::unauthorized("Authentication required");
    let mut body = api_error.to_json();
    body["redirect"] = json!(login_route);

    let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    if let Ok(location) = HeaderValue::from_str(login_route) {
        response.headers_mut().insert(header::LOCATION, location);
    }
    response
}
