use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::require_session;
use crate::models::{Category, Certification, KeySkill, Project, TimelineEvent};
use crate::state::AppState;
use protected::collection::{self, Routed};

/// Full HTTP surface: public routes, gated `/api/*` routes and the
/// published blob files under `/files`.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let protected = Router::new()
        .merge(auth_routes())
        .merge(collection_routes::<Project>("/api/projects"))
        .merge(collection_routes::<Certification>("/api/certifications"))
        .merge(collection_routes::<TimelineEvent>("/api/timeline"))
        .merge(collection_routes::<KeySkill>("/api/key-skills"))
        .merge(skill_routes())
        .merge(blob_routes())
        .merge(dashboard_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Gated
        .merge(protected)
        .nest_service("/files", ServeDir::new(&config.storage.blob_dir))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|origin| origin.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/password-reset", post(auth::password_reset))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/session", delete(auth::logout))
}

fn collection_routes<T: Routed>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(collection::list::<T>).post(collection::create::<T>))
        .route(&format!("{path}/remove"), post(collection::remove_many::<T>))
        .route(&format!("{path}/reload"), post(collection::reload::<T>))
        .route(
            &format!("{path}/:id"),
            get(collection::show::<T>)
                .patch(collection::update::<T>)
                .delete(collection::remove::<T>),
        )
}

fn skill_routes() -> Router<AppState> {
    use protected::skills;

    Router::new()
        .route(
            "/api/skills",
            get(collection::list::<Category>).post(skills::create_category),
        )
        .route("/api/skills/remove", post(collection::remove_many::<Category>))
        .route("/api/skills/reload", post(collection::reload::<Category>))
        .route("/api/skills/by-name/:name", delete(skills::remove_category))
        .route(
            "/api/skills/:id",
            get(collection::show::<Category>)
                .patch(collection::update::<Category>)
                .delete(skills::remove_category),
        )
        .route("/api/skills/:id/skills", post(skills::add_skill))
        .route(
            "/api/skills/:id/skills/:skill",
            patch(skills::update_skill).delete(skills::remove_skill),
        )
}

fn blob_routes() -> Router<AppState> {
    use protected::blob;

    Router::new().route("/api/blob", get(blob::list).post(blob::upload).delete(blob::delete))
}

fn dashboard_routes() -> Router<AppState> {
    use protected::activity;

    Router::new()
        .route("/api/activity", get(activity::recent))
        .route("/api/dashboard/stats", get(activity::stats))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Folio API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Portfolio content API",
            "endpoints": {
                "home": "/ (public)",
                "public_auth": "/auth/login, /auth/password-reset (public)",
                "auth": "/api/auth/whoami, /api/auth/session (protected)",
                "collections": "/api/{projects,certifications,timeline,key-skills,skills}[/:id] (protected)",
                "skills": "/api/skills/:id/skills[/:skill] (protected)",
                "blob": "/api/blob (protected)",
                "activity": "/api/activity (protected)",
                "dashboard": "/api/dashboard/stats (protected)",
                "files": "/files/* (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.documents.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "documents": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "document store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "documents_error": e.to_string()
                }
            })),
        ),
    }
}
