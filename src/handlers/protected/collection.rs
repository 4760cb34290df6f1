//! Handlers shared by every flat collection. Each route instantiates them
//! with the record type, e.g. `get(collection::list::<Project>)`.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::collection::{CollectionStore, Entity};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Category, Certification, KeySkill, Project, TimelineEvent};
use crate::services::Portfolio;
use crate::state::AppState;

/// Record types reachable through the collection routes
pub trait Routed: Entity {
    fn store(portfolio: &Portfolio) -> &Arc<CollectionStore<Self>>;
}

impl Routed for Project {
    fn store(portfolio: &Portfolio) -> &Arc<CollectionStore<Self>> {
        &portfolio.projects
    }
}

impl Routed for Certification {
    fn store(portfolio: &Portfolio) -> &Arc<CollectionStore<Self>> {
        &portfolio.certifications
    }
}

impl Routed for TimelineEvent {
    fn store(portfolio: &Portfolio) -> &Arc<CollectionStore<Self>> {
        &portfolio.timeline
    }
}

impl Routed for KeySkill {
    fn store(portfolio: &Portfolio) -> &Arc<CollectionStore<Self>> {
        portfolio.skills.key_skills_store()
    }
}

impl Routed for Category {
    fn store(portfolio: &Portfolio) -> &Arc<CollectionStore<Self>> {
        portfolio.skills.categories_store()
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub ids: Vec<String>,
}

/// GET /api/:collection
pub async fn list<T: Routed>(State(state): State<AppState>) -> ApiResult<Vec<T>> {
    let store = T::store(&state.portfolio);
    store.ensure_loaded().await?;
    Ok(ApiResponse::success(store.list().await))
}

/// POST /api/:collection/reload - refetch the remote array into the mirror
pub async fn reload<T: Routed>(State(state): State<AppState>) -> ApiResult<Vec<T>> {
    let records = T::store(&state.portfolio).load().await?;
    Ok(ApiResponse::success(records))
}

/// GET /api/:collection/:id
pub async fn show<T: Routed>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<T> {
    let store = T::store(&state.portfolio);
    store.ensure_loaded().await?;
    store
        .get(&id)
        .await
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("{} '{}' not found", T::KIND, id)))
}

/// POST /api/:collection - validate and append; the store assigns the id
pub async fn create<T: Routed>(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<T> {
    let record: T = serde_json::from_value(payload)
        .map_err(|e| ApiError::validation_error(format!("Invalid {}: {}", T::KIND, e), None))?;

    let stored = T::store(&state.portfolio).add(record).await?;
    Ok(ApiResponse::created(stored))
}

/// PATCH /api/:collection/:id - shallow merge of the given fields
pub async fn update<T: Routed>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Map<String, Value>>,
) -> ApiResult<T> {
    let updated = T::store(&state.portfolio).update(&id, patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/:collection/:id
pub async fn remove<T: Routed>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    if !T::store(&state.portfolio).remove(&id).await? {
        return Err(ApiError::not_found(format!("{} '{}' not found", T::KIND, id)));
    }
    Ok(ApiResponse::success(json!({ "id": id, "removed": true })))
}

/// POST /api/:collection/remove - `{ids: [...]}`, absent ids are skipped
pub async fn remove_many<T: Routed>(
    State(state): State<AppState>,
    Json(payload): Json<RemoveRequest>,
) -> ApiResult<Value> {
    let removed = T::store(&state.portfolio).remove_many(&payload.ids).await?;
    Ok(ApiResponse::success(json!({ "requested": payload.ids.len(), "removed": removed })))
}
