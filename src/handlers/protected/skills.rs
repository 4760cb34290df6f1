use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Category, Skill};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewSkill {
    pub name: String,
    #[serde(default)]
    pub level: i64,
}

#[derive(Debug, Deserialize)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub level: Option<i64>,
}

/// POST /api/skills
pub async fn create_category(State(state): State<AppState>, Json(payload): Json<NewCategory>) -> ApiResult<Category> {
    let category = state.portfolio.skills.add_category(&payload.name).await?;
    Ok(ApiResponse::created(category))
}

/// DELETE /api/skills/:id and DELETE /api/skills/by-name/:name.
/// Nested skills go with the category.
pub async fn remove_category(State(state): State<AppState>, Path(id_or_name): Path<String>) -> ApiResult<Category> {
    state
        .portfolio
        .skills
        .remove_category(&id_or_name)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("category '{}' not found", id_or_name)))
}

/// POST /api/skills/:id/skills
pub async fn add_skill(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(payload): Json<NewSkill>,
) -> ApiResult<Skill> {
    let skill = state
        .portfolio
        .skills
        .add_skill(&category, Skill::new(payload.name, payload.level))
        .await?;
    Ok(ApiResponse::created(skill))
}

/// PATCH /api/skills/:id/skills/:skill
pub async fn update_skill(
    State(state): State<AppState>,
    Path((category, skill_id)): Path<(String, String)>,
    Json(patch): Json<SkillPatch>,
) -> ApiResult<Skill> {
    let skill = state
        .portfolio
        .skills
        .update_skill(&category, &skill_id, patch.name, patch.level)
        .await?;
    Ok(ApiResponse::success(skill))
}

/// DELETE /api/skills/:id/skills/:skill
pub async fn remove_skill(
    State(state): State<AppState>,
    Path((category, skill_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    if !state.portfolio.skills.remove_skill(&category, &skill_id).await? {
        return Err(ApiError::not_found(format!("skill '{}' not found in '{}'", skill_id, category)));
    }
    Ok(ApiResponse::success(json!({ "id": skill_id, "removed": true })))
}
