use axum::extract::State;

use crate::activity::ActivityEntry;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DashboardStats;
use crate::state::AppState;

/// GET /api/activity - newest entries across every activity source
pub async fn recent(State(state): State<AppState>) -> ApiResult<Vec<ActivityEntry>> {
    Ok(ApiResponse::success(state.activity.recent().await))
}

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    Ok(ApiResponse::success(state.portfolio.stats().await))
}
