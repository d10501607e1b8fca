//! Goal Routes
//!
//! - GET /api/goal-settings - Both goal snapshots
//! - POST /api/goal-settings - Merge `likeGoal` / `followGoal`
//! - POST /api/test/like, /api/test/follow - Add progress, capped at the goal
//! - POST /api/cut/like, /api/cut/follow - Reset progress to zero

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{GoalProgressResponse, GoalSettingsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::LenientJson;
use crate::api::state::AppState;
use crate::hub::{GoalKind, GoalState};

/// GET /api/goal-settings
pub async fn get_goal_settings(State(state): State<Arc<AppState>>) -> Json<GoalSettingsResponse> {
    let (like_goal, follow_goal) = state.hub.goal_settings().await;
    Json(GoalSettingsResponse {
        success: true,
        like_goal,
        follow_goal,
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// POST /api/goal-settings
pub async fn save_goal_settings(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<GoalSettingsResponse> {
    let (like_goal, follow_goal) = state.hub.save_goal_settings(body).await;
    Json(GoalSettingsResponse {
        success: true,
        like_goal,
        follow_goal,
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// POST /api/test/like
pub async fn test_like(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> ApiResult<Json<GoalProgressResponse>> {
    let goal = state.hub.test_goal(GoalKind::Like, body).await;
    progress(goal, None)
}

/// POST /api/test/follow
pub async fn test_follow(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> ApiResult<Json<GoalProgressResponse>> {
    let goal = state.hub.test_goal(GoalKind::Follow, body).await;
    progress(goal, None)
}

/// POST /api/cut/like
pub async fn cut_like(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GoalProgressResponse>> {
    let goal = state.hub.cut_goal(GoalKind::Like).await;
    progress(goal, Some("Like goal reset"))
}

/// POST /api/cut/follow
pub async fn cut_follow(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GoalProgressResponse>> {
    let goal = state.hub.cut_goal(GoalKind::Follow).await;
    progress(goal, Some("Follow goal reset"))
}

fn progress(
    goal: Option<GoalState>,
    message: Option<&str>,
) -> ApiResult<Json<GoalProgressResponse>> {
    let goal = goal.ok_or_else(|| ApiError::Internal("Goal state unavailable".to_string()))?;
    Ok(Json(GoalProgressResponse::new(&goal, message.map(str::to_string))))
}
