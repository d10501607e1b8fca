//! Action Routes
//!
//! The producing application owns action execution; the hub only keeps
//! the list its editors show.
//!
//! - GET /api/actions
//! - POST /api/actions - Replace the list; body must carry an `actions` array
//! - POST /api/execute-action - Acknowledged, never executed here

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{
    AckResponse, ActionsRequest, ActionsResponse, ExecuteActionRequest, ExecuteActionResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::LenientJson;
use crate::api::state::AppState;

/// GET /api/actions
pub async fn list_actions(State(state): State<Arc<AppState>>) -> Json<ActionsResponse> {
    Json(ActionsResponse {
        success: true,
        actions: state.hub.actions().await,
    })
}

/// POST /api/actions
pub async fn save_actions(
    State(state): State<Arc<AppState>>,
    LenientJson(req): LenientJson<ActionsRequest>,
) -> ApiResult<Json<AckResponse>> {
    let Value::Array(actions) = req.actions else {
        return Err(ApiError::Validation("Actions must be an array".to_string()));
    };

    state.hub.set_actions(actions).await;
    Ok(Json(AckResponse::ok("Actions updated")))
}

/// POST /api/execute-action
pub async fn execute_action(
    LenientJson(req): LenientJson<ExecuteActionRequest>,
) -> Json<ExecuteActionResponse> {
    tracing::info!(action = %req.label(), "Overlay requested action execution");
    Json(ExecuteActionResponse {
        success: true,
        message: "Action execution is handled by the producing application".to_string(),
        note: "Browser overlays are for display only".to_string(),
    })
}
