//! State Routes
//!
//! - GET /state/:overlayType - Current snapshot, for overlay initialization

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::StateResponse;
use crate::api::state::AppState;
use crate::hub::Topic;

/// GET /state/:overlayType
///
/// Unknown overlay types answer with a null state rather than an error.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(overlay_type): Path<String>,
) -> Json<StateResponse> {
    let snapshot = match overlay_type.parse::<Topic>() {
        Ok(topic) => state.hub.snapshot(topic).await,
        Err(e) => {
            tracing::debug!(error = %e, "State requested for unknown overlay");
            Value::Null
        }
    };

    Json(StateResponse {
        success: true,
        state: snapshot,
        timestamp: Utc::now().timestamp_millis(),
    })
}
