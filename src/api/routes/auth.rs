//! Auth Routes
//!
//! - POST /tikhub/authenticate - Exchange the producer app id for a session token

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{AuthRequest, AuthResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::LenientJson;
use crate::api::state::AppState;

/// POST /tikhub/authenticate
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    LenientJson(req): LenientJson<AuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let session_token = state
        .hub
        .authenticate(&req.app_id, req.secret_key.as_deref())
        .await
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    Ok(Json(AuthResponse {
        success: true,
        session_token,
        message: "Authenticated successfully".to_string(),
    }))
}
