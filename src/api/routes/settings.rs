//! Settings Routes
//!
//! Editor endpoints for overlays with persistent configuration.
//!
//! - GET/POST /api/giftvsgift - Gift-vs-gift battle (merge)
//! - GET/POST /api/topgift-settings - Top gift leaderboard settings (merge)
//! - GET/POST /api/topstreak-settings - Top streak leaderboard settings (merge)
//! - POST /api/chat-overlay - Chat overlay settings (replace)

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{AckResponse, DeliveredResponse, SettingsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::LenientJson;
use crate::api::state::AppState;
use crate::hub::Topic;

/// GET /api/giftvsgift
///
/// Returns the battle state itself, not wrapped in an envelope.
pub async fn get_gift_vs_gift(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.hub.snapshot(Topic::GiftVsGift).await)
}

/// POST /api/giftvsgift
pub async fn save_gift_vs_gift(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> ApiResult<Json<AckResponse>> {
    state
        .hub
        .save_gift_vs_gift(body)
        .await
        .ok_or_else(|| ApiError::Internal("Failed to save gift vs gift config".to_string()))?;
    Ok(Json(AckResponse::ok("Gift vs gift config saved")))
}

/// GET /api/topgift-settings
pub async fn get_top_gift_settings(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    settings_response(&state, Topic::TopGift).await
}

/// POST /api/topgift-settings
pub async fn save_top_gift_settings(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> ApiResult<Json<SettingsResponse>> {
    save_settings(&state, Topic::TopGift, body).await
}

/// GET /api/topstreak-settings
pub async fn get_top_streak_settings(
    State(state): State<Arc<AppState>>,
) -> Json<SettingsResponse> {
    settings_response(&state, Topic::TopStreak).await
}

/// POST /api/topstreak-settings
pub async fn save_top_streak_settings(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> ApiResult<Json<SettingsResponse>> {
    save_settings(&state, Topic::TopStreak, body).await
}

/// POST /api/chat-overlay
///
/// Accepts `{settings: {...}}` or the settings object itself.
pub async fn save_chat_overlay(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> ApiResult<Json<DeliveredResponse>> {
    let settings = match body {
        Value::Object(mut map) => match map.remove("settings") {
            Some(settings) if !settings.is_null() => settings,
            _ => Value::Object(map),
        },
        other => other,
    };

    let sent_to = state
        .hub
        .replace_settings(Topic::Chat, settings)
        .await
        .ok_or_else(|| ApiError::Internal("Failed to save chat overlay settings".to_string()))?;

    Ok(Json(DeliveredResponse {
        success: true,
        sent_to,
        message: "Chat overlay settings updated and broadcasted".to_string(),
    }))
}

async fn settings_response(state: &AppState, topic: Topic) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        success: true,
        settings: state.hub.settings(topic).await.unwrap_or(Value::Null),
    })
}

async fn save_settings(
    state: &AppState,
    topic: Topic,
    body: Value,
) -> ApiResult<Json<SettingsResponse>> {
    let settings = state
        .hub
        .merge_settings(topic, body)
        .await
        .ok_or_else(|| ApiError::Internal("Failed to save settings".to_string()))?;
    Ok(Json(SettingsResponse {
        success: true,
        settings,
    }))
}
