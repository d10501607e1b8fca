//! Event Routes
//!
//! Endpoints the producing application posts live stream events to.
//! Every one answers success once the event is dispatched, whatever the
//! body looked like.
//!
//! - POST /event/gift
//! - POST /event/follow
//! - POST /event/like
//! - POST /event/chat
//! - POST /event/share
//! - POST /event/subscribe
//! - POST /api/chat-event - Chat, reporting how many chat overlays it reached
//! - POST /broadcast-event - Arbitrary `{event, data}` to every overlay

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{AckResponse, DeliveredResponse};
use crate::api::extract::LenientJson;
use crate::api::state::AppState;

/// POST /event/gift
pub async fn gift(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<AckResponse> {
    state.hub.ingest_gift(body).await;
    Json(AckResponse::ok("Gift event broadcasted"))
}

/// POST /event/follow
pub async fn follow(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<AckResponse> {
    state.hub.ingest_follow(body).await;
    Json(AckResponse::ok("Follow event broadcasted"))
}

/// POST /event/like
pub async fn like(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<AckResponse> {
    state.hub.ingest_like(body).await;
    Json(AckResponse::ok("Like event broadcasted"))
}

/// POST /event/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<AckResponse> {
    state.hub.ingest_chat(body).await;
    Json(AckResponse::ok("Chat event broadcasted"))
}

/// POST /api/chat-event
pub async fn chat_event(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<DeliveredResponse> {
    let sent_to = state.hub.ingest_chat(body).await;
    Json(DeliveredResponse {
        success: true,
        sent_to,
        message: "Chat event broadcasted".to_string(),
    })
}

/// POST /event/share
pub async fn share(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<AckResponse> {
    state.hub.ingest_share(body).await;
    Json(AckResponse::ok("Share event broadcasted"))
}

/// POST /event/subscribe
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<AckResponse> {
    state.hub.ingest_subscribe(body).await;
    Json(AckResponse::ok("Subscribe event broadcasted"))
}

/// POST /broadcast-event
pub async fn broadcast_event(
    State(state): State<Arc<AppState>>,
    LenientJson(body): LenientJson<Value>,
) -> Json<AckResponse> {
    state.hub.relay_event(body).await;
    Json(AckResponse::ok("Event broadcasted"))
}
