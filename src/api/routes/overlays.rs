//! Overlay Routes
//!
//! Endpoints the overlay editors post configuration and state to. Each
//! one updates a single overlay's snapshot and pushes it to that overlay.
//!
//! - POST /overlay/luckywheel/config, /overlay/luckywheel/spin
//! - POST /overlay/luckywheel2/config, /overlay/luckywheel2/spin
//! - POST /overlay/songrequest/add, /overlay/songrequest/update
//! - POST /overlay/likegoal/update, /overlay/followgoal/update
//! - POST /overlay/{wingoal,timer,topgift,topstreak,giftvsgift}/update
//! - POST /overlay/minigame-rect/update

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::AckResponse;
use crate::api::extract::LenientJson;
use crate::api::state::AppState;
use crate::hub::{GoalKind, Topic, Wheel};

type Body = LenientJson<Value>;

/// POST /overlay/luckywheel/config
pub async fn wheel_config(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.configure_wheel(Wheel::First, body).await;
    Json(AckResponse::ok("Lucky wheel config updated"))
}

/// POST /overlay/luckywheel/spin
pub async fn wheel_spin(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.spin_wheel(Wheel::First, body).await;
    Json(AckResponse::ok("Lucky wheel spin broadcasted"))
}

/// POST /overlay/luckywheel2/config
pub async fn wheel2_config(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.configure_wheel(Wheel::Second, body).await;
    Json(AckResponse::ok("Lucky wheel 2 config updated"))
}

/// POST /overlay/luckywheel2/spin
pub async fn wheel2_spin(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.spin_wheel(Wheel::Second, body).await;
    Json(AckResponse::ok("Lucky wheel 2 spin broadcasted"))
}

/// POST /overlay/songrequest/add
pub async fn song_request_add(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.add_song_request(body).await;
    Json(AckResponse::ok("Song request added"))
}

/// POST /overlay/songrequest/update
pub async fn song_request_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.update_playback(body).await;
    Json(AckResponse::ok("Spotify data updated"))
}

/// POST /overlay/likegoal/update
pub async fn like_goal_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.update_goal(GoalKind::Like, body).await;
    Json(AckResponse::ok("Like goal updated"))
}

/// POST /overlay/followgoal/update
pub async fn follow_goal_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.update_goal(GoalKind::Follow, body).await;
    Json(AckResponse::ok("Follow goal updated"))
}

/// POST /overlay/wingoal/update
pub async fn win_goal_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.replace_overlay(Topic::WinGoal, body).await;
    Json(AckResponse::ok("Win goal updated"))
}

/// POST /overlay/timer/update
pub async fn timer_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.replace_overlay(Topic::Timer, body).await;
    Json(AckResponse::ok("Timer updated"))
}

/// POST /overlay/topgift/update
pub async fn top_gift_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.replace_overlay(Topic::TopGift, body).await;
    Json(AckResponse::ok("Top gift updated"))
}

/// POST /overlay/topstreak/update
pub async fn top_streak_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.replace_overlay(Topic::TopStreak, body).await;
    Json(AckResponse::ok("Top streak updated"))
}

/// POST /overlay/giftvsgift/update
pub async fn gift_vs_gift_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.replace_overlay(Topic::GiftVsGift, body).await;
    Json(AckResponse::ok("Gift vs gift updated"))
}

/// POST /overlay/minigame-rect/update
pub async fn minigame_update(
    State(state): State<Arc<AppState>>,
    LenientJson(body): Body,
) -> Json<AckResponse> {
    state.hub.update_minigame(body).await;
    Json(AckResponse::ok("Minigame rectangle overlay updated"))
}
