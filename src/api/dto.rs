//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.
//!
//! Request types derive `Default` so the lenient extractor can fall back
//! to them when a body does not parse.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hub::{GoalState, HubStats};

// ============================================
// GENERIC RESPONSES
// ============================================

/// `{success: true, message}`
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

impl AckResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Acknowledgement that also reports how many overlays were reached
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredResponse {
    pub success: bool,
    pub sent_to: usize,
    pub message: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// GET /ping
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub success: bool,
    pub message: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Subscriber counts and delivery counters per topic
    #[serde(flatten)]
    pub stats: HubStats,
}

// ============================================
// AUTH DTOs
// ============================================

/// POST /tikhub/authenticate
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthRequest {
    pub app_id: String,
    pub secret_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub session_token: String,
    pub message: String,
}

// ============================================
// STATE DTOs
// ============================================

/// GET /state/:overlayType
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub success: bool,
    /// Snapshot, or null for an unknown overlay type
    pub state: Value,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

// ============================================
// GOAL DTOs
// ============================================

/// GET/POST /api/goal-settings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSettingsResponse {
    pub success: bool,
    pub like_goal: Value,
    pub follow_goal: Value,
    pub timestamp: i64,
}

/// POST /api/test/* and /api/cut/*
#[derive(Debug, Serialize)]
pub struct GoalProgressResponse {
    pub success: bool,
    pub current: u64,
    pub goal: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GoalProgressResponse {
    pub fn new(goal: &GoalState, message: Option<String>) -> Self {
        Self {
            success: true,
            current: goal.current,
            goal: goal.goal,
            message,
        }
    }
}

// ============================================
// SETTINGS DTOs
// ============================================

/// GET /api/topgift-settings, /api/topstreak-settings
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub settings: Value,
}

// ============================================
// ACTION DTOs
// ============================================

/// POST /api/actions
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionsRequest {
    /// Must be an array; anything else is rejected
    pub actions: Value,
}

#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub success: bool,
    pub actions: Vec<Value>,
}

/// POST /api/execute-action
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecuteActionRequest {
    pub action: Option<Value>,
    pub action_id: Option<Value>,
}

impl ExecuteActionRequest {
    /// Human-readable name for logging
    pub fn label(&self) -> String {
        self.action
            .as_ref()
            .and_then(|a| a.get("name"))
            .or(self.action_id.as_ref())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ExecuteActionResponse {
    pub success: bool,
    pub message: String,
    pub note: String,
}
