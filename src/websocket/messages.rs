//! WebSocket Message Types
//!
//! Defines the frames exchanged between overlays and the hub. Every frame is
//! a JSON object with a `type` field.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::hub::payload::Document;
use crate::hub::GoalKind;
use crate::hub::registry::Frame;

/// Messages sent from an overlay to the hub
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// The overlay saw its counter reach the goal
    GoalCompleted(GoalCompleted),
    /// Any other message type; accepted and ignored
    #[serde(other)]
    Unknown,
}

/// Payload of a `goal-completed` control message
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCompleted {
    /// "like" or "follow"
    #[serde(default)]
    pub goal_type: String,
    #[serde(default)]
    pub count: Value,
    /// Goal value the overlay had when it completed
    #[serde(default)]
    pub goal: Value,
    /// Policy for the next goal: double, increase, reset, hide
    #[serde(default)]
    pub when_reached: Option<String>,
    #[serde(default)]
    pub action_on_finish: Option<Value>,
}

/// Messages sent from the hub to overlays
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Snapshot delivered on admission
    InitialState { state: Value },
    /// Settings sub-state, e.g. `topgift-settings-update`
    Settings { kind: &'static str, settings: Value },
    /// Goal counter progress: `{type: "update", payload}`
    Update { payload: Value },
    /// Gift relayed as `{type: "gift", giftData}`
    Gift { gift_data: Value },
    /// `{type: kind, ...body}`; body fields win on conflict
    Spread { kind: &'static str, body: Document },
    /// Wheel configuration: `{type: kind, config}`
    Config { kind: &'static str, config: Value },
    /// Engagement event fanned out to every topic
    TikTokEvent {
        event: Value,
        payload: Option<Value>,
    },
    /// A goal was reached and re-armed
    GoalCompleted {
        goal_type: GoalKind,
        goal: u64,
        when_reached: Option<String>,
        action_on_finish: Option<Value>,
    },
    /// Counter reset, sent before `UpdateGoal`
    ResetCount,
    UpdateGoal { new_goal: u64 },
    SongRequest { request: Value },
    SpotifyUpdate {
        current_track: Value,
        spotify_queue: Value,
    },
    MinigameRect { triggers: Value, config: Value },
    /// Body relayed as-is
    Raw(Value),
    /// Error description
    Error { message: String },
}

impl ServerMessage {
    /// `{type: kind, ...body}`
    pub fn spread(kind: &'static str, body: Document) -> Self {
        ServerMessage::Spread { kind, body }
    }

    /// `tiktok-event` envelope whose event is `{type: kind, ...body}`
    pub fn tiktok(kind: &'static str, body: &Document) -> Self {
        ServerMessage::TikTokEvent {
            event: spread_value(kind, body.clone()),
            payload: None,
        }
    }

    /// JSON form of the message
    pub fn to_value(&self) -> Value {
        match self {
            ServerMessage::InitialState { state } => {
                json!({"type": "initial-state", "state": state})
            }
            ServerMessage::Settings { kind, settings } => {
                json!({"type": kind, "settings": settings})
            }
            ServerMessage::Update { payload } => json!({"type": "update", "payload": payload}),
            ServerMessage::Gift { gift_data } => json!({"type": "gift", "giftData": gift_data}),
            ServerMessage::Spread { kind, body } => spread_value(kind, body.clone()),
            ServerMessage::Config { kind, config } => json!({"type": kind, "config": config}),
            ServerMessage::TikTokEvent { event, payload } => {
                let mut value = json!({"type": "tiktok-event", "event": event});
                if let Some(payload) = payload {
                    value["payload"] = payload.clone();
                }
                value
            }
            ServerMessage::GoalCompleted {
                goal_type,
                goal,
                when_reached,
                action_on_finish,
            } => {
                let mut value = json!({
                    "type": "goal-completed",
                    "goalType": goal_type,
                    "count": 0,
                    "goal": goal,
                });
                if let Some(when_reached) = when_reached {
                    value["whenReached"] = json!(when_reached);
                }
                if let Some(action) = action_on_finish {
                    value["actionOnFinish"] = action.clone();
                }
                value
            }
            ServerMessage::ResetCount => json!({"type": "reset-count"}),
            ServerMessage::UpdateGoal { new_goal } => {
                json!({"type": "update-goal", "newGoal": new_goal})
            }
            ServerMessage::SongRequest { request } => {
                json!({"type": "song_request", "request": request})
            }
            ServerMessage::SpotifyUpdate {
                current_track,
                spotify_queue,
            } => json!({
                "type": "spotify_update",
                "currentTrack": current_track,
                "spotifyQueue": spotify_queue,
            }),
            ServerMessage::MinigameRect { triggers, config } => json!({
                "type": "minigame-rect-update",
                "triggers": triggers,
                "config": config,
            }),
            ServerMessage::Raw(value) => value.clone(),
            ServerMessage::Error { message } => json!({"type": "error", "message": message}),
        }
    }

    /// Serialize once for fan-out
    pub fn to_frame(&self) -> Result<Frame, serde_json::Error> {
        serde_json::to_string(self).map(Frame::from)
    }
}

impl Serialize for ServerMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn spread_value(kind: &str, body: Document) -> Value {
    let mut map = Document::new();
    map.insert("type".to_string(), Value::String(kind.to_string()));
    map.extend(body);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::payload::into_object;

    #[test]
    fn test_client_message_deserialize_goal_completed() {
        let json = r#"{"type": "goal-completed", "goalType": "like", "count": 100,
                       "goal": 100, "whenReached": "double", "actionOnFinish": "confetti"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::GoalCompleted(done) => {
                assert_eq!(done.goal_type, "like");
                assert_eq!(done.goal, json!(100));
                assert_eq!(done.when_reached.as_deref(), Some("double"));
                assert_eq!(done.action_on_finish, Some(json!("confetti")));
            }
            _ => panic!("Expected GoalCompleted"),
        }
    }

    #[test]
    fn test_client_message_unknown_type() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Unknown));
    }

    #[test]
    fn test_client_message_rejects_garbage() {
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"goalType": "like"}"#).is_err());
    }

    #[test]
    fn test_server_message_serialize_initial_state() {
        let msg = ServerMessage::InitialState {
            state: json!({"current": 0, "goal": 100}),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"initial-state\""));
        assert!(json.contains("\"goal\":100"));
    }

    #[test]
    fn test_spread_body_wins_on_conflict() {
        let body = into_object(json!({"type": "emote", "comment": "hi"}));
        let value = ServerMessage::spread("chat", body).to_value();
        assert_eq!(value, json!({"type": "emote", "comment": "hi"}));

        let body = into_object(json!({"comment": "hi"}));
        let value = ServerMessage::spread("chat", body).to_value();
        assert_eq!(value, json!({"type": "chat", "comment": "hi"}));
    }

    #[test]
    fn test_tiktok_event_envelope() {
        let body = into_object(json!({"uniqueId": "alice"}));
        let value = ServerMessage::tiktok("follow", &body).to_value();
        assert_eq!(
            value,
            json!({"type": "tiktok-event", "event": {"type": "follow", "uniqueId": "alice"}})
        );
    }

    #[test]
    fn test_goal_completed_omits_absent_fields() {
        let msg = ServerMessage::GoalCompleted {
            goal_type: GoalKind::Follow,
            goal: 60,
            when_reached: None,
            action_on_finish: None,
        };
        assert_eq!(
            msg.to_value(),
            json!({"type": "goal-completed", "goalType": "follow", "count": 0, "goal": 60})
        );
    }

    #[test]
    fn test_to_frame() {
        let frame = ServerMessage::ResetCount.to_frame().unwrap();
        assert_eq!(&*frame, r#"{"type":"reset-count"}"#);
    }
}
