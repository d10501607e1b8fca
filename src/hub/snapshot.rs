//! Per-topic state snapshots
//!
//! A [`Snapshot`] is the last-known state of one topic. Topics whose state
//! the hub computes on (goal counters, stream totals) get typed variants;
//! the rest hold an opaque JSON document owned by the overlay editor.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{StoreError, StoreResult};
use super::payload::{de_count, de_opt_count, into_object, Document};
use super::topic::Topic;

/// Default goal for the like counter
pub const DEFAULT_LIKE_GOAL: u64 = 100;
/// Default goal for the follow counter
pub const DEFAULT_FOLLOW_GOAL: u64 = 50;

/// Progress toward a like or follow goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalState {
    #[serde(default, deserialize_with = "de_count")]
    pub current: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub goal: u64,
    /// Baseline captured at first completion
    #[serde(
        default,
        deserialize_with = "de_opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_goal: Option<u64>,
    /// Editor-owned fields (colors, labels, behavior) passed through untouched
    #[serde(flatten)]
    pub extra: Document,
}

impl GoalState {
    pub fn new(goal: u64) -> Self {
        Self {
            current: 0,
            goal,
            original_goal: None,
            extra: Document::new(),
        }
    }
}

/// Running totals across the whole stream, held by the `general` topic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamTotals {
    pub gifts: u64,
    pub diamonds: u64,
    pub likes: u64,
    pub follows: u64,
    pub shares: u64,
    pub subscribes: u64,
    pub chats: u64,
}

impl StreamTotals {
    fn counter_mut(&mut self, field: &str) -> Option<&mut u64> {
        match field {
            "gifts" => Some(&mut self.gifts),
            "diamonds" => Some(&mut self.diamonds),
            "likes" => Some(&mut self.likes),
            "follows" => Some(&mut self.follows),
            "shares" => Some(&mut self.shares),
            "subscribes" => Some(&mut self.subscribes),
            "chats" => Some(&mut self.chats),
            _ => None,
        }
    }
}

/// Last-known state of a topic
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// `general`
    Totals(StreamTotals),
    /// `likeGoal`, `followGoal`
    Goal(GoalState),
    /// Every other topic
    Document(Document),
}

impl Snapshot {
    /// Default snapshot for a topic at process start
    pub fn initial(topic: Topic, like_goal: u64, follow_goal: u64) -> Self {
        match topic {
            Topic::General => Snapshot::Totals(StreamTotals::default()),
            Topic::LikeGoal => Snapshot::Goal(GoalState::new(like_goal)),
            Topic::FollowGoal => Snapshot::Goal(GoalState::new(follow_goal)),
            Topic::WinGoal => document(json!({"current": 0, "total": 5, "style": null})),
            Topic::Timer => document(json!({"remaining": 0, "isRunning": false})),
            Topic::TopGift => document(json!({"topGifter": null, "gifts": []})),
            Topic::TopStreak => document(json!({"topStreaker": null, "streaks": []})),
            Topic::GiftVsGift => document(json!({
                "leftPoints": 0,
                "rightPoints": 0,
                "goal": 500,
                "goalBehavior": "keep",
                "actionWinLeft": "none",
                "actionWinRight": "none",
            })),
            Topic::SongRequest => document(json!({
                "songRequests": [],
                "currentTrack": null,
                "spotifyQueue": [],
            })),
            Topic::MinigameRect => document(json!({"triggers": [], "config": null})),
            Topic::GiftBubbles | Topic::LuckyWheel | Topic::LuckyWheel2 | Topic::Chat => {
                Snapshot::Document(Document::new())
            }
        }
    }

    /// Build the snapshot variant `topic` expects from a JSON value
    pub fn from_value(topic: Topic, value: Value) -> StoreResult<Self> {
        let shape_error = |e: serde_json::Error| StoreError::Shape {
            topic,
            error: e.to_string(),
        };

        match topic {
            Topic::General => serde_json::from_value(Value::Object(into_object(value)))
                .map(Snapshot::Totals)
                .map_err(shape_error),
            Topic::LikeGoal | Topic::FollowGoal => {
                serde_json::from_value(Value::Object(into_object(value)))
                    .map(Snapshot::Goal)
                    .map_err(shape_error)
            }
            _ => Ok(Snapshot::Document(into_object(value))),
        }
    }

    /// JSON form sent to overlays
    pub fn to_value(&self) -> Value {
        match self {
            Snapshot::Totals(totals) => serde_json::to_value(totals).unwrap_or(Value::Null),
            Snapshot::Goal(goal) => serde_json::to_value(goal).unwrap_or(Value::Null),
            Snapshot::Document(doc) => Value::Object(doc.clone()),
        }
    }

    /// Mutable access to a named numeric counter
    pub fn counter_mut(&mut self, field: &str) -> Option<&mut u64> {
        match self {
            Snapshot::Totals(totals) => totals.counter_mut(field),
            Snapshot::Goal(goal) => match field {
                "current" => Some(&mut goal.current),
                "goal" => Some(&mut goal.goal),
                _ => None,
            },
            Snapshot::Document(_) => None,
        }
    }

    pub fn as_goal(&self) -> Option<&GoalState> {
        match self {
            Snapshot::Goal(goal) => Some(goal),
            _ => None,
        }
    }
}

fn document(value: Value) -> Snapshot {
    Snapshot::Document(into_object(value))
}

/// Default typography for the top gift / top streak overlays
pub fn default_leaderboard_settings(title: &str) -> Document {
    into_object(json!({
        "fontFamily": "Comic Sans MS",
        "fontSize": 22,
        "fontLineSpacing": 1.2,
        "fontLetterSpacing": 0,
        "title": title,
        "titleSize": 18,
        "titleColor": "#ffffff",
        "usernameColor": "#ffffff",
        "usernameSize": 32,
        "counterColor": "#ffd700",
        "titleVerticalOffset": 20,
        "giftVerticalOffset": 50,
        "usernameVerticalOffset": 125,
        "counterVerticalOffset": 165,
        "enableFontBorder": true,
        "borderColor": "#242424",
        "giftImageVisible": true,
        "giftImageOpacity": 100,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_topic_has_a_non_null_default() {
        for topic in Topic::ALL {
            let snapshot = Snapshot::initial(topic, DEFAULT_LIKE_GOAL, DEFAULT_FOLLOW_GOAL);
            assert!(snapshot.to_value().is_object(), "{} default", topic);
        }
    }

    #[test]
    fn test_goal_state_serialization() {
        let goal = GoalState::new(100);
        assert_eq!(
            serde_json::to_value(&goal).unwrap(),
            json!({"current": 0, "goal": 100})
        );

        let mut goal = goal;
        goal.original_goal = Some(100);
        goal.extra.insert("title".into(), json!("Likes"));
        assert_eq!(
            serde_json::to_value(&goal).unwrap(),
            json!({"current": 0, "goal": 100, "originalGoal": 100, "title": "Likes"})
        );
    }

    #[test]
    fn test_goal_state_lenient_parse() {
        let snapshot =
            Snapshot::from_value(Topic::LikeGoal, json!({"current": "12", "goal": 150.0}))
                .unwrap();
        let goal = snapshot.as_goal().unwrap();
        assert_eq!(goal.current, 12);
        assert_eq!(goal.goal, 150);
        assert_eq!(goal.original_goal, None);
    }

    #[test]
    fn test_counter_access() {
        let mut totals = Snapshot::initial(Topic::General, 100, 50);
        *totals.counter_mut("diamonds").unwrap() += 5;
        assert_eq!(totals.to_value()["diamonds"], json!(5));
        assert!(totals.counter_mut("current").is_none());

        let mut timer = Snapshot::initial(Topic::Timer, 100, 50);
        assert!(timer.counter_mut("remaining").is_none());
    }

    #[test]
    fn test_leaderboard_settings_title() {
        let settings = default_leaderboard_settings("TOP STREAK");
        assert_eq!(settings["title"], json!("TOP STREAK"));
        assert_eq!(settings["fontFamily"], json!("Comic Sans MS"));
    }
}
