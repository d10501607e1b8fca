//! Topics and connection classification
//!
//! Every overlay kind maps to exactly one [`Topic`]. The set is closed and
//! registered up front; inbound WebSocket connections are sorted into a topic
//! by matching their request path against [`CLASSIFICATION_RULES`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named broadcast channel, one per overlay kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Topic {
    General,
    GiftBubbles,
    LuckyWheel,
    LuckyWheel2,
    SongRequest,
    LikeGoal,
    FollowGoal,
    Timer,
    Chat,
    WinGoal,
    TopGift,
    TopStreak,
    GiftVsGift,
    MinigameRect,
}

impl Topic {
    /// Every topic, in registration order
    pub const ALL: [Topic; 14] = [
        Topic::General,
        Topic::GiftBubbles,
        Topic::LuckyWheel,
        Topic::LuckyWheel2,
        Topic::SongRequest,
        Topic::LikeGoal,
        Topic::FollowGoal,
        Topic::Timer,
        Topic::Chat,
        Topic::WinGoal,
        Topic::TopGift,
        Topic::TopStreak,
        Topic::GiftVsGift,
        Topic::MinigameRect,
    ];

    /// Wire name, as used by overlays and the `/state/:overlayType` route
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::General => "general",
            Topic::GiftBubbles => "giftBubbles",
            Topic::LuckyWheel => "luckyWheel",
            Topic::LuckyWheel2 => "luckyWheel2",
            Topic::SongRequest => "songRequest",
            Topic::LikeGoal => "likeGoal",
            Topic::FollowGoal => "followGoal",
            Topic::Timer => "timer",
            Topic::Chat => "chat",
            Topic::WinGoal => "winGoal",
            Topic::TopGift => "topGift",
            Topic::TopStreak => "topStreak",
            Topic::GiftVsGift => "giftVsGift",
            Topic::MinigameRect => "minigameRect",
        }
    }

    /// Message type used to push this topic's settings sub-state, if it has one
    pub fn settings_message(&self) -> Option<&'static str> {
        match self {
            Topic::TopGift => Some("topgift-settings-update"),
            Topic::TopStreak => Some("topstreak-settings-update"),
            Topic::Chat => Some("chat-overlay-settings-update"),
            _ => None,
        }
    }

    /// Classify a WebSocket request path into a topic.
    ///
    /// Rules are evaluated in order and the first match wins; a path that
    /// matches nothing lands in [`Topic::General`].
    pub fn classify(path: &str) -> Topic {
        CLASSIFICATION_RULES
            .iter()
            .find(|(patterns, _)| patterns.iter().any(|p| path.contains(p)))
            .map(|(_, topic)| *topic)
            .unwrap_or(Topic::General)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}

/// A topic name outside the closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown topic: {0}")]
pub struct UnknownTopic(pub String);

/// Ordered path-substring rules for connection admission.
///
/// `/luckywheel2` must stay ahead of `/luckywheel`, since the shorter
/// pattern is a prefix of the longer one.
pub const CLASSIFICATION_RULES: &[(&[&str], Topic)] = &[
    (&["/gift-bubbles", "/giftbubbles"], Topic::GiftBubbles),
    (&["/luckywheel2"], Topic::LuckyWheel2),
    (&["/luckywheel"], Topic::LuckyWheel),
    (&["/songrequest", "/song"], Topic::SongRequest),
    (&["/like-goal", "/likegoal"], Topic::LikeGoal),
    (&["/follow-goal", "/followgoal"], Topic::FollowGoal),
    (&["/timer"], Topic::Timer),
    (&["/chat"], Topic::Chat),
    (&["/win-goal", "/wingoal"], Topic::WinGoal),
    (&["/top-gift", "/topgift"], Topic::TopGift),
    (&["/top-streak", "/topstreak"], Topic::TopStreak),
    (&["/giftvsgift", "/gift-vs-gift"], Topic::GiftVsGift),
    (&["/minigame-rect"], Topic::MinigameRect),
];

/// The two counters that support goal completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Like,
    Follow,
}

impl GoalKind {
    pub fn topic(&self) -> Topic {
        match self {
            GoalKind::Like => Topic::LikeGoal,
            GoalKind::Follow => Topic::FollowGoal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::Like => "like",
            GoalKind::Follow => "follow",
        }
    }
}

impl FromStr for GoalKind {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(GoalKind::Like),
            "follow" => Ok(GoalKind::Follow),
            other => Err(UnknownTopic(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_paths() {
        assert_eq!(Topic::classify("/ws/gift-bubbles"), Topic::GiftBubbles);
        assert_eq!(Topic::classify("/ws/like-goal"), Topic::LikeGoal);
        assert_eq!(Topic::classify("/ws/likegoal"), Topic::LikeGoal);
        assert_eq!(Topic::classify("/ws/chat"), Topic::Chat);
        assert_eq!(Topic::classify("/ws/giftvsgift"), Topic::GiftVsGift);
        assert_eq!(Topic::classify("/ws/topgift"), Topic::TopGift);
        assert_eq!(Topic::classify("/ws/topstreak"), Topic::TopStreak);
        assert_eq!(Topic::classify("/ws/songrequests"), Topic::SongRequest);
        assert_eq!(Topic::classify("/ws/minigame-rect"), Topic::MinigameRect);
    }

    #[test]
    fn test_classify_prefers_longer_wheel_pattern() {
        assert_eq!(Topic::classify("/ws/luckywheel2"), Topic::LuckyWheel2);
        assert_eq!(Topic::classify("/ws/luckywheel"), Topic::LuckyWheel);
    }

    #[test]
    fn test_classify_falls_back_to_general() {
        assert_eq!(Topic::classify("/ws/unknown-widget"), Topic::General);
        assert_eq!(Topic::classify("/"), Topic::General);
        assert_eq!(Topic::classify(""), Topic::General);
    }

    #[test]
    fn test_topic_name_roundtrip() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
            let json = serde_json::to_string(&topic).unwrap();
            assert_eq!(json, format!("\"{}\"", topic.as_str()));
        }
        assert!("giftbubbles".parse::<Topic>().is_err());
    }

    #[test]
    fn test_goal_kind() {
        assert_eq!("like".parse::<GoalKind>().unwrap().topic(), Topic::LikeGoal);
        assert_eq!("follow".parse::<GoalKind>().unwrap().topic(), Topic::FollowGoal);
        assert!("share".parse::<GoalKind>().is_err());
    }
}
