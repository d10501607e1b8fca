//! Overlay configuration and editor updates
//!
//! Each update mutates one topic (or its settings) using the discipline
//! that topic's editor expects and pushes the result to that topic only.

use serde_json::{json, Value};

use super::payload::{as_count, into_object, Document};
use super::snapshot::GoalState;
use super::topic::{GoalKind, Topic};
use super::{absorb, Hub, HubCore};
use crate::hub::ingest::goal_update;
use crate::websocket::ServerMessage;

/// One of the two lucky wheel overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    First,
    Second,
}

impl Wheel {
    pub fn topic(&self) -> Topic {
        match self {
            Wheel::First => Topic::LuckyWheel,
            Wheel::Second => Topic::LuckyWheel2,
        }
    }

    fn config_message(&self) -> &'static str {
        match self {
            Wheel::First => "wheel-config-update",
            Wheel::Second => "wheel2-config-update",
        }
    }

    fn spin_message(&self) -> &'static str {
        match self {
            Wheel::First => "wheel-spin",
            Wheel::Second => "wheel2-spin",
        }
    }
}

impl GoalKind {
    fn progress_message(&self) -> &'static str {
        match self {
            GoalKind::Like => "like-goal-update",
            GoalKind::Follow => "follow-goal-update",
        }
    }
}

/// Message announcing a wholesale replacement of `topic`'s snapshot
fn replacement_message(topic: Topic, body: Document) -> ServerMessage {
    match topic {
        Topic::WinGoal => ServerMessage::spread("win-goal-update", body),
        Topic::TopGift => ServerMessage::spread("top-gift-update", body),
        Topic::TopStreak => ServerMessage::spread("top-streak-update", body),
        Topic::GiftVsGift => ServerMessage::spread("gift-vs-gift-update", body),
        _ => ServerMessage::Raw(Value::Object(body)),
    }
}

impl Hub {
    /// Replace a wheel's configuration
    pub async fn configure_wheel(&self, wheel: Wheel, body: Value) {
        let config = into_object(body)
            .remove("config")
            .filter(|c| c.is_object())
            .unwrap_or_else(|| json!({}));
        let topic = wheel.topic();

        let mut core = self.lock().await;
        if absorb(topic, core.store.replace(topic, config.clone())).is_none() {
            return;
        }
        core.registry.broadcast(
            topic,
            &ServerMessage::Config {
                kind: wheel.config_message(),
                config,
            },
        );
        tracing::info!(topic = %topic, "Wheel configured");
    }

    /// Relay a spin command to a wheel
    pub async fn spin_wheel(&self, wheel: Wheel, body: Value) {
        let spin = ServerMessage::spread(wheel.spin_message(), into_object(body));
        self.lock().await.registry.broadcast(wheel.topic(), &spin);
    }

    /// Queue a song request
    pub async fn add_song_request(&self, request: Value) {
        let mut core = self.lock().await;
        let queued = core
            .store
            .append(Topic::SongRequest, "songRequests", request.clone());
        if absorb(Topic::SongRequest, queued).is_none() {
            return;
        }
        core.registry
            .broadcast(Topic::SongRequest, &ServerMessage::SongRequest { request });
    }

    /// Update the current track and queue shown by the song request overlay
    pub async fn update_playback(&self, body: Value) {
        let mut body = into_object(body);
        let mut partial = Document::new();
        for key in ["currentTrack", "spotifyQueue"] {
            if let Some(value) = body.remove(key) {
                partial.insert(key.to_string(), value);
            }
        }

        let mut core = self.lock().await;
        let Some(snapshot) = absorb(
            Topic::SongRequest,
            core.store.merge(Topic::SongRequest, partial),
        ) else {
            return;
        };
        let state = snapshot.to_value();
        let message = ServerMessage::SpotifyUpdate {
            current_track: state.get("currentTrack").cloned().unwrap_or(Value::Null),
            spotify_queue: state.get("spotifyQueue").cloned().unwrap_or(Value::Null),
        };
        core.registry.broadcast(Topic::SongRequest, &message);
    }

    /// Merge editor changes into a goal.
    ///
    /// Only `count` moves the counter; a `current` field in the body is
    /// dropped so a stale editor save cannot wipe live progress.
    pub async fn update_goal(&self, kind: GoalKind, body: Value) {
        let mut partial = into_object(body);
        partial.remove("current");
        if let Some(count) = partial.remove("count") {
            partial.insert("current".to_string(), count);
        }
        let topic = kind.topic();

        let mut core = self.lock().await;
        let Some(snapshot) = absorb(topic, core.store.merge(topic, partial)) else {
            return;
        };
        let update = goal_update(kind, snapshot);
        core.registry.broadcast(topic, &update);
    }

    /// Both goals, for the goal settings editor
    pub async fn goal_settings(&self) -> (Value, Value) {
        let core = self.lock().await;
        (
            core.store.get(Topic::LikeGoal).to_value(),
            core.store.get(Topic::FollowGoal).to_value(),
        )
    }

    /// Merge `likeGoal` and `followGoal` objects from the goal settings editor
    pub async fn save_goal_settings(&self, body: Value) -> (Value, Value) {
        let mut body = into_object(body);
        let mut core = self.lock().await;

        for (key, topic) in [("likeGoal", Topic::LikeGoal), ("followGoal", Topic::FollowGoal)] {
            let Some(Value::Object(partial)) = body.remove(key) else {
                continue;
            };
            if let Some(snapshot) = absorb(topic, core.store.merge(topic, partial)) {
                let payload = snapshot.to_value();
                core.registry
                    .broadcast(topic, &ServerMessage::Update { payload });
            }
        }

        tracing::info!("Goal settings saved");
        (
            core.store.get(Topic::LikeGoal).to_value(),
            core.store.get(Topic::FollowGoal).to_value(),
        )
    }

    /// Add test progress to a goal without passing its target
    pub async fn test_goal(&self, kind: GoalKind, body: Value) -> Option<GoalState> {
        let body = into_object(body);
        let count = body.get("count").and_then(as_count).unwrap_or(1);
        let topic = kind.topic();

        let mut core = self.lock().await;
        let ceiling = core.store.get(topic).as_goal().map(|g| g.goal);
        let goal = absorb(topic, core.store.accumulate(topic, "current", count, ceiling))?
            .as_goal()
            .cloned()?;

        push_progress(&mut core, kind, &goal);
        Some(goal)
    }

    /// Reset a goal's current value to zero
    pub async fn cut_goal(&self, kind: GoalKind) -> Option<GoalState> {
        let topic = kind.topic();
        let mut partial = Document::new();
        partial.insert("current".to_string(), json!(0));

        let mut core = self.lock().await;
        let goal = absorb(topic, core.store.merge(topic, partial))?
            .as_goal()
            .cloned()?;

        push_progress(&mut core, kind, &goal);
        Some(goal)
    }

    /// Replace a topic's snapshot with `body` and push it to that topic
    pub async fn replace_overlay(&self, topic: Topic, body: Value) {
        let body = into_object(body);

        let mut core = self.lock().await;
        if absorb(topic, core.store.replace(topic, Value::Object(body.clone()))).is_none() {
            return;
        }
        core.registry
            .broadcast(topic, &replacement_message(topic, body));
        tracing::debug!(topic = %topic, "Overlay state replaced");
    }

    /// Merge editor changes into the gift-vs-gift battle
    pub async fn save_gift_vs_gift(&self, body: Value) -> Option<Value> {
        let partial = into_object(body);

        let mut core = self.lock().await;
        let state = absorb(
            Topic::GiftVsGift,
            core.store.merge(Topic::GiftVsGift, partial),
        )?
        .to_value();

        tracing::info!(
            left_points = %state["leftPoints"],
            right_points = %state["rightPoints"],
            goal = %state["goal"],
            "Gift vs gift saved"
        );
        core.registry.broadcast(
            Topic::GiftVsGift,
            &ServerMessage::spread("gift-vs-gift-config", into_object(state.clone())),
        );
        Some(state)
    }

    /// Replace the minigame trigger rectangles
    pub async fn update_minigame(&self, body: Value) {
        let mut body = into_object(body);
        let triggers = body
            .remove("triggers")
            .filter(Value::is_array)
            .unwrap_or_else(|| json!([]));
        let config = body.remove("config").unwrap_or(Value::Null);
        let state = json!({"triggers": triggers, "config": config});

        let mut core = self.lock().await;
        if absorb(Topic::MinigameRect, core.store.replace(Topic::MinigameRect, state)).is_none() {
            return;
        }
        core.registry.broadcast(
            Topic::MinigameRect,
            &ServerMessage::MinigameRect { triggers, config },
        );
    }

    /// Merge into a topic's settings sub-state and push the result
    pub async fn merge_settings(&self, topic: Topic, body: Value) -> Option<Value> {
        let partial = into_object(body);
        let mut core = self.lock().await;
        let merged = absorb(topic, core.store.merge_settings(topic, partial))?;
        let settings = Value::Object(merged.clone());
        push_settings(&mut core, topic, settings.clone());
        Some(settings)
    }

    /// Replace a topic's settings sub-state; returns the subscribers reached
    pub async fn replace_settings(&self, topic: Topic, settings: Value) -> Option<usize> {
        let mut core = self.lock().await;
        let settings =
            Value::Object(absorb(topic, core.store.replace_settings(topic, settings))?.clone());
        Some(push_settings(&mut core, topic, settings))
    }
}

fn push_progress(core: &mut HubCore, kind: GoalKind, goal: &GoalState) {
    let body = into_object(serde_json::to_value(goal).unwrap_or(Value::Null));
    core.registry.broadcast(
        kind.topic(),
        &ServerMessage::spread(kind.progress_message(), body),
    );
}

fn push_settings(core: &mut HubCore, topic: Topic, settings: Value) -> usize {
    let Some(kind) = topic.settings_message() else {
        return 0;
    };
    core.registry
        .broadcast(topic, &ServerMessage::Settings { kind, settings })
        .delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Subscription;

    fn drain(sub: &mut Subscription) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = sub.receiver.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn test_wheels_are_independent() {
        let hub = Hub::default();
        let mut first = hub.admit("/luckywheel").await.unwrap();
        let mut second = hub.admit("/luckywheel2").await.unwrap();
        drain(&mut first);
        drain(&mut second);

        hub.configure_wheel(Wheel::Second, json!({"config": {"segments": [1, 2]}}))
            .await;
        hub.spin_wheel(Wheel::First, json!({"winner": 3})).await;

        assert_eq!(
            drain(&mut second),
            vec![json!({"type": "wheel2-config-update", "config": {"segments": [1, 2]}})]
        );
        assert_eq!(
            drain(&mut first),
            vec![json!({"type": "wheel-spin", "winner": 3})]
        );
        assert_eq!(
            hub.snapshot(Topic::LuckyWheel2).await,
            json!({"segments": [1, 2]})
        );
    }

    #[tokio::test]
    async fn test_song_requests_append_and_playback_merges() {
        let hub = Hub::default();
        let mut sub = hub.admit("/songrequest").await.unwrap();
        drain(&mut sub);

        hub.add_song_request(json!({"title": "one"})).await;
        hub.add_song_request(json!({"title": "two"})).await;
        hub.update_playback(json!({"currentTrack": {"title": "one"}}))
            .await;

        let state = hub.snapshot(Topic::SongRequest).await;
        assert_eq!(state["songRequests"].as_array().unwrap().len(), 2);
        assert_eq!(state["currentTrack"]["title"], "one");
        assert_eq!(state["spotifyQueue"], json!([]));

        let frames = drain(&mut sub);
        assert_eq!(frames[0], json!({"type": "song_request", "request": {"title": "one"}}));
        assert_eq!(frames[2]["type"], "spotify_update");
        assert_eq!(frames[2]["spotifyQueue"], json!([]));
    }

    #[tokio::test]
    async fn test_update_goal_maps_count_to_current() {
        let hub = Hub::default();
        hub.update_goal(GoalKind::Like, json!({"count": 7, "goal": 150, "color": "red"}))
            .await;

        let state = hub.snapshot(Topic::LikeGoal).await;
        assert_eq!(state["current"], json!(7));
        assert_eq!(state["goal"], json!(150));
        assert_eq!(state["color"], "red");
        assert!(state.get("count").is_none());
    }

    #[tokio::test]
    async fn test_update_goal_ignores_editor_current() {
        let hub = Hub::default();
        hub.ingest_like(json!({"likeCount": 40})).await;

        hub.update_goal(GoalKind::Like, json!({"current": 0, "goal": 200}))
            .await;

        let state = hub.snapshot(Topic::LikeGoal).await;
        assert_eq!(state["current"], json!(40));
        assert_eq!(state["goal"], json!(200));

        hub.update_goal(GoalKind::Like, json!({"current": 99, "count": 3}))
            .await;
        assert_eq!(hub.snapshot(Topic::LikeGoal).await["current"], json!(3));
    }

    #[tokio::test]
    async fn test_merge_keeps_earlier_fields() {
        let hub = Hub::default();
        hub.update_goal(GoalKind::Follow, json!({"label": "Follows"}))
            .await;
        hub.update_goal(GoalKind::Follow, json!({"color": "blue", "label": null}))
            .await;

        let state = hub.snapshot(Topic::FollowGoal).await;
        assert_eq!(state["label"], "Follows");
        assert_eq!(state["color"], "blue");
    }

    #[tokio::test]
    async fn test_goal_settings_merge_present_goals_only() {
        let hub = Hub::default();
        let (like, follow) = hub
            .save_goal_settings(json!({"likeGoal": {"goal": 300}}))
            .await;
        assert_eq!(like["goal"], json!(300));
        assert_eq!(follow["goal"], json!(50));
    }

    #[tokio::test]
    async fn test_test_goal_is_clamped() {
        let hub = Hub::default();
        let mut sub = hub.admit("/follow-goal").await.unwrap();
        drain(&mut sub);

        let goal = hub.test_goal(GoalKind::Follow, json!({"count": 80})).await.unwrap();
        assert_eq!(goal.current, 50);

        let frames = drain(&mut sub);
        assert_eq!(
            frames[0],
            json!({"type": "follow-goal-update", "current": 50, "goal": 50})
        );

        let goal = hub.cut_goal(GoalKind::Follow).await.unwrap();
        assert_eq!(goal.current, 0);
        assert_eq!(goal.goal, 50);
    }

    #[tokio::test]
    async fn test_replace_overlay_messages() {
        let hub = Hub::default();
        let mut win = hub.admit("/win-goal").await.unwrap();
        let mut timer = hub.admit("/timer").await.unwrap();
        drain(&mut win);
        drain(&mut timer);

        hub.replace_overlay(Topic::WinGoal, json!({"current": 2, "total": 5}))
            .await;
        hub.replace_overlay(Topic::Timer, json!({"remaining": 30, "isRunning": true}))
            .await;

        assert_eq!(
            drain(&mut win),
            vec![json!({"type": "win-goal-update", "current": 2, "total": 5})]
        );
        assert_eq!(
            drain(&mut timer),
            vec![json!({"remaining": 30, "isRunning": true})]
        );
        assert_eq!(
            hub.snapshot(Topic::WinGoal).await,
            json!({"current": 2, "total": 5})
        );
    }

    #[tokio::test]
    async fn test_gift_vs_gift_merge() {
        let hub = Hub::default();
        let state = hub
            .save_gift_vs_gift(json!({"leftPoints": 40}))
            .await
            .unwrap();
        assert_eq!(state["leftPoints"], json!(40));
        assert_eq!(state["goal"], json!(500));
    }

    #[tokio::test]
    async fn test_minigame_defaults_triggers() {
        let hub = Hub::default();
        hub.update_minigame(json!({"triggers": "nope", "config": {"speed": 2}}))
            .await;
        assert_eq!(
            hub.snapshot(Topic::MinigameRect).await,
            json!({"triggers": [], "config": {"speed": 2}})
        );
    }

    #[tokio::test]
    async fn test_settings_merge_and_replace() {
        let hub = Hub::default();
        let mut sub = hub.admit("/topstreak").await.unwrap();
        drain(&mut sub);

        let settings = hub
            .merge_settings(Topic::TopStreak, json!({"fontSize": 30}))
            .await
            .unwrap();
        assert_eq!(settings["fontSize"], json!(30));
        assert_eq!(settings["title"], "TOP STREAK");
        assert_eq!(drain(&mut sub)[0]["type"], "topstreak-settings-update");

        let sent_to = hub
            .replace_settings(Topic::Chat, json!({"maxMessages": 10}))
            .await;
        assert_eq!(sent_to, Some(0));
        assert_eq!(
            hub.settings(Topic::Chat).await,
            Some(json!({"maxMessages": 10}))
        );

        assert!(hub.merge_settings(Topic::Timer, json!({})).await.is_none());
    }
}
