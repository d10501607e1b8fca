//! Event ingestion
//!
//! Producer events (gifts, likes, follows, chat, shares, subscriptions)
//! mutate the stream totals and goal counters, then fan out to the topics
//! that render them plus a `tiktok-event` envelope to every topic.
//!
//! Ingestion never fails: payloads are read leniently and store errors are
//! logged and skipped.

use serde_json::Value;

use super::payload::{self, into_object, Document};
use super::snapshot::Snapshot;
use super::topic::{GoalKind, Topic};
use super::{absorb, Hub, HubCore};
use crate::websocket::ServerMessage;

impl Hub {
    /// Relay a gift and add it to the stream totals
    pub async fn ingest_gift(&self, body: Value) {
        let gift = into_object(body);
        let repeat = payload::count(&gift, &["repeatCount"], 1);
        let diamonds = payload::amount(&gift, "diamondCount");

        let mut core = self.lock().await;
        core.bump_total("gifts", repeat);
        core.bump_total("diamonds", diamonds);

        let gift_data = Value::Object(gift.clone());
        let relayed = ServerMessage::Gift { gift_data };
        core.registry.broadcast(Topic::GiftBubbles, &relayed);
        core.registry
            .broadcast(Topic::GiftVsGift, &ServerMessage::spread("gift", gift.clone()));
        core.registry.broadcast(Topic::TopGift, &relayed);
        core.registry.broadcast(Topic::TopStreak, &relayed);
        core.registry
            .broadcast_all(&ServerMessage::tiktok("gift", &gift));

        tracing::info!(repeat, diamonds, "Gift relayed");
    }

    /// Advance the follow goal
    pub async fn ingest_follow(&self, body: Value) {
        let follow = into_object(body);
        let count = payload::count(&follow, &["count"], 1);
        self.advance_goal(GoalKind::Follow, count, &follow).await;
    }

    /// Advance the like goal
    pub async fn ingest_like(&self, body: Value) {
        let like = into_object(body);
        let count = payload::count(&like, &["likeCount", "count"], 1);
        self.advance_goal(GoalKind::Like, count, &like).await;
    }

    /// Relay a chat message; returns the number of chat overlays reached
    pub async fn ingest_chat(&self, body: Value) -> usize {
        let chat = into_object(body);

        let mut core = self.lock().await;
        core.bump_total("chats", 1);

        let report = core
            .registry
            .broadcast(Topic::Chat, &ServerMessage::spread("chat", chat.clone()));

        let event = ServerMessage::spread("chat", chat).to_value();
        core.registry.broadcast_all(&ServerMessage::TikTokEvent {
            payload: Some(event.clone()),
            event,
        });

        tracing::debug!(sent_to = report.delivered, "Chat relayed");
        report.delivered
    }

    pub async fn ingest_share(&self, body: Value) {
        self.relay_engagement("share", "shares", body).await;
    }

    pub async fn ingest_subscribe(&self, body: Value) {
        self.relay_engagement("subscribe", "subscribes", body).await;
    }

    /// Relay an arbitrary producer event to every topic.
    ///
    /// The envelope's event is `event` when present, otherwise `data`.
    pub async fn relay_event(&self, body: Value) {
        let mut body = into_object(body);
        let event = match body.remove("event") {
            Some(event) if is_truthy(&event) => event,
            _ => body.remove("data").unwrap_or(Value::Null),
        };

        let mut core = self.lock().await;
        let report = core.registry.broadcast_all(&ServerMessage::TikTokEvent {
            event,
            payload: None,
        });
        tracing::debug!(delivered = report.delivered, "Event relayed");
    }

    async fn advance_goal(&self, kind: GoalKind, count: u64, body: &Document) {
        let topic = kind.topic();
        let total = match kind {
            GoalKind::Like => "likes",
            GoalKind::Follow => "follows",
        };

        let mut core = self.lock().await;
        core.bump_total(total, count);

        let Some(snapshot) = absorb(topic, core.store.accumulate(topic, "current", count, None))
        else {
            return;
        };
        let update = goal_update(kind, snapshot);
        core.registry.broadcast(topic, &update);
        core.registry
            .broadcast_all(&ServerMessage::tiktok(kind.as_str(), body));

        tracing::debug!(topic = %topic, count, "Goal advanced");
    }

    async fn relay_engagement(&self, kind: &'static str, total: &str, body: Value) {
        let body = into_object(body);
        let mut core = self.lock().await;
        core.bump_total(total, 1);
        core.registry
            .broadcast_all(&ServerMessage::tiktok(kind, &body));
    }
}

impl HubCore {
    fn bump_total(&mut self, field: &str, delta: u64) {
        absorb(
            Topic::General,
            self.store.accumulate(Topic::General, field, delta, None),
        );
    }
}

/// `{type: "update", payload: {type: kind, ...goal}}`
pub(crate) fn goal_update(kind: GoalKind, snapshot: &Snapshot) -> ServerMessage {
    let mut payload = Document::new();
    payload.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    if let Value::Object(fields) = snapshot.to_value() {
        payload.extend(fields);
    }
    ServerMessage::Update {
        payload: Value::Object(payload),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::registry::Frame;
    use crate::hub::Subscription;
    use serde_json::json;

    fn parse(frame: Frame) -> Value {
        serde_json::from_str(&frame).unwrap()
    }

    fn drain(sub: &mut Subscription) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = sub.receiver.try_recv() {
            frames.push(parse(frame));
        }
        frames
    }

    #[tokio::test]
    async fn test_like_advances_goal_and_broadcasts_update() {
        let hub = Hub::default();
        let mut sub = hub.admit("/like-goal").await.unwrap();
        drain(&mut sub);

        hub.ingest_like(json!({"likeCount": 5})).await;

        assert_eq!(
            hub.snapshot(Topic::LikeGoal).await,
            json!({"current": 5, "goal": 100})
        );
        let frames = drain(&mut sub);
        assert_eq!(
            frames[0],
            json!({"type": "update", "payload": {"type": "like", "current": 5, "goal": 100}})
        );
        assert_eq!(frames[1]["type"], "tiktok-event");
        assert_eq!(frames[1]["event"]["type"], "like");
    }

    #[tokio::test]
    async fn test_like_count_fallbacks() {
        let hub = Hub::default();
        hub.ingest_like(json!({"count": 3})).await;
        hub.ingest_like(json!({})).await;
        hub.ingest_like(json!("garbage")).await;

        assert_eq!(hub.snapshot(Topic::LikeGoal).await["current"], json!(5));
        assert_eq!(hub.snapshot(Topic::General).await["likes"], json!(5));
    }

    #[tokio::test]
    async fn test_follow_is_not_clamped() {
        let hub = Hub::default();
        hub.ingest_follow(json!({"count": 60})).await;
        hub.ingest_follow(json!({})).await;

        let goal = hub.snapshot(Topic::FollowGoal).await;
        assert_eq!(goal, json!({"current": 61, "goal": 50}));
    }

    #[tokio::test]
    async fn test_concurrent_likes_are_not_lost() {
        let hub = std::sync::Arc::new(Hub::default());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let hub = hub.clone();
            handles.push(tokio::spawn(async move {
                hub.ingest_like(json!({"likeCount": 2})).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(hub.snapshot(Topic::LikeGoal).await["current"], json!(100));
    }

    #[tokio::test]
    async fn test_gift_without_diamonds() {
        let hub = Hub::default();
        let mut bubbles = hub.admit("/gift-bubbles").await.unwrap();
        let mut versus = hub.admit("/giftvsgift").await.unwrap();
        drain(&mut bubbles);
        drain(&mut versus);

        hub.ingest_gift(json!({"giftName": "Rose", "uniqueId": "alice"}))
            .await;

        let totals = hub.snapshot(Topic::General).await;
        assert_eq!(totals["gifts"], json!(1));
        assert_eq!(totals["diamonds"], json!(0));

        let frames = drain(&mut bubbles);
        assert_eq!(
            frames[0],
            json!({"type": "gift", "giftData": {"giftName": "Rose", "uniqueId": "alice"}})
        );
        let frames = drain(&mut versus);
        assert_eq!(
            frames[0],
            json!({"type": "gift", "giftName": "Rose", "uniqueId": "alice"})
        );
    }

    #[tokio::test]
    async fn test_gift_totals_accumulate() {
        let hub = Hub::default();
        hub.ingest_gift(json!({"repeatCount": 3, "diamondCount": 10}))
            .await;
        hub.ingest_gift(json!({"repeatCount": "2", "diamondCount": 5}))
            .await;

        let totals = hub.snapshot(Topic::General).await;
        assert_eq!(totals["gifts"], json!(5));
        assert_eq!(totals["diamonds"], json!(15));
    }

    #[tokio::test]
    async fn test_chat_reaches_chat_topic_and_everyone() {
        let hub = Hub::default();
        let mut chat = hub.admit("/chat").await.unwrap();
        let mut general = hub.admit("/ws/unknown-widget").await.unwrap();
        drain(&mut chat);
        drain(&mut general);

        let sent_to = hub
            .ingest_chat(json!({"uniqueId": "bob", "comment": "hello"}))
            .await;
        assert_eq!(sent_to, 1);

        let frames = drain(&mut chat);
        assert_eq!(
            frames[0],
            json!({"type": "chat", "uniqueId": "bob", "comment": "hello"})
        );
        assert_eq!(frames[1]["type"], "tiktok-event");

        let frames = drain(&mut general);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["event"]["comment"], "hello");
        assert_eq!(frames[0]["payload"]["comment"], "hello");
    }

    #[tokio::test]
    async fn test_share_and_subscribe_totals() {
        let hub = Hub::default();
        let mut general = hub.admit("/").await.unwrap();
        drain(&mut general);

        hub.ingest_share(json!({"uniqueId": "carol"})).await;
        hub.ingest_subscribe(Value::Null).await;

        let totals = hub.snapshot(Topic::General).await;
        assert_eq!(totals["shares"], json!(1));
        assert_eq!(totals["subscribes"], json!(1));

        let frames = drain(&mut general);
        assert_eq!(frames[0]["event"]["type"], "share");
        assert_eq!(frames[1]["event"], json!({"type": "subscribe"}));
    }

    #[tokio::test]
    async fn test_relay_event_prefers_event_over_data() {
        let hub = Hub::default();
        let mut general = hub.admit("/").await.unwrap();
        drain(&mut general);

        hub.relay_event(json!({"event": {"type": "custom"}, "data": 1}))
            .await;
        hub.relay_event(json!({"data": {"type": "fallback"}})).await;

        let frames = drain(&mut general);
        assert_eq!(
            frames[0],
            json!({"type": "tiktok-event", "event": {"type": "custom"}})
        );
        assert_eq!(frames[1]["event"]["type"], "fallback");
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_prior_mutations() {
        let hub = Hub::default();
        for _ in 0..4 {
            hub.ingest_like(json!({"likeCount": 5})).await;
        }

        let mut sub = hub.admit("/likegoal").await.unwrap();
        let frames = drain(&mut sub);
        assert_eq!(
            frames[0],
            json!({"type": "initial-state", "state": {"current": 20, "goal": 100}})
        );
    }
}
