//! Topic Registry
//!
//! Maps every topic to the live connections subscribed to it. Topics are
//! registered once at construction; connections come and go.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::broadcast::DeliveryStats;
use super::error::HubError;
use super::topic::Topic;

/// Unique identifier for a subscriber connection
pub type ConnectionId = String;

/// A serialized message, shared by every connection it is fanned out to
pub type Frame = Arc<str>;

/// Whether a connection can still accept frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Open,
    Closed,
}

/// Handle for sending frames to one subscriber
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub topic: Topic,
    sender: mpsc::UnboundedSender<Frame>,
}

impl Connection {
    pub fn new(topic: Topic, sender: mpsc::UnboundedSender<Frame>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            topic,
            sender,
        }
    }

    /// Closed once the connection's writer task has dropped its receiver
    pub fn liveness(&self) -> Liveness {
        if self.sender.is_closed() {
            Liveness::Closed
        } else {
            Liveness::Open
        }
    }

    /// Queue a frame for the writer task
    pub fn send(&self, frame: Frame) -> Result<(), HubError> {
        self.sender.send(frame).map_err(|_| HubError::SendFailed)
    }
}

/// Subscribers of one topic, in admission order
#[derive(Debug, Default)]
pub(super) struct Subscribers {
    pub(super) connections: Vec<Connection>,
    pub(super) stats: DeliveryStats,
}

/// Registry of topics and their subscriber sets
#[derive(Debug)]
pub struct TopicRegistry {
    topics: HashMap<Topic, Subscribers>,
}

impl TopicRegistry {
    /// Create a registry with every known topic pre-registered
    pub fn new() -> Self {
        let topics = Topic::ALL
            .iter()
            .map(|t| (*t, Subscribers::default()))
            .collect();
        Self { topics }
    }

    /// Add a connection to its topic's subscriber set.
    ///
    /// Returns false, after logging, when the topic is not registered.
    pub fn register(&mut self, connection: Connection) -> bool {
        match self.topics.get_mut(&connection.topic) {
            Some(subscribers) => {
                tracing::debug!(
                    topic = %connection.topic,
                    connection_id = %connection.id,
                    "Connection registered"
                );
                subscribers.connections.push(connection);
                true
            }
            None => {
                tracing::warn!(
                    topic = %connection.topic,
                    connection_id = %connection.id,
                    "Register for unknown topic ignored"
                );
                false
            }
        }
    }

    /// Remove a connection; removing an absent connection is a no-op
    pub fn unregister(&mut self, topic: Topic, id: &str) -> bool {
        let Some(subscribers) = self.topics.get_mut(&topic) else {
            return false;
        };
        let before = subscribers.connections.len();
        subscribers.connections.retain(|c| c.id != id);
        before != subscribers.connections.len()
    }

    /// Number of live subscribers on a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics
            .get(&topic)
            .map(|s| s.connections.len())
            .unwrap_or(0)
    }

    /// Number of subscribers across all topics
    pub fn connection_count(&self) -> usize {
        self.topics.values().map(|s| s.connections.len()).sum()
    }

    pub(super) fn subscribers_mut(&mut self, topic: Topic) -> Option<&mut Subscribers> {
        self.topics.get_mut(&topic)
    }

    pub(super) fn subscribers(&self, topic: Topic) -> Option<&Subscribers> {
        self.topics.get(&topic)
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_topics_pre_registered() {
        let registry = TopicRegistry::new();
        for topic in Topic::ALL {
            assert_eq!(registry.subscriber_count(topic), 0);
            assert!(registry.subscribers(topic).is_some());
        }
    }

    #[test]
    fn test_register_unregister() {
        let mut registry = TopicRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = Connection::new(Topic::Chat, tx);
        let id = conn.id.clone();

        assert!(registry.register(conn));
        assert_eq!(registry.subscriber_count(Topic::Chat), 1);
        assert_eq!(registry.connection_count(), 1);

        assert!(registry.unregister(Topic::Chat, &id));
        assert_eq!(registry.subscriber_count(Topic::Chat), 0);

        // Idempotent
        assert!(!registry.unregister(Topic::Chat, &id));
    }

    #[test]
    fn test_liveness_follows_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Connection::new(Topic::Timer, tx);
        assert_eq!(conn.liveness(), Liveness::Open);

        drop(rx);
        assert_eq!(conn.liveness(), Liveness::Closed);
        assert!(matches!(conn.send(Arc::from("x")), Err(HubError::SendFailed)));
    }
}
