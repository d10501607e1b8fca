//! Broadcaster
//!
//! Fans a message out to every connection of a topic. The message is
//! serialized once; a connection that cannot take the frame is counted as a
//! failure and skipped, and the loop always runs to the end of the set.

use serde::Serialize;

use super::registry::{Frame, Liveness, TopicRegistry};
use super::topic::Topic;
use crate::websocket::ServerMessage;

/// Cumulative delivery counters for one topic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Outcome of a single broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    fn absorb(&mut self, other: DeliveryReport) {
        self.attempted += other.attempted;
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

impl TopicRegistry {
    /// Deliver `message` to every subscriber of `topic`
    pub fn broadcast(&mut self, topic: Topic, message: &ServerMessage) -> DeliveryReport {
        match message.to_frame() {
            Ok(frame) => self.deliver(topic, &frame),
            Err(e) => {
                tracing::error!(topic = %topic, error = %e, "Failed to serialize broadcast");
                DeliveryReport::default()
            }
        }
    }

    /// Deliver `message` to every topic, `general` included
    pub fn broadcast_all(&mut self, message: &ServerMessage) -> DeliveryReport {
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize broadcast");
                return DeliveryReport::default();
            }
        };

        let mut total = DeliveryReport::default();
        for topic in Topic::ALL {
            total.absorb(self.deliver(topic, &frame));
        }
        total
    }

    /// Lifetime delivery counters of a topic
    pub fn delivery_stats(&self, topic: Topic) -> DeliveryStats {
        self.subscribers(topic)
            .map(|s| s.stats)
            .unwrap_or_default()
    }

    fn deliver(&mut self, topic: Topic, frame: &Frame) -> DeliveryReport {
        let Some(subscribers) = self.subscribers_mut(topic) else {
            return DeliveryReport::default();
        };

        let mut report = DeliveryReport::default();
        for connection in &subscribers.connections {
            report.attempted += 1;

            let result = match connection.liveness() {
                Liveness::Open => connection.send(Frame::clone(frame)),
                Liveness::Closed => Err(super::HubError::SendFailed),
            };

            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        topic = %topic,
                        connection_id = %connection.id,
                        error = %e,
                        "Delivery failed"
                    );
                }
            }
        }

        subscribers.stats.attempted += report.attempted as u64;
        subscribers.stats.succeeded += report.delivered as u64;
        subscribers.stats.failed += report.failed as u64;

        if report.attempted > 0 {
            tracing::debug!(
                topic = %topic,
                delivered = report.delivered,
                subscribers = report.attempted,
                "Broadcast"
            );
        }
        report
    }
}
