//! Subscriber admission and release
//!
//! Admission classifies the request path, registers the connection and
//! queues its catch-up frames (snapshot, then settings where the topic has
//! them) while holding the hub lock. Any broadcast issued afterwards is
//! queued behind those frames.

use tokio::sync::mpsc;

use super::error::{HubError, HubResult};
use super::registry::{Connection, ConnectionId, Frame};
use super::store::StateStore;
use super::topic::Topic;
use super::Hub;
use crate::websocket::ServerMessage;

/// An admitted overlay connection.
///
/// The receiver yields every frame addressed to the connection, in order.
/// Hand it to the connection's writer task and call [`Hub::release`] when
/// the socket ends.
#[derive(Debug)]
pub struct Subscription {
    pub id: ConnectionId,
    pub topic: Topic,
    pub receiver: mpsc::UnboundedReceiver<Frame>,
}

impl Hub {
    /// Admit a connection arriving on `path`
    pub async fn admit(&self, path: &str) -> HubResult<Subscription> {
        let topic = Topic::classify(path);
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection = Connection::new(topic, sender);
        let id = connection.id.clone();

        let mut core = self.lock().await;

        let limit = self.config().max_connections;
        if core.registry.connection_count() >= limit {
            tracing::warn!(path = %path, topic = %topic, limit, "Connection limit reached");
            return Err(HubError::TooManyConnections(limit));
        }

        let handle = connection.clone();
        core.registry.register(connection);

        if let Err(e) = send_catch_up(&handle, &core.store) {
            core.registry.unregister(topic, &id);
            return Err(e);
        }

        tracing::info!(
            path = %path,
            topic = %topic,
            connection_id = %id,
            subscribers = core.registry.subscriber_count(topic),
            "Overlay connected"
        );

        Ok(Subscription {
            id,
            topic,
            receiver,
        })
    }

    /// Remove a connection from its topic; safe to call more than once
    pub async fn release(&self, topic: Topic, id: &str) {
        let mut core = self.lock().await;
        if core.registry.unregister(topic, id) {
            tracing::info!(
                topic = %topic,
                connection_id = %id,
                subscribers = core.registry.subscriber_count(topic),
                "Overlay disconnected"
            );
        }
    }
}

fn send_catch_up(connection: &Connection, store: &StateStore) -> HubResult<()> {
    let topic = connection.topic;
    let initial = ServerMessage::InitialState {
        state: store.get(topic).to_value(),
    };
    connection.send(initial.to_frame()?)?;

    if let (Some(kind), Some(settings)) = (topic.settings_message(), store.settings(topic)) {
        let message = ServerMessage::Settings {
            kind,
            settings: serde_json::Value::Object(settings.clone()),
        };
        connection.send(message.to_frame()?)?;
    }
    Ok(())
}
