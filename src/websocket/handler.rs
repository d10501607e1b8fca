//! WebSocket Handler
//!
//! Upgrades overlay connections and runs their lifecycle:
//! `Connecting → Admitted → Open → Closed`.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use super::messages::ServerMessage;
use crate::hub::{Hub, Subscription};

/// Upgrade a connection arriving on `path`
///
/// The path decides which topic the overlay is subscribed to.
pub fn upgrade(ws: WebSocketUpgrade, hub: Arc<Hub>, path: &str) -> Response {
    let path = path.to_string();
    ws.on_upgrade(move |socket| handle_socket(socket, hub, path))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<Hub>, path: String) {
    let (mut sender, mut receiver) = socket.split();

    let Subscription {
        id,
        topic,
        receiver: mut frames,
    } = match hub.admit(&path).await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Overlay rejected");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Ok(frame) = error_msg.to_frame() {
                let _ = sender.send(Message::Text(frame.to_string())).await;
            }
            let _ = sender.close().await;
            return;
        }
    };

    let conn_id_for_send = id.clone();

    // Task to forward queued frames to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if sender.send(Message::Text(frame.to_string())).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let hub_for_recv = Arc::clone(&hub);
    let conn_id_for_recv = id.clone();

    // Task to receive control messages from the overlay
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    hub_for_recv.handle_control(topic, &text).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %conn_id_for_recv, "Client requested close");
                    break;
                }
                // Axum answers pings; binary frames carry nothing we use
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.release(topic, &id).await;
}
