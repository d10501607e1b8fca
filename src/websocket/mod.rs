//! WebSocket Overlay Connections
//!
//! Overlays connect with a plain WebSocket on any path. The path picks the
//! topic (see [`Topic::classify`](crate::hub::Topic::classify)); the first
//! frame is always the topic's current state.
//!
//! ## Messages
//!
//! - hub → overlay: [`ServerMessage`], JSON with a `type` field
//! - overlay → hub: [`ClientMessage`], currently only `goal-completed`
//!
//! ## Example
//!
//! ```javascript
//! // Browser source in the streaming software
//! const ws = new WebSocket('ws://localhost:3003/like-goal');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'initial-state') render(msg.state);
//!   if (msg.type === 'update') render(msg.payload);
//! };
//! ```

mod handler;
pub mod messages;

pub use handler::upgrade;
pub use messages::{ClientMessage, GoalCompleted, ServerMessage};
