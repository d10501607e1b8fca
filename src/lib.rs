//! # Overlay Hub
//!
//! Real-time relay between a live-stream event producer and the browser
//! overlays rendered by streaming software.
//!
//! The producer posts events (gifts, likes, follows, chat) over HTTP; the
//! hub folds them into per-overlay state and pushes updates to every
//! overlay subscribed over WebSocket. Overlays connecting mid-stream start
//! from the current snapshot.
//!
//! ## Modules
//!
//! - [`hub`]: Topics, state store, subscribers and fan-out
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Overlay connections and wire messages
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use overlay_hub::hub::{Hub, HubConfig, Topic};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = Hub::new(HubConfig::default());
//!
//!     // An overlay subscribes by path
//!     let mut overlay = hub.admit("/like-goal").await?;
//!     let initial = overlay.receiver.recv().await;
//!     println!("first frame: {:?}", initial);
//!
//!     // The producer reports likes
//!     hub.ingest_like(json!({"likeCount": 5})).await;
//!     println!("like goal: {}", hub.snapshot(Topic::LikeGoal).await);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod hub;
pub mod websocket;

// Re-export top-level types for convenience
pub use hub::{
    GoalKind, Hub, HubConfig, HubError, HubStats, Snapshot, StateStore, StoreError, Subscription,
    Topic, TopicRegistry,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use websocket::{ClientMessage, ServerMessage};

pub use config::{AuthConfig, Config, ConfigError, HubSection, LoggingConfig, ServerConfig};
