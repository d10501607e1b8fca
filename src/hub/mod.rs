//! Overlay Relay Hub
//!
//! The hub owns every piece of shared state in the process:
//!
//! - **topic**: the closed set of topics and path classification
//! - **registry**: live subscriber connections per topic
//! - **store**: last-known snapshot (and settings) per topic
//! - **broadcast**: fan-out with per-topic delivery counters
//! - **subscription**: admission, catch-up delivery, release
//! - **ingest** / **overlays**: producer events and editor updates
//! - **control**: messages sent back by overlays
//! - **session**: producer authentication bookkeeping
//!
//! # Consistency
//!
//! Registry, store and action list live behind one async mutex. Each
//! operation takes the lock once, mutates, enqueues its broadcasts and
//! releases it, without awaiting in between. A read-modify-write on a
//! counter can therefore never interleave with another, and a connection
//! admitted mid-stream always receives its snapshot before any later
//! broadcast.
//!
//! ```text
//! Producer → ingest → store → broadcast → subscribers
//! Overlay  → admit  → registry + snapshot
//! Overlay  → control → store → broadcast
//! ```

pub mod broadcast;
pub mod control;
pub mod error;
pub mod ingest;
pub mod overlays;
pub mod payload;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod subscription;
pub mod topic;

pub use broadcast::{DeliveryReport, DeliveryStats};
pub use control::GoalPolicy;
pub use error::{HubError, HubResult, StoreError, StoreResult};
pub use overlays::Wheel;
pub use registry::{Connection, ConnectionId, Frame, Liveness, TopicRegistry};
pub use session::{Credentials, Session, SessionStore};
pub use snapshot::{GoalState, Snapshot, StreamTotals};
pub use store::StateStore;
pub use subscription::Subscription;
pub use topic::{GoalKind, Topic, UnknownTopic};

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use snapshot::{DEFAULT_FOLLOW_GOAL, DEFAULT_LIKE_GOAL};

/// Goal value that effectively hides a completed goal
pub const HIDDEN_GOAL: u64 = 999_999;

/// Configuration for the hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent overlay connections
    pub max_connections: usize,
    /// Starting like goal
    pub like_goal: u64,
    /// Starting follow goal
    pub follow_goal: u64,
    /// Goal assigned by the `hide` completion policy
    pub hidden_goal: u64,
    /// Producer credentials
    pub credentials: Credentials,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            like_goal: DEFAULT_LIKE_GOAL,
            follow_goal: DEFAULT_FOLLOW_GOAL,
            hidden_goal: HIDDEN_GOAL,
            credentials: Credentials {
                app_id: "TikHub-Overlay-Integration".to_string(),
                secret_key: None,
            },
        }
    }
}

/// State guarded by the hub lock
#[derive(Debug)]
pub(crate) struct HubCore {
    pub(crate) registry: TopicRegistry,
    pub(crate) store: StateStore,
    pub(crate) actions: Vec<Value>,
}

/// Point-in-time view of subscribers and delivery counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStats {
    pub connections: usize,
    pub sessions: usize,
    pub active_clients: BTreeMap<Topic, usize>,
    pub delivery: BTreeMap<Topic, DeliveryStats>,
}

/// Event relay and state-broadcast hub
pub struct Hub {
    core: Mutex<HubCore>,
    sessions: Mutex<SessionStore>,
    config: HubConfig,
}

impl Hub {
    /// Create a hub with every topic at its default snapshot
    pub fn new(config: HubConfig) -> Self {
        let core = HubCore {
            registry: TopicRegistry::new(),
            store: StateStore::new(config.like_goal, config.follow_goal),
            actions: Vec::new(),
        };

        Self {
            core: Mutex::new(core),
            sessions: Mutex::new(SessionStore::new(config.credentials.clone())),
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Current snapshot of a topic as JSON
    pub async fn snapshot(&self, topic: Topic) -> Value {
        self.core.lock().await.store.get(topic).to_value()
    }

    /// Settings sub-state of a topic, if it has any
    pub async fn settings(&self, topic: Topic) -> Option<Value> {
        self.core
            .lock()
            .await
            .store
            .settings(topic)
            .map(|s| Value::Object(s.clone()))
    }

    /// Live subscribers on one topic
    pub async fn subscriber_count(&self, topic: Topic) -> usize {
        self.core.lock().await.registry.subscriber_count(topic)
    }

    /// Subscriber and delivery counters for every topic
    pub async fn stats(&self) -> HubStats {
        let sessions = self.sessions.lock().await.len();
        let core = self.core.lock().await;

        HubStats {
            connections: core.registry.connection_count(),
            sessions,
            active_clients: Topic::ALL
                .iter()
                .map(|t| (*t, core.registry.subscriber_count(*t)))
                .collect(),
            delivery: Topic::ALL
                .iter()
                .map(|t| (*t, core.registry.delivery_stats(*t)))
                .collect(),
        }
    }

    /// Stored action references, verbatim
    pub async fn actions(&self) -> Vec<Value> {
        self.core.lock().await.actions.clone()
    }

    /// Replace the stored action references
    pub async fn set_actions(&self, actions: Vec<Value>) {
        let count = actions.len();
        self.core.lock().await.actions = actions;
        tracing::info!(count, "Actions updated");
    }

    /// Issue a session token for matching producer credentials
    pub async fn authenticate(&self, app_id: &str, secret_key: Option<&str>) -> Option<String> {
        let token = self.sessions.lock().await.authenticate(app_id, secret_key);
        match &token {
            Some(_) => tracing::info!(app_id = %app_id, "Producer authenticated"),
            None => tracing::warn!(app_id = %app_id, "Producer authentication rejected"),
        }
        token
    }

    /// Record activity on a session token
    pub async fn touch_session(&self, token: &str) -> bool {
        self.sessions.lock().await.touch(token)
    }

    pub(crate) async fn lock(&self) -> tokio::sync::MutexGuard<'_, HubCore> {
        self.core.lock().await
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

/// Log and discard a store error on the ingestion path
pub(crate) fn absorb<T>(topic: Topic, result: StoreResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(topic = %topic, error = %e, "State update skipped");
            None
        }
    }
}
