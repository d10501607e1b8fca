//! Producer sessions
//!
//! The producing application authenticates once with a shared app id (and
//! optional secret) and receives a session token. Sessions are bookkeeping
//! only: nothing expires them and no route requires one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Bookkeeping for one authenticated producer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub app_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Credentials accepted by [`SessionStore::authenticate`]
#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_id: String,
    /// When set, producers must present the same secret
    pub secret_key: Option<String>,
}

/// Token → session map
#[derive(Debug)]
pub struct SessionStore {
    credentials: Credentials,
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            sessions: HashMap::new(),
        }
    }

    /// Issue a session token if the credentials match
    pub fn authenticate(&mut self, app_id: &str, secret_key: Option<&str>) -> Option<String> {
        if app_id != self.credentials.app_id {
            return None;
        }
        if let Some(expected) = &self.credentials.secret_key {
            if secret_key != Some(expected.as_str()) {
                return None;
            }
        }

        let now = Utc::now();
        let token = format!(
            "session_{}_{}",
            now.timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..9]
        );
        self.sessions.insert(
            token.clone(),
            Session {
                app_id: app_id.to_string(),
                created_at: now,
                last_activity: now,
            },
        );
        Some(token)
    }

    /// Record activity on a session; unknown tokens are ignored
    pub fn touch(&mut self, token: &str) -> bool {
        match self.sessions.get_mut(token) {
            Some(session) => {
                session.last_activity = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, token: &str) -> Option<&Session> {
        self.sessions.get(token)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
