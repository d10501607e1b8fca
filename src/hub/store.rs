//! State Store
//!
//! Holds the current [`Snapshot`] of every topic plus the settings sub-state
//! of the overlays that have one. Three mutation disciplines apply:
//!
//! - **replace**: swap the whole snapshot
//! - **merge**: shallow field-wise overwrite; `null` fields count as absent
//! - **accumulate**: add a delta to a named counter, optionally capped
//!
//! Every mutator returns the resulting snapshot so callers can build their
//! broadcast payload without a second lookup. The store is plain data; the
//! [`Hub`](super::Hub) serializes access to it.

use std::collections::HashMap;

use serde_json::Value;

use super::error::{StoreError, StoreResult};
use super::payload::{into_object, Document};
use super::snapshot::{default_leaderboard_settings, Snapshot};
use super::topic::Topic;

/// Per-topic snapshots and settings
#[derive(Debug, Clone)]
pub struct StateStore {
    snapshots: HashMap<Topic, Snapshot>,
    settings: HashMap<Topic, Document>,
}

impl StateStore {
    /// Create a store with every topic at its default snapshot
    pub fn new(like_goal: u64, follow_goal: u64) -> Self {
        let snapshots = Topic::ALL
            .iter()
            .map(|t| (*t, Snapshot::initial(*t, like_goal, follow_goal)))
            .collect();

        let mut settings = HashMap::new();
        settings.insert(Topic::TopGift, default_leaderboard_settings("TOP GIFT"));
        settings.insert(Topic::TopStreak, default_leaderboard_settings("TOP STREAK"));

        Self {
            snapshots,
            settings,
        }
    }

    /// Current snapshot of a topic
    pub fn get(&self, topic: Topic) -> &Snapshot {
        // Every topic is seeded in `new` and never removed.
        &self.snapshots[&topic]
    }

    fn get_mut(&mut self, topic: Topic) -> &mut Snapshot {
        self.snapshots
            .entry(topic)
            .or_insert_with(|| Snapshot::initial(topic, 0, 0))
    }

    /// Overwrite a topic's snapshot
    pub fn replace(&mut self, topic: Topic, state: Value) -> StoreResult<&Snapshot> {
        let snapshot = Snapshot::from_value(topic, state)?;
        let slot = self.get_mut(topic);
        *slot = snapshot;
        Ok(&*slot)
    }

    /// Shallow-merge `partial` into a topic's snapshot
    pub fn merge(&mut self, topic: Topic, partial: Document) -> StoreResult<&Snapshot> {
        let slot = self.get_mut(topic);
        let merged = match slot.to_value() {
            Value::Object(mut current) => {
                merge_fields(&mut current, partial);
                current
            }
            _ => partial,
        };
        *slot = Snapshot::from_value(topic, Value::Object(merged))?;
        Ok(&*slot)
    }

    /// Add `delta` to a counter, capping at `ceiling` when one is given
    pub fn accumulate(
        &mut self,
        topic: Topic,
        field: &str,
        delta: u64,
        ceiling: Option<u64>,
    ) -> StoreResult<&Snapshot> {
        let slot = self.get_mut(topic);
        let counter = slot
            .counter_mut(field)
            .ok_or_else(|| StoreError::UnknownCounter {
                topic,
                field: field.to_string(),
            })?;

        let next = counter.saturating_add(delta);
        *counter = match ceiling {
            Some(cap) => next.min(cap),
            None => next,
        };
        Ok(&*slot)
    }

    /// Push `item` onto a list field of a document snapshot
    pub fn append(&mut self, topic: Topic, field: &str, item: Value) -> StoreResult<&Snapshot> {
        let slot = self.get_mut(topic);
        let Snapshot::Document(doc) = slot else {
            return Err(StoreError::Unsupported {
                topic,
                operation: "append",
            });
        };

        match doc.get_mut(field) {
            Some(Value::Array(items)) => items.push(item),
            _ => {
                doc.insert(field.to_string(), Value::Array(vec![item]));
            }
        }
        Ok(&*slot)
    }

    /// Settings sub-state of a topic, if it has any
    pub fn settings(&self, topic: Topic) -> Option<&Document> {
        self.settings.get(&topic)
    }

    /// Overwrite a topic's settings sub-state
    pub fn replace_settings(&mut self, topic: Topic, settings: Value) -> StoreResult<&Document> {
        if topic.settings_message().is_none() {
            return Err(StoreError::Unsupported {
                topic,
                operation: "settings",
            });
        }
        let slot = self.settings.entry(topic).or_default();
        *slot = into_object(settings);
        Ok(&*slot)
    }

    /// Shallow-merge into a topic's settings sub-state
    pub fn merge_settings(&mut self, topic: Topic, partial: Document) -> StoreResult<&Document> {
        if topic.settings_message().is_none() {
            return Err(StoreError::Unsupported {
                topic,
                operation: "settings",
            });
        }
        let slot = self.settings.entry(topic).or_default();
        merge_fields(slot, partial);
        Ok(&*slot)
    }
}

/// Overwrite `target` with every non-null field of `partial`
pub fn merge_fields(target: &mut Document, partial: Document) {
    for (key, value) in partial {
        if !value.is_null() {
            target.insert(key, value);
        }
    }
}
