//! Control messages from overlays
//!
//! Overlays report back when their counter reaches the goal. The hub re-arms
//! the goal according to the overlay's policy and tells everyone.

use serde_json::Value;

use super::payload::{as_count, Document};
use super::topic::{GoalKind, Topic};
use super::{absorb, Hub};
use crate::websocket::messages::{ClientMessage, GoalCompleted};
use crate::websocket::ServerMessage;

/// What happens to a goal once it is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalPolicy {
    /// Next goal is twice the reached one
    Double,
    /// Next goal adds the baseline to the reached one
    Increase,
    /// Next goal is the baseline
    Reset,
    /// Next goal is out of reach
    Hide,
    /// Goal stays where it is
    Keep,
}

impl GoalPolicy {
    pub fn parse(when_reached: Option<&str>) -> Self {
        match when_reached {
            Some("double") => GoalPolicy::Double,
            Some("increase") => GoalPolicy::Increase,
            Some("reset") => GoalPolicy::Reset,
            Some("hide") => GoalPolicy::Hide,
            _ => GoalPolicy::Keep,
        }
    }

    /// Goal to arm after `goal` was reached
    pub fn next_goal(self, goal: u64, baseline: u64, hidden_goal: u64) -> u64 {
        match self {
            GoalPolicy::Double => goal.saturating_mul(2),
            GoalPolicy::Increase => goal.saturating_add(baseline),
            GoalPolicy::Reset => baseline,
            GoalPolicy::Hide => hidden_goal,
            GoalPolicy::Keep => goal,
        }
    }
}

impl Hub {
    /// Handle a text frame received from an overlay on `origin`.
    ///
    /// Returns the newly armed goal when the frame completed one. Malformed
    /// frames are logged and dropped.
    pub async fn handle_control(&self, origin: Topic, text: &str) -> Option<u64> {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::GoalCompleted(done)) => self.complete_goal(origin, done).await,
            Ok(ClientMessage::Unknown) => {
                tracing::debug!(topic = %origin, "Ignoring control message");
                None
            }
            Err(e) => {
                tracing::warn!(topic = %origin, error = %e, "Malformed control message");
                None
            }
        }
    }

    async fn complete_goal(&self, origin: Topic, done: GoalCompleted) -> Option<u64> {
        let kind = match done.goal_type.parse::<GoalKind>() {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(
                    topic = %origin,
                    goal_type = %done.goal_type,
                    "Unknown goal type in goal-completed"
                );
                return None;
            }
        };
        let topic = kind.topic();
        let default_goal = match kind {
            GoalKind::Like => self.config().like_goal,
            GoalKind::Follow => self.config().follow_goal,
        };

        let mut core = self.lock().await;
        let stored = core.store.get(topic).as_goal()?.clone();

        // A zero baseline counts as not yet captured
        let fallback = if stored.goal > 0 {
            stored.goal
        } else {
            default_goal
        };
        let baseline = stored.original_goal.filter(|g| *g > 0).unwrap_or(fallback);
        let reached = as_count(&done.goal).unwrap_or(stored.goal);
        let policy = GoalPolicy::parse(done.when_reached.as_deref());
        let new_goal = policy.next_goal(reached, baseline, self.config().hidden_goal);

        let mut partial = Document::new();
        partial.insert("current".to_string(), Value::from(0u64));
        partial.insert("goal".to_string(), Value::from(new_goal));
        partial.insert("originalGoal".to_string(), Value::from(baseline));
        absorb(topic, core.store.merge(topic, partial))?;

        core.registry.broadcast_all(&ServerMessage::GoalCompleted {
            goal_type: kind,
            goal: new_goal,
            when_reached: done.when_reached.clone(),
            action_on_finish: done.action_on_finish.clone(),
        });
        core.registry.broadcast(topic, &ServerMessage::ResetCount);
        core.registry
            .broadcast(topic, &ServerMessage::UpdateGoal { new_goal });

        tracing::info!(
            topic = %topic,
            origin = %origin,
            reached,
            new_goal,
            baseline,
            policy = ?policy,
            "Goal completed"
        );
        Some(new_goal)
    }
}
