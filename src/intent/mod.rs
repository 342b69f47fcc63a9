//! Goals and the priority-ordered intent stack.
//!
//! Intents are what an entity is currently trying to do. The stack is a
//! stable priority queue: higher priority wins, ties resolve to
//! insertion order, and expired intents are dropped against world time
//! (never wall-clock).

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// What an intent is trying to achieve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Explore,
    Wander,
    Rest,
    Observe,
    /// Application-defined goal.
    Custom(String),
}

impl Goal {
    /// Short text form used in thoughts and events.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Goal::Explore => "explore",
            Goal::Wander => "wander",
            Goal::Rest => "rest",
            Goal::Observe => "observe",
            Goal::Custom(name) => name,
        }
    }
}

/// A single goal with motivation, priority and an optional timeout.
///
/// # Examples
///
/// ```
/// use vivarium::intent::{Goal, Intent};
///
/// let intent = Intent::new(Goal::Explore, 0.8, 2, 10.0).with_timeout(30.0);
/// assert!(!intent.is_expired(20.0));
/// assert!(intent.is_expired(40.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// The goal being pursued.
    pub goal: Goal,
    /// Optional target entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityId>,
    /// Drive behind the goal, 0 to 1.
    pub motivation: f32,
    /// Priority; higher wins.
    pub priority: i32,
    /// World time the intent was created.
    pub created: f64,
    /// Seconds after creation at which the intent expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl Intent {
    /// Creates an intent with clamped motivation and no timeout.
    #[must_use]
    pub fn new(goal: Goal, motivation: f32, priority: i32, created: f64) -> Self {
        Intent {
            goal,
            target: None,
            motivation: if motivation.is_nan() {
                0.0
            } else {
                motivation.clamp(0.0, 1.0)
            },
            priority,
            created,
            timeout: None,
        }
    }

    /// Sets a target entity.
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets a timeout in seconds after creation.
    #[must_use]
    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns true when the intent has timed out at `now`.
    #[must_use]
    pub fn is_expired(&self, now: f64) -> bool {
        match self.timeout {
            Some(timeout) => now - self.created >= timeout,
            None => false,
        }
    }
}

/// Stable priority stack of intents.
///
/// Higher priority comes first; equal priorities keep insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntentStack {
    intents: Vec<Intent>,
}

impl IntentStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        IntentStack::default()
    }

    /// Returns the number of intents, expired ones included until the
    /// next `update`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Returns true when the stack holds no intents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Inserts an intent at its stable priority position.
    pub fn push(&mut self, intent: Intent) {
        let pos = self
            .intents
            .partition_point(|existing| existing.priority >= intent.priority);
        self.intents.insert(pos, intent);
    }

    /// Removes and returns the top intent.
    pub fn pop(&mut self) -> Option<Intent> {
        if self.intents.is_empty() {
            None
        } else {
            Some(self.intents.remove(0))
        }
    }

    /// Returns the highest-priority non-expired intent.
    #[must_use]
    pub fn current(&self, now: f64) -> Option<&Intent> {
        self.intents.iter().find(|i| !i.is_expired(now))
    }

    /// Removes every intent with the given goal. Returns how many were
    /// removed.
    pub fn remove_goal(&mut self, goal: &Goal) -> usize {
        let before = self.intents.len();
        self.intents.retain(|i| &i.goal != goal);
        before - self.intents.len()
    }

    /// Removes every intent targeting the given entity. Returns how
    /// many were removed.
    pub fn remove_target(&mut self, target: &EntityId) -> usize {
        let before = self.intents.len();
        self.intents.retain(|i| i.target.as_ref() != Some(target));
        before - self.intents.len()
    }

    /// Drops expired intents against world time `now`.
    pub fn update(&mut self, now: f64) {
        self.intents.retain(|i| !i.is_expired(now));
    }

    /// Iterates intents in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_orders_by_priority_descending() {
        let mut stack = IntentStack::new();
        stack.push(Intent::new(Goal::Rest, 0.5, 1, 0.0));
        stack.push(Intent::new(Goal::Explore, 0.8, 3, 0.0));
        stack.push(Intent::new(Goal::Wander, 0.4, 2, 0.0));

        let goals: Vec<&Goal> = stack.iter().map(|i| &i.goal).collect();
        assert_eq!(goals, vec![&Goal::Explore, &Goal::Wander, &Goal::Rest]);
    }

    #[test]
    fn equal_priority_preserves_insertion_order() {
        let mut stack = IntentStack::new();
        stack.push(Intent::new(Goal::Custom("first".into()), 0.5, 2, 0.0));
        stack.push(Intent::new(Goal::Custom("second".into()), 0.5, 2, 1.0));
        stack.push(Intent::new(Goal::Custom("third".into()), 0.5, 2, 2.0));

        let goals: Vec<&str> = stack.iter().map(|i| i.goal.as_str()).collect();
        assert_eq!(goals, vec!["first", "second", "third"]);
    }

    #[test]
    fn current_skips_expired() {
        let mut stack = IntentStack::new();
        stack.push(Intent::new(Goal::Explore, 0.8, 3, 0.0).with_timeout(5.0));
        stack.push(Intent::new(Goal::Rest, 0.3, 1, 0.0));

        assert_eq!(stack.current(1.0).unwrap().goal, Goal::Explore);
        // At created + timeout the high-priority intent is gone.
        assert_eq!(stack.current(5.0).unwrap().goal, Goal::Rest);
    }

    #[test]
    fn intent_absent_just_after_timeout() {
        let created = 10.0;
        let timeout = 4.0;
        let mut stack = IntentStack::new();
        stack.push(Intent::new(Goal::Wander, 0.5, 1, created).with_timeout(timeout));

        let epsilon = 1e-9;
        assert!(stack.current(created + timeout + epsilon).is_none());
        stack.update(created + timeout + epsilon);
        assert!(stack.is_empty());
    }

    #[test]
    fn update_drops_only_expired() {
        let mut stack = IntentStack::new();
        stack.push(Intent::new(Goal::Explore, 0.8, 2, 0.0).with_timeout(1.0));
        stack.push(Intent::new(Goal::Rest, 0.3, 1, 0.0).with_timeout(100.0));
        stack.update(2.0);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.current(2.0).unwrap().goal, Goal::Rest);
    }

    #[test]
    fn remove_goal_and_target() {
        let target = EntityId::new("t").unwrap();
        let mut stack = IntentStack::new();
        stack.push(Intent::new(Goal::Wander, 0.5, 1, 0.0));
        stack.push(Intent::new(Goal::Observe, 0.5, 1, 0.0).with_target(target.clone()));
        stack.push(Intent::new(Goal::Wander, 0.5, 2, 0.0));

        assert_eq!(stack.remove_goal(&Goal::Wander), 2);
        assert_eq!(stack.remove_target(&target), 1);
        assert!(stack.is_empty());
    }

    #[test]
    fn pop_returns_top() {
        let mut stack = IntentStack::new();
        stack.push(Intent::new(Goal::Rest, 0.5, 1, 0.0));
        stack.push(Intent::new(Goal::Explore, 0.8, 5, 0.0));
        assert_eq!(stack.pop().unwrap().goal, Goal::Explore);
        assert_eq!(stack.pop().unwrap().goal, Goal::Rest);
        assert!(stack.pop().is_none());
    }

    #[test]
    fn nan_motivation_becomes_zero() {
        let intent = Intent::new(Goal::Rest, f32::NAN, 1, 0.0);
        assert_eq!(intent.motivation, 0.0);
    }

    #[test]
    fn motivation_clamped() {
        assert_eq!(Intent::new(Goal::Rest, 2.0, 1, 0.0).motivation, 1.0);
        assert_eq!(Intent::new(Goal::Rest, -1.0, 1, 0.0).motivation, 0.0);
    }
}
