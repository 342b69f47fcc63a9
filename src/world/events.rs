//! The bounded world event log.
//!
//! Every notable kernel occurrence (spawn, removal, collision, field
//! spawn, sync moment, blocked sync, stats recomputation) appends an
//! event. The log is append-only and bounded; the oldest entries fall
//! off first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// One logged world occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    /// World time of the event.
    pub time: f64,
    /// Event kind, e.g. `"entity_collision"` or `"world-stats"`.
    pub kind: String,
    /// Primary entity, when one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityId>,
    /// Structured payload.
    pub data: serde_json::Value,
}

/// Append-only bounded log of world events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    capacity: usize,
    events: VecDeque<WorldEvent>,
}

impl EventLog {
    /// Creates a log with the given capacity (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        EventLog {
            capacity: capacity.max(1),
            events: VecDeque::new(),
        }
    }

    /// Appends an event, dropping the oldest at capacity.
    pub fn push(&mut self, event: WorldEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Convenience append.
    pub fn record(
        &mut self,
        time: f64,
        kind: impl Into<String>,
        entity: Option<EntityId>,
        data: serde_json::Value,
    ) {
        self.push(WorldEvent {
            time,
            kind: kind.into(),
            entity,
            data,
        });
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true when no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates events oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &WorldEvent> {
        self.events.iter()
    }

    /// Events of one kind, oldest first.
    #[must_use]
    pub fn of_kind(&self, kind: &str) -> Vec<&WorldEvent> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }

    /// The most recent event, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&WorldEvent> {
        self.events.back()
    }

    /// Replaces the contents wholesale (restore path).
    pub fn replace(&mut self, events: Vec<WorldEvent>) {
        self.events = events.into();
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }
}
