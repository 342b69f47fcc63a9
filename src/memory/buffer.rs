//! Bounded episodic memory buffer with FIFO eviction.
//!
//! The buffer holds an entity's recent salient events. New memories
//! push the oldest out once capacity is reached; per-tick decay erodes
//! salience linearly and `forget` culls anything below a threshold.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::memory::{Memory, MemoryKind, MemorySubject};

/// Default capacity of an entity's memory buffer.
pub const DEFAULT_CAPACITY: usize = 50;

/// Criteria for [`MemoryBuffer::recall`]. All fields are optional; a
/// memory must satisfy every criterion that is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecallFilter {
    /// Match memories of this kind.
    pub kind: Option<MemoryKind>,
    /// Match memories about this subject.
    pub subject: Option<MemorySubject>,
    /// Match memories with at least this salience.
    pub min_salience: Option<f32>,
    /// Match memories formed at or after this world time.
    pub since: Option<f64>,
    /// Match memories formed at or before this world time.
    pub until: Option<f64>,
}

impl RecallFilter {
    /// Creates an empty filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        RecallFilter::default()
    }

    /// Filters by kind.
    #[must_use]
    pub fn with_kind(mut self, kind: MemoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Filters by subject.
    #[must_use]
    pub fn with_subject(mut self, subject: MemorySubject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Filters by minimum salience.
    #[must_use]
    pub fn with_min_salience(mut self, min_salience: f32) -> Self {
        self.min_salience = Some(min_salience);
        self
    }

    /// Filters by a time window (inclusive at both ends).
    #[must_use]
    pub fn with_window(mut self, since: f64, until: f64) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    /// Checks whether a memory matches this filter.
    #[must_use]
    pub fn matches(&self, memory: &Memory) -> bool {
        if let Some(ref kind) = self.kind {
            if &memory.kind != kind {
                return false;
            }
        }
        if let Some(ref subject) = self.subject {
            if &memory.subject != subject {
                return false;
            }
        }
        if let Some(min) = self.min_salience {
            if memory.salience < min {
                return false;
            }
        }
        if let Some(since) = self.since {
            if memory.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if memory.timestamp > until {
                return false;
            }
        }
        true
    }
}

/// Ring buffer of timestamped salient events.
///
/// Single-owner: the holding entity is the only mutator.
///
/// # Examples
///
/// ```
/// use vivarium::memory::{Memory, MemoryBuffer, MemoryContent, MemoryKind, MemorySubject};
///
/// let mut buffer = MemoryBuffer::new(2);
/// for t in 0..3 {
///     buffer.add(Memory::new(
///         t as f64,
///         MemoryKind::Observation,
///         MemorySubject::World,
///         MemoryContent::default(),
///         0.5,
///     ));
/// }
/// // Oldest was evicted.
/// assert_eq!(buffer.len(), 2);
/// assert_eq!(buffer.iter().next().unwrap().timestamp, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryBuffer {
    capacity: usize,
    entries: VecDeque<Memory>,
}

impl MemoryBuffer {
    /// Creates a buffer with the given capacity (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        MemoryBuffer {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Returns the declared capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of stored memories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no memories are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a memory, evicting the oldest entry at capacity.
    pub fn add(&mut self, memory: Memory) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(memory);
    }

    /// Iterates memories oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Memory> {
        self.entries.iter()
    }

    /// Returns the `count` most recent memories, newest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&Memory> {
        self.entries.iter().rev().take(count).collect()
    }

    /// Returns memories matching the filter, oldest first.
    #[must_use]
    pub fn recall(&self, filter: &RecallFilter) -> Vec<&Memory> {
        self.entries.iter().filter(|m| filter.matches(m)).collect()
    }

    /// Aggregate memory strength toward a subject:
    /// `min(1, sum of matching salience / capacity)`.
    #[must_use]
    pub fn strength_of(&self, subject: &MemorySubject) -> f32 {
        let sum: f32 = self
            .entries
            .iter()
            .filter(|m| &m.subject == subject)
            .map(|m| m.salience)
            .sum();
        (sum / self.capacity as f32).min(1.0)
    }

    /// Reduces every memory's salience by `rate * dt`, clamped at zero.
    pub fn decay(&mut self, dt: f64, rate: f32) {
        let loss = rate * dt as f32;
        if loss <= 0.0 {
            return;
        }
        for memory in &mut self.entries {
            memory.salience = (memory.salience - loss).max(0.0);
        }
    }

    /// Removes memories whose salience fell below `threshold`.
    ///
    /// Returns the number removed. Memories exactly at the threshold
    /// survive.
    pub fn forget(&mut self, threshold: f32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|m| m.salience >= threshold);
        before - self.entries.len()
    }
}

impl Default for MemoryBuffer {
    fn default() -> Self {
        MemoryBuffer::new(DEFAULT_CAPACITY)
    }
}
