//! A single episodic memory record.
//!
//! Memories capture a salient event along with when it happened, what
//! kind of event it was, who it concerned, and an arbitrary payload.
//! Salience is the currency of the whole memory subsystem: decay erodes
//! it, `forget` culls on it, and crystallization sums it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Default salience assigned when a caller hands in NaN.
pub const DEFAULT_SALIENCE: f32 = 0.5;

/// Classification of a memory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Spawn,
    Interaction,
    Emotion,
    Observation,
    FieldSpawn,
    IntentChange,
    /// Application-defined kind.
    Custom(String),
}

/// Who or what a memory is about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySubject {
    /// Another entity, by id.
    Entity(EntityId),
    /// The remembering entity itself.
    #[serde(rename = "self")]
    Own,
    /// The world at large.
    World,
}

/// Payload carried by a memory.
///
/// A small set of typed alternatives plus an opaque escape hatch, so
/// serialization stays stable while hosts can stash anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryContent {
    /// Free text.
    Text(String),
    /// Flat key/value pairs.
    KeyValue(BTreeMap<String, String>),
    /// Structured JSON record.
    Record(serde_json::Value),
    /// Opaque bytes.
    Blob(Vec<u8>),
}

impl MemoryContent {
    /// Convenience constructor for text payloads.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        MemoryContent::Text(text.into())
    }
}

impl Default for MemoryContent {
    fn default() -> Self {
        MemoryContent::Text(String::new())
    }
}

/// A timestamped salient event held in a [`MemoryBuffer`].
///
/// [`MemoryBuffer`]: crate::memory::MemoryBuffer
///
/// # Examples
///
/// ```
/// use vivarium::memory::{Memory, MemoryContent, MemoryKind, MemorySubject};
///
/// let memory = Memory::new(
///     12.5,
///     MemoryKind::Observation,
///     MemorySubject::World,
///     MemoryContent::text("a field bloomed nearby"),
///     0.7,
/// );
/// assert!((memory.salience - 0.7).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// World time at which the memory was formed, in seconds.
    pub timestamp: f64,
    /// Classification of the remembered event.
    pub kind: MemoryKind,
    /// Who or what the memory concerns.
    pub subject: MemorySubject,
    /// Payload.
    pub content: MemoryContent,
    /// Importance for recall and consolidation, 0 to 1.
    pub salience: f32,
}

impl Memory {
    /// Creates a memory, clamping salience to `[0, 1]`.
    ///
    /// NaN salience is replaced by [`DEFAULT_SALIENCE`] and logged.
    #[must_use]
    pub fn new(
        timestamp: f64,
        kind: MemoryKind,
        subject: MemorySubject,
        content: MemoryContent,
        salience: f32,
    ) -> Self {
        let salience = if salience.is_nan() {
            tracing::debug!("NaN salience replaced with default");
            DEFAULT_SALIENCE
        } else {
            salience.clamp(0.0, 1.0)
        };
        Memory {
            timestamp,
            kind,
            subject,
            content,
            salience,
        }
    }

    /// Returns whether the memory concerns the given entity.
    #[must_use]
    pub fn concerns(&self, id: &EntityId) -> bool {
        matches!(&self.subject, MemorySubject::Entity(subject) if subject == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_salience_becomes_default() {
        let memory = Memory::new(
            0.0,
            MemoryKind::Emotion,
            MemorySubject::Own,
            MemoryContent::default(),
            f32::NAN,
        );
        assert!((memory.salience - DEFAULT_SALIENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn salience_is_clamped() {
        let high = Memory::new(
            0.0,
            MemoryKind::Spawn,
            MemorySubject::World,
            MemoryContent::default(),
            3.0,
        );
        assert_eq!(high.salience, 1.0);

        let low = Memory::new(
            0.0,
            MemoryKind::Spawn,
            MemorySubject::World,
            MemoryContent::default(),
            -0.5,
        );
        assert_eq!(low.salience, 0.0);
    }

    #[test]
    fn concerns_matches_entity_subject() {
        let id = EntityId::new("a").unwrap();
        let other = EntityId::new("b").unwrap();
        let memory = Memory::new(
            1.0,
            MemoryKind::Interaction,
            MemorySubject::Entity(id.clone()),
            MemoryContent::default(),
            0.5,
        );
        assert!(memory.concerns(&id));
        assert!(!memory.concerns(&other));
    }

    #[test]
    fn concerns_false_for_self_and_world() {
        let id = EntityId::new("a").unwrap();
        let own = Memory::new(
            1.0,
            MemoryKind::Emotion,
            MemorySubject::Own,
            MemoryContent::default(),
            0.5,
        );
        assert!(!own.concerns(&id));
    }

    #[test]
    fn kinds_order_deterministically() {
        let mut kinds = vec![
            MemoryKind::Custom("zebra".into()),
            MemoryKind::Spawn,
            MemoryKind::Interaction,
        ];
        kinds.sort();
        let mut again = kinds.clone();
        again.sort();
        assert_eq!(kinds, again);
    }
}
