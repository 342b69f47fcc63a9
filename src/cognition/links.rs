//! Weighted cognitive links between entities.
//!
//! A link is a directed edge along which signals and memories can flow
//! under trust gates. Each entity owns its outgoing edges keyed by
//! target id; there is no shared edge object. Bidirectional formation
//! is a world-level operation that installs mirror links on both
//! endpoints, whose strengths may then diverge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// A directed weighted edge to another entity. The target id is the
/// key of the owning map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveLink {
    /// Edge weight, 0 to 1.
    pub strength: f32,
    /// World time of the latest reinforcement.
    pub last_reinforced: f64,
    /// Whether this edge was formed as half of a bidirectional pair.
    pub bidirectional: bool,
}

/// An entity's outgoing cognitive links.
///
/// # Examples
///
/// ```
/// use vivarium::cognition::CognitiveLinkMap;
/// use vivarium::types::EntityId;
///
/// let target = EntityId::new("b").unwrap();
/// let mut links = CognitiveLinkMap::new();
/// links.connect(target.clone(), 0.4, false, 0.0);
/// links.reinforce(&target, 0.3, 1.0);
/// assert!((links.strength_of(&target) - 0.7).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CognitiveLinkMap {
    links: BTreeMap<EntityId, CognitiveLink>,
}

impl CognitiveLinkMap {
    /// Creates an empty link map.
    #[must_use]
    pub fn new() -> Self {
        CognitiveLinkMap::default()
    }

    /// Returns the number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true when no links exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Creates or updates a link to `target`.
    pub fn connect(&mut self, target: EntityId, strength: f32, bidirectional: bool, now: f64) {
        let strength = if strength.is_nan() {
            0.0
        } else {
            strength.clamp(0.0, 1.0)
        };
        self.links.insert(
            target,
            CognitiveLink {
                strength,
                last_reinforced: now,
                bidirectional,
            },
        );
    }

    /// Strengthens an existing link, saturating at 1. No-op when the
    /// link does not exist.
    pub fn reinforce(&mut self, target: &EntityId, amount: f32, now: f64) {
        if let Some(link) = self.links.get_mut(target) {
            if amount.is_finite() {
                link.strength = (link.strength + amount).clamp(0.0, 1.0);
                link.last_reinforced = now;
            }
        }
    }

    /// Weakens every link by `rate * dt`, removing links that reach
    /// zero. Returns the targets of removed links.
    pub fn decay(&mut self, dt: f64, rate: f32) -> Vec<EntityId> {
        let loss = rate * dt as f32;
        if loss <= 0.0 {
            return Vec::new();
        }
        for link in self.links.values_mut() {
            link.strength -= loss;
        }
        let dropped: Vec<EntityId> = self
            .links
            .iter()
            .filter(|(_, l)| l.strength <= 0.0)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &dropped {
            self.links.remove(id);
        }
        dropped
    }

    /// Returns whether a link to `target` exists.
    #[must_use]
    pub fn is_connected(&self, target: &EntityId) -> bool {
        self.links.contains_key(target)
    }

    /// Returns the strength of the link to `target`, or 0.
    #[must_use]
    pub fn strength_of(&self, target: &EntityId) -> f32 {
        self.links.get(target).map_or(0.0, |l| l.strength)
    }

    /// Returns the link to `target`, if any.
    #[must_use]
    pub fn get(&self, target: &EntityId) -> Option<&CognitiveLink> {
        self.links.get(target)
    }

    /// Returns connected target ids in key order.
    #[must_use]
    pub fn connected_ids(&self) -> Vec<EntityId> {
        self.links.keys().cloned().collect()
    }

    /// Removes the link to `target`, returning it if present.
    pub fn disconnect(&mut self, target: &EntityId) -> Option<CognitiveLink> {
        self.links.remove(target)
    }

    /// Updates the bidirectional marker on an existing link. Used by
    /// the kernel when a mirror link disappears.
    pub fn set_bidirectional(&mut self, target: &EntityId, bidirectional: bool) {
        if let Some(link) = self.links.get_mut(target) {
            link.bidirectional = bidirectional;
        }
    }

    /// Iterates links in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &CognitiveLink)> {
        self.links.iter()
    }
}
