//! Transient radial influence zones.
//!
//! A field is spawned from a spec, lives for a fixed duration, and each
//! tick applies its *abstract effects* to every entity inside its
//! radius. Effects are abstract: a headless world observes
//! exactly the same emotional and relational consequences as a rendered
//! one. Field strength fades from 1.0 at spawn to 0.5 at expiry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionDelta;
use crate::entity::Entity;
use crate::math::{clamp01, Vec2};
use crate::types::{EntityId, FieldSpecId};

/// Per-tick emotion effect scale.
const EMOTION_EFFECT_RATE: f32 = 0.01;

/// Per-tick relationship effect scale.
const RELATIONSHIP_EFFECT_RATE: f32 = 0.001;

/// Per-tick link reinforcement scale.
const LINK_EFFECT_RATE: f32 = 0.001;

/// Channel scalars a field can carry.
///
/// Channels are plain scalars, not clamped: a channel above 1 simply
/// applies a stronger per-tick nudge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldEffects {
    /// Floor for affected entities' opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Valence nudge channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f32>,
    /// Arousal nudge channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arousal: Option<f32>,
    /// Dominance nudge channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominance: Option<f32>,
    /// Relationship boost channel toward `source_entity`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_boost: Option<f32>,
    /// Link reinforcement channel toward `source_entity`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_strength: Option<f32>,
    /// Entity the relational channels point at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_entity: Option<EntityId>,
}

/// Declarative description of a field kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Registry key, e.g. `field.sync_moment`.
    pub id: FieldSpecId,
    /// Influence radius in pixels.
    pub radius: f32,
    /// Lifetime in milliseconds.
    pub duration_ms: f64,
    /// Effect channels.
    pub effects: FieldEffects,
}

impl FieldSpec {
    /// The builtin sync-moment field: a positive bloom that nudges
    /// valence and arousal and boosts the relationship toward its
    /// source over a five second lifetime.
    #[must_use]
    pub fn sync_moment() -> Self {
        FieldSpec {
            id: FieldSpecId::new("field.sync_moment").expect("static id"),
            radius: 200.0,
            duration_ms: 5000.0,
            effects: FieldEffects {
                valence: Some(0.3),
                arousal: Some(0.1),
                relationship_boost: Some(1.4),
                ..FieldEffects::default()
            },
        }
    }

    /// The builtin longing field: a faint melancholic pull spawned when
    /// a familiar peer has been absent too long.
    #[must_use]
    pub fn longing() -> Self {
        FieldSpec {
            id: FieldSpecId::new("field.longing").expect("static id"),
            radius: 120.0,
            duration_ms: 4000.0,
            effects: FieldEffects {
                valence: Some(-0.1),
                arousal: Some(0.05),
                ..FieldEffects::default()
            },
        }
    }
}

/// Registry of field specs, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpecRegistry {
    specs: BTreeMap<FieldSpecId, FieldSpec>,
}

impl FieldSpecRegistry {
    /// Creates a registry preloaded with the builtin specs.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = FieldSpecRegistry::default();
        registry.register(FieldSpec::sync_moment());
        registry.register(FieldSpec::longing());
        registry
    }

    /// Registers a spec, replacing any previous one with the same id.
    pub fn register(&mut self, spec: FieldSpec) {
        self.specs.insert(spec.id.clone(), spec);
    }

    /// Looks up a spec by id.
    #[must_use]
    pub fn get(&self, id: &FieldSpecId) -> Option<&FieldSpec> {
        self.specs.get(id)
    }

    /// Returns whether a spec is registered.
    #[must_use]
    pub fn contains(&self, id: &FieldSpecId) -> bool {
        self.specs.contains_key(id)
    }

    /// Number of registered specs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true when the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// A live field instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Spec this field was spawned from.
    pub spec_id: FieldSpecId,
    /// Center of influence.
    pub origin: Vec2,
    /// Milliseconds since spawn.
    pub elapsed_ms: f64,
    /// Lifetime in milliseconds.
    pub duration_ms: f64,
    /// Influence radius in pixels.
    pub radius: f32,
    /// Effect channels, including any per-spawn source override.
    pub effects: FieldEffects,
    expired: bool,
}

impl Field {
    /// Instantiates a field from a spec at an origin.
    #[must_use]
    pub fn from_spec(spec: &FieldSpec, origin: Vec2) -> Self {
        Field {
            spec_id: spec.id.clone(),
            origin,
            elapsed_ms: 0.0,
            duration_ms: spec.duration_ms,
            radius: spec.radius,
            effects: spec.effects.clone(),
            expired: false,
        }
    }

    /// Sets the source entity the relational channels point at.
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.effects.source_entity = Some(source);
        self
    }

    /// Returns whether the field has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub(crate) fn set_elapsed(&mut self, elapsed_ms: f64) {
        self.elapsed_ms = elapsed_ms;
        if elapsed_ms >= self.duration_ms {
            self.expired = true;
        }
    }

    pub(crate) fn mark_expired(&mut self) {
        self.expired = true;
    }

    /// Current field strength: fades linearly from 1.0 to 0.5 over the
    /// lifetime.
    #[must_use]
    pub fn strength(&self) -> f32 {
        (1.0 - 0.5 * (self.elapsed_ms / self.duration_ms)) as f32
    }

    /// Advances the field and applies abstract effects to entities in
    /// radius. Marks the field expired once `elapsed >= duration`.
    pub fn update(&mut self, dt: f64, now: f64, entities: &mut [Entity]) {
        self.elapsed_ms += dt * 1000.0;
        if self.elapsed_ms >= self.duration_ms {
            self.expired = true;
            return;
        }
        let field_strength = self.strength();

        for entity in entities.iter_mut() {
            let dist = entity.pos.distance_to(self.origin);
            if dist > self.radius {
                continue;
            }
            let intensity = field_strength * (1.0 - dist / self.radius);
            self.apply_to(entity, intensity, now);
        }
    }

    fn apply_to(&self, entity: &mut Entity, intensity: f32, now: f64) {
        if let Some(opacity) = self.effects.opacity {
            entity.opacity = entity.opacity.max(clamp01(opacity));
        }

        let valence = self.effects.valence.unwrap_or(0.0);
        let arousal = self.effects.arousal.unwrap_or(0.0);
        let dominance = self.effects.dominance.unwrap_or(0.0);
        if valence != 0.0 || arousal != 0.0 || dominance != 0.0 {
            entity.feel(&EmotionDelta::new(
                valence * intensity * EMOTION_EFFECT_RATE,
                arousal * intensity * EMOTION_EFFECT_RATE,
                dominance * intensity * EMOTION_EFFECT_RATE,
            ));
        }

        if let Some(source) = self.effects.source_entity.clone() {
            if &source != entity.id() {
                if let Some(boost) = self.effects.relationship_boost {
                    if let Some(relationships) = entity.relationships_mut() {
                        if let Some(rel) = relationships.get_mut(&source) {
                            rel.boost(boost * intensity * RELATIONSHIP_EFFECT_RATE);
                        }
                    }
                }
                if let Some(link_strength) = self.effects.link_strength {
                    let reinforcement = link_strength * intensity * LINK_EFFECT_RATE;
                    if let Some(links) = entity.cognitive_links_mut() {
                        if links.is_connected(&source) {
                            links.reinforce(&source, reinforcement, now);
                        }
                    }
                }
            }
        }
    }
}
