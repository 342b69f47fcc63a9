//! Entity feature flags.
//!
//! Each flag gates an optional sub-aggregate: an absent flag means the
//! corresponding component is `None` and its operations are no-ops.
//! Flags are explicit booleans rather than nullable fields so that a
//! snapshot states exactly which components an entity carries.

use serde::{Deserialize, Serialize};

/// One toggleable capability of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Memory,
    Learning,
    Relationships,
    Skills,
    Consolidation,
    Emotion,
    Intent,
    CognitiveLinks,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Feature; 8] = [
        Feature::Memory,
        Feature::Learning,
        Feature::Relationships,
        Feature::Skills,
        Feature::Consolidation,
        Feature::Emotion,
        Feature::Intent,
        Feature::CognitiveLinks,
    ];
}

/// The set of features an entity carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureSet {
    pub memory: bool,
    pub learning: bool,
    pub relationships: bool,
    pub skills: bool,
    pub consolidation: bool,
    pub emotion: bool,
    pub intent: bool,
    pub cognitive_links: bool,
}

impl FeatureSet {
    /// No features.
    #[must_use]
    pub fn none() -> Self {
        FeatureSet::default()
    }

    /// Every feature.
    #[must_use]
    pub fn all() -> Self {
        FeatureSet {
            memory: true,
            learning: true,
            relationships: true,
            skills: true,
            consolidation: true,
            emotion: true,
            intent: true,
            cognitive_links: true,
        }
    }

    /// The usual living-entity loadout: memory, emotion, intent,
    /// relationships and cognitive links.
    #[must_use]
    pub fn standard() -> Self {
        FeatureSet {
            memory: true,
            learning: false,
            relationships: true,
            skills: false,
            consolidation: false,
            emotion: true,
            intent: true,
            cognitive_links: true,
        }
    }

    /// Returns whether a feature is enabled.
    #[must_use]
    pub fn contains(&self, feature: Feature) -> bool {
        match feature {
            Feature::Memory => self.memory,
            Feature::Learning => self.learning,
            Feature::Relationships => self.relationships,
            Feature::Skills => self.skills,
            Feature::Consolidation => self.consolidation,
            Feature::Emotion => self.emotion,
            Feature::Intent => self.intent,
            Feature::CognitiveLinks => self.cognitive_links,
        }
    }

    /// Enables or disables a feature.
    pub fn set(&mut self, feature: Feature, enabled: bool) {
        match feature {
            Feature::Memory => self.memory = enabled,
            Feature::Learning => self.learning = enabled,
            Feature::Relationships => self.relationships = enabled,
            Feature::Skills => self.skills = enabled,
            Feature::Consolidation => self.consolidation = enabled,
            Feature::Emotion => self.emotion = enabled,
            Feature::Intent => self.intent = enabled,
            Feature::CognitiveLinks => self.cognitive_links = enabled,
        }
    }

    /// Builder-style enable.
    #[must_use]
    pub fn with(mut self, feature: Feature) -> Self {
        self.set(feature, true);
        self
    }

    /// Builder-style disable.
    #[must_use]
    pub fn without(mut self, feature: Feature) -> Self {
        self.set(feature, false);
        self
    }
}
