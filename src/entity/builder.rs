//! Fluent builder for [`Entity`].

use std::collections::BTreeMap;

use thiserror::Error;

use crate::emotion::EmotionalState;
use crate::entity::{Entity, FeatureSet};
use crate::math::Vec2;
use crate::memory::DEFAULT_CAPACITY;
use crate::types::EntityId;
use crate::world::material::MaterialSpec;

/// Error returned when an entity cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityBuildError {
    /// No id was provided.
    #[error("entity requires an id")]
    MissingId,
    /// No material was provided.
    #[error("entity requires a material")]
    MissingMaterial,
}

/// Builder for [`Entity`].
///
/// Defaults: the standard feature loadout, neutral emotion, zero
/// velocity, not autonomous, language taken from the material's
/// language profile (or `"en"`).
///
/// # Examples
///
/// ```
/// use vivarium::entity::{EntityBuilder, Feature};
/// use vivarium::types::{EntityId, MaterialId};
/// use vivarium::world::material::MaterialSpec;
///
/// let material = MaterialSpec::new(MaterialId::new("mat.moss").unwrap(), "Moss");
/// let entity = EntityBuilder::new()
///     .id(EntityId::new("e1").unwrap())
///     .material(material)
///     .position(10.0, 20.0)
///     .autonomous(true)
///     .with_feature(Feature::Learning)
///     .build()
///     .unwrap();
///
/// assert!(entity.autonomous());
/// assert!(entity.learning().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    material: Option<MaterialSpec>,
    pos: Vec2,
    vel: Vec2,
    features: Option<FeatureSet>,
    emotion: Option<EmotionalState>,
    memory_capacity: Option<usize>,
    native_language: Option<String>,
    language_weights: Option<BTreeMap<String, f32>>,
    autonomous: bool,
    temperature: Option<f32>,
    humidity: Option<f32>,
}

impl EntityBuilder {
    /// Creates a builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        EntityBuilder::default()
    }

    /// Sets the entity id.
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the material.
    #[must_use]
    pub fn material(mut self, material: MaterialSpec) -> Self {
        self.material = Some(material);
        self
    }

    /// Sets the starting position.
    #[must_use]
    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.pos = Vec2::new(x, y);
        self
    }

    /// Sets the starting velocity.
    #[must_use]
    pub fn velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vel = Vec2::new(vx, vy);
        self
    }

    /// Replaces the whole feature set.
    #[must_use]
    pub fn features(mut self, features: FeatureSet) -> Self {
        self.features = Some(features);
        self
    }

    /// Enables one extra feature on top of the current set.
    #[must_use]
    pub fn with_feature(mut self, feature: crate::entity::Feature) -> Self {
        let set = self.features.unwrap_or_else(FeatureSet::standard);
        self.features = Some(set.with(feature));
        self
    }

    /// Disables one feature from the current set.
    #[must_use]
    pub fn without_feature(mut self, feature: crate::entity::Feature) -> Self {
        let set = self.features.unwrap_or_else(FeatureSet::standard);
        self.features = Some(set.without(feature));
        self
    }

    /// Sets the initial emotional state.
    #[must_use]
    pub fn emotion(mut self, emotion: EmotionalState) -> Self {
        self.emotion = Some(emotion);
        self
    }

    /// Sets the memory buffer capacity.
    #[must_use]
    pub fn memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = Some(capacity);
        self
    }

    /// Overrides the native language.
    #[must_use]
    pub fn native_language(mut self, lang: impl Into<String>) -> Self {
        self.native_language = Some(lang.into());
        self
    }

    /// Overrides the language weights.
    #[must_use]
    pub fn language_weights(mut self, weights: BTreeMap<String, f32>) -> Self {
        self.language_weights = Some(weights);
        self
    }

    /// Sets autonomy.
    #[must_use]
    pub fn autonomous(mut self, autonomous: bool) -> Self {
        self.autonomous = autonomous;
        self
    }

    /// Sets the starting body temperature.
    #[must_use]
    pub fn temperature(mut self, kelvin: f32) -> Self {
        self.temperature = Some(kelvin);
        self
    }

    /// Sets the starting humidity.
    #[must_use]
    pub fn humidity(mut self, humidity: f32) -> Self {
        self.humidity = Some(humidity);
        self
    }

    /// Builds the entity.
    ///
    /// # Errors
    ///
    /// Returns an error when the id or material is missing.
    pub fn build(self) -> Result<Entity, EntityBuildError> {
        let id = self.id.ok_or(EntityBuildError::MissingId)?;
        let material = self.material.ok_or(EntityBuildError::MissingMaterial)?;

        let native_language = self
            .native_language
            .or_else(|| material.language.as_ref().map(|l| l.native.clone()))
            .unwrap_or_else(|| "en".to_string());
        let language_weights = self
            .language_weights
            .or_else(|| material.language.as_ref().map(|l| l.weights.clone()))
            .unwrap_or_default();

        Ok(Entity::from_parts(
            id,
            material,
            self.pos,
            self.vel,
            self.features.unwrap_or_else(FeatureSet::standard),
            self.emotion,
            self.memory_capacity.unwrap_or(DEFAULT_CAPACITY),
            native_language,
            language_weights,
            self.autonomous,
            self.temperature,
            self.humidity,
        ))
    }
}
