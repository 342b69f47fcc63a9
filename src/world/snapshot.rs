//! The persisted world file.
//!
//! A snapshot is a versioned JSON document carrying everything needed
//! to rebuild a world, except the registries (materials and field
//! specs), which the host must re-supply at restore time. Collections
//! serialize through ordered containers and fixed struct field order,
//! so equal worlds produce byte-equal documents, the basis of both the
//! round-trip law and the determinism contract.
//!
//! The kernel never touches the wall clock; `with_wall_clock_stamp` is
//! a boundary helper for hosts that want a human-readable save stamp,
//! and stamped documents are deliberately outside the byte-equality
//! laws.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionalState;
use crate::entity::{Entity, EntityBuilder, FeatureSet};
use crate::error::WorldError;
use crate::intent::IntentStack;
use crate::math::Vec2;
use crate::memory::{MemoryBuffer, MemoryCrystallizer, MemoryLog};
use crate::cognition::{CognitiveLinkMap, LearningSystem, SkillSystem};
use crate::relationship::{Relationship, TrustSystem};
use crate::types::{EntityId, FieldSpecId, MaterialId};
use crate::world::environment::EnvironmentState;
use crate::world::events::WorldEvent;
use crate::world::field::{Field, FieldSpecRegistry};
use crate::world::material::MaterialRegistry;
use crate::world::weather::WeatherState;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted form of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub material_id: MaterialId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub age: f64,
    pub entropy: f32,
    pub energy: f32,
    pub opacity: f32,
    pub features: FeatureSet,
    pub autonomous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionalState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<IntentStack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryBuffer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BTreeMap<EntityId, Relationship>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_links: Option<CognitiveLinkMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning: Option<LearningSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<SkillSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crystals: Option<MemoryCrystallizer>,
    pub memory_log: MemoryLog,
    pub native_language: String,
    pub language_weights: BTreeMap<String, f32>,
    pub trigger_context: BTreeMap<String, serde_json::Value>,
}

impl EntitySnapshot {
    /// Captures an entity's persistent state.
    #[must_use]
    pub fn capture(entity: &Entity) -> Self {
        EntitySnapshot {
            id: entity.id().clone(),
            material_id: entity.material_id().clone(),
            x: entity.pos.x,
            y: entity.pos.y,
            vx: entity.vel.x,
            vy: entity.vel.y,
            age: entity.age(),
            entropy: entity.entropy,
            energy: entity.energy,
            opacity: entity.opacity,
            features: *entity.features(),
            autonomous: entity.autonomous(),
            temperature: entity.temperature,
            humidity: entity.humidity,
            emotion: entity.emotion().copied(),
            intents: entity.intents().cloned(),
            memory: entity.memory().cloned(),
            relationships: entity.relationships().cloned(),
            cognitive_links: entity.cognitive_links().cloned(),
            learning: entity.learning().cloned(),
            skills: entity.skills().cloned(),
            crystals: entity.crystallizer().cloned(),
            memory_log: entity.memory_log().clone(),
            native_language: entity.native_language().to_string(),
            language_weights: entity.language_weights().clone(),
            trigger_context: entity.trigger_context().clone(),
        }
    }

    /// Rebuilds the entity against a supplied material registry.
    ///
    /// # Errors
    ///
    /// Fails when the entity's material is not registered.
    pub fn restore(&self, materials: &MaterialRegistry) -> Result<Entity, WorldError> {
        let material = materials
            .get(&self.material_id)
            .ok_or_else(|| WorldError::UnknownMaterial(self.material_id.clone()))?
            .clone();

        let mut entity = EntityBuilder::new()
            .id(self.id.clone())
            .material(material)
            .position(self.x, self.y)
            .velocity(self.vx, self.vy)
            .features(self.features)
            .autonomous(self.autonomous)
            .native_language(self.native_language.clone())
            .language_weights(self.language_weights.clone())
            .build()?;

        entity.set_age(self.age);
        entity.entropy = self.entropy;
        entity.energy = self.energy;
        entity.opacity = self.opacity;
        entity.temperature = self.temperature;
        entity.humidity = self.humidity;
        entity.set_emotion_state(self.emotion);
        entity.set_intent_stack(self.intents.clone());
        entity.set_memory_buffer(self.memory.clone());
        entity.set_relationship_map(self.relationships.clone());
        entity.set_link_map(self.cognitive_links.clone());
        entity.set_learning_system(self.learning.clone());
        entity.set_skill_system(self.skills.clone());
        entity.set_crystallizer(self.crystals.clone());
        entity.set_memory_log(self.memory_log.clone());
        entity.set_trigger_context(self.trigger_context.clone());
        Ok(entity)
    }
}

/// Persisted form of one live field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub spec_id: FieldSpecId,
    pub x: f32,
    pub y: f32,
    pub elapsed_ms: f64,
    pub expired: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_entity: Option<EntityId>,
}

impl FieldSnapshot {
    /// Captures a field.
    #[must_use]
    pub fn capture(field: &Field) -> Self {
        FieldSnapshot {
            spec_id: field.spec_id.clone(),
            x: field.origin.x,
            y: field.origin.y,
            elapsed_ms: field.elapsed_ms,
            expired: field.is_expired(),
            source_entity: field.effects.source_entity.clone(),
        }
    }

    /// Rebuilds the field against a supplied field-spec registry.
    ///
    /// # Errors
    ///
    /// Fails when the field's spec is not registered.
    pub fn restore(&self, specs: &FieldSpecRegistry) -> Result<Field, WorldError> {
        let spec = specs
            .get(&self.spec_id)
            .ok_or_else(|| WorldError::UnknownFieldSpec(self.spec_id.clone()))?;
        let mut field = Field::from_spec(spec, Vec2::new(self.x, self.y));
        if let Some(source) = self.source_entity.clone() {
            field = field.with_source(source);
        }
        field.set_elapsed(self.elapsed_ms);
        if self.expired {
            field.mark_expired();
        }
        Ok(field)
    }
}

/// The persisted world document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldFile {
    /// Format version.
    pub version: u32,
    /// PRNG seed the world was created with.
    pub seed: u64,
    /// Simulated time in seconds.
    pub world_time: f64,
    /// Ticks executed.
    pub tick_count: u64,
    /// Optional wall-clock stamp; never set by the kernel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    /// Entities in registry insertion order.
    pub entities: Vec<EntitySnapshot>,
    /// Live fields.
    pub fields: Vec<FieldSnapshot>,
    /// Retained world events.
    pub event_log: Vec<WorldEvent>,
    /// Trust tables.
    pub trust: TrustSystem,
    /// Weather process state.
    pub weather: WeatherState,
    /// Environment base state.
    pub environment: EnvironmentState,
    /// World broadcast context.
    pub broadcast_context: BTreeMap<String, serde_json::Value>,
}

impl WorldFile {
    /// Serializes the document to compact JSON.
    ///
    /// # Errors
    ///
    /// Fails only on serializer errors, which indicate a bug.
    pub fn to_json(&self) -> Result<String, WorldError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a document from JSON.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or an unsupported version.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let file: WorldFile = serde_json::from_str(json)?;
        if file.version > SNAPSHOT_VERSION {
            return Err(WorldError::UnsupportedSnapshotVersion(file.version));
        }
        Ok(file)
    }

    /// Adds a wall-clock save stamp. Boundary helper only; stamped
    /// documents are excluded from the byte-equality laws.
    #[must_use]
    pub fn with_wall_clock_stamp(mut self) -> Self {
        self.saved_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MaterialId;
    use crate::world::material::MaterialSpec;

    fn registry() -> MaterialRegistry {
        let mut materials = MaterialRegistry::new();
        materials.register(MaterialSpec::new(
            MaterialId::new("mat.test").unwrap(),
            "Test",
        ));
        materials
    }

    fn entity() -> Entity {
        EntityBuilder::new()
            .id(EntityId::new("e1").unwrap())
            .material(MaterialSpec::new(
                MaterialId::new("mat.test").unwrap(),
                "Test",
            ))
            .position(12.0, 34.0)
            .velocity(1.0, -2.0)
            .autonomous(true)
            .build()
            .unwrap()
    }

    #[test]
    fn entity_capture_restore_capture_is_identical() {
        let mut original = entity();
        original.entropy = 0.7;
        original.feel(&crate::emotion::EmotionDelta::new(0.3, 0.1, 0.0));
        original.remember(
            crate::memory::MemoryKind::Observation,
            crate::memory::MemorySubject::World,
            crate::memory::MemoryContent::text("something"),
            0.6,
            1.0,
        );

        let first = EntitySnapshot::capture(&original);
        let restored = first.restore(&registry()).unwrap();
        let second = EntitySnapshot::capture(&restored);
        assert_eq!(first, second);
    }

    #[test]
    fn entity_restore_fails_without_material() {
        let snapshot = EntitySnapshot::capture(&entity());
        let empty = MaterialRegistry::new();
        assert!(matches!(
            snapshot.restore(&empty),
            Err(WorldError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn field_capture_restore_roundtrip() {
        let specs = FieldSpecRegistry::with_builtins();
        let spec = specs
            .get(&FieldSpecId::new("field.sync_moment").unwrap())
            .unwrap();
        let mut field = Field::from_spec(spec, Vec2::new(50.0, 60.0))
            .with_source(EntityId::new("src").unwrap());
        field.set_elapsed(1200.0);

        let snapshot = FieldSnapshot::capture(&field);
        let restored = snapshot.restore(&specs).unwrap();
        assert_eq!(FieldSnapshot::capture(&restored), snapshot);
        assert!(!restored.is_expired());
    }

    #[test]
    fn field_restore_fails_without_spec() {
        let snapshot = FieldSnapshot {
            spec_id: FieldSpecId::new("field.missing").unwrap(),
            x: 0.0,
            y: 0.0,
            elapsed_ms: 0.0,
            expired: false,
            source_entity: None,
        };
        assert!(matches!(
            snapshot.restore(&FieldSpecRegistry::default()),
            Err(WorldError::UnknownFieldSpec(_))
        ));
    }

    #[test]
    fn world_file_json_roundtrip() {
        let file = WorldFile {
            version: SNAPSHOT_VERSION,
            seed: 42,
            world_time: 1.5,
            tick_count: 15,
            saved_at: None,
            entities: vec![EntitySnapshot::capture(&entity())],
            fields: Vec::new(),
            event_log: Vec::new(),
            trust: TrustSystem::default(),
            weather: WeatherState::default(),
            environment: EnvironmentState::default(),
            broadcast_context: BTreeMap::new(),
        };
        let json = file.to_json().unwrap();
        let parsed = WorldFile::from_json(&json).unwrap();
        assert_eq!(file, parsed);
        // Unstamped documents re-serialize to identical bytes.
        assert_eq!(json, parsed.to_json().unwrap());
    }

    #[test]
    fn future_version_is_rejected() {
        let mut file = WorldFile {
            version: SNAPSHOT_VERSION + 1,
            seed: 0,
            world_time: 0.0,
            tick_count: 0,
            saved_at: None,
            entities: Vec::new(),
            fields: Vec::new(),
            event_log: Vec::new(),
            trust: TrustSystem::default(),
            weather: WeatherState::default(),
            environment: EnvironmentState::default(),
            broadcast_context: BTreeMap::new(),
        };
        let json = file.to_json().unwrap();
        assert!(matches!(
            WorldFile::from_json(&json),
            Err(WorldError::UnsupportedSnapshotVersion(_))
        ));
        file.version = SNAPSHOT_VERSION;
        assert!(WorldFile::from_json(&file.to_json().unwrap()).is_ok());
    }

    #[test]
    fn stamp_is_a_boundary_helper() {
        let file = WorldFile {
            version: SNAPSHOT_VERSION,
            seed: 0,
            world_time: 0.0,
            tick_count: 0,
            saved_at: None,
            entities: Vec::new(),
            fields: Vec::new(),
            event_log: Vec::new(),
            trust: TrustSystem::default(),
            weather: WeatherState::default(),
            environment: EnvironmentState::default(),
            broadcast_context: BTreeMap::new(),
        };
        let stamped = file.clone().with_wall_clock_stamp();
        assert!(file.saved_at.is_none());
        assert!(stamped.saved_at.is_some());
    }
}
