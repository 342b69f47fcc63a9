//! Vivarium
//!
//! Deterministic, tick-driven simulation engine for populations of
//! *living entities*: autonomous agents carrying persistent identity,
//! a decaying episodic memory, a continuous PAD emotional state, a
//! stack of goals, relationships to other agents, and cognitive links
//! across which signals and memories propagate under trust gates.
//!
//! # Core Concepts
//!
//! - **Entity**: a living agent aggregating memory, emotion, intents,
//!   relationships and cognitive links under feature flags
//! - **World**: the kernel; registries, the event log, and a
//!   thirteen-phase fixed-step tick scheduler
//! - **Field**: a transient radial influence zone whose abstract
//!   effects nudge emotion, relationships and links
//! - **MemoryLog**: a grow-only CRDT replicated between entities at
//!   trust-gated sync moments
//! - **Sync moment**: tick-detected emotional alignment that spawns a
//!   positive field and triggers memory replication
//!
//! # Determinism
//!
//! Every stochastic decision draws from a single seeded PRNG (or a
//! child stream derived from the seed). Given an identical seed,
//! identical external inputs and an identical tick cadence, two runs
//! produce byte-identical snapshots. The kernel never reads the wall
//! clock; all timestamps derive from world time.
//!
//! # Example
//!
//! ```
//! use vivarium::types::MaterialId;
//! use vivarium::world::material::MaterialSpec;
//! use vivarium::world::{World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::default(), 42);
//! let mat = MaterialId::new("mat.spark").unwrap();
//! world.register_material(MaterialSpec::new(mat.clone(), "Spark"));
//!
//! let a = world.spawn(&mat, 100.0, 100.0).unwrap();
//! let b = world.spawn(&mat, 150.0, 100.0).unwrap();
//!
//! world.run(10, 0.1);
//!
//! // Proximity built a relationship.
//! assert!(world.entity(&a).unwrap().relationship_with(&b).is_some());
//! ```
//!
//! # What stays outside
//!
//! Rendering backends, `.mdm` file parsing, LLM dialogue generation,
//! embedding and similarity services, CLIs and OS context providers
//! are external collaborators. They plug in through the
//! [`world::renderer::RendererAdapter`] and
//! [`world::context::ContextProvider`] traits and the parsed
//! [`world::material::MaterialSpec`] representation; the kernel itself
//! performs no I/O and never awaits.

pub mod cognition;
pub mod dialogue;
pub mod emotion;
pub mod entity;
pub mod error;
pub mod intent;
pub mod math;
pub mod memory;
pub mod relationship;
pub mod types;
pub mod world;

// Re-export the primary aggregate types at the crate root.
pub use entity::{Entity, EntityBuildError, EntityBuilder, Feature, FeatureSet, Thought};
pub use error::WorldError;
pub use world::{World, WorldConfig, WorldFile};

// Re-export commonly used component types at the crate root.
pub use cognition::{CognitiveLink, CognitiveLinkMap, LearningSystem, SkillSystem};
pub use emotion::{
    CouplerPreset, EmotionCoupler, EmotionDelta, EmotionLabel, EmotionalState,
};
pub use intent::{Goal, Intent, IntentStack};
pub use math::{clamp01, distance, lerp, SimRng, Vec2};
pub use memory::{
    Memory, MemoryBuffer, MemoryContent, MemoryCrystal, MemoryCrystallizer, MemoryKind,
    MemoryLog, MemorySubject, RecallFilter,
};
pub use relationship::{
    DecayCurve, DecayManager, InteractionOutcome, Relationship, ShareCategory, SharePolicy,
    TrustSystem,
};
pub use types::{EntityId, FieldSpecId, MaterialId};
