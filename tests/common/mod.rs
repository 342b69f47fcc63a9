//! Shared helpers for integration scenarios.

#![allow(dead_code)]

use vivarium::emotion::EmotionalState;
use vivarium::types::{EntityId, MaterialId};
use vivarium::world::material::MaterialSpec;
use vivarium::world::{World, WorldConfig};

/// Material every scenario entity is made of.
pub fn material_id() -> MaterialId {
    MaterialId::new("mat.testling").unwrap()
}

/// A world with the scenario material registered.
pub fn registered_world(config: WorldConfig, seed: u64) -> World {
    let mut world = World::new(config, seed);
    world.register_material(MaterialSpec::new(material_id(), "Testling"));
    world
}

/// Spawns an entity with a specific starting emotion.
pub fn spawn_emotional(
    world: &mut World,
    x: f32,
    y: f32,
    valence: f32,
    arousal: f32,
    dominance: f32,
) -> EntityId {
    world
        .spawn_with(&material_id(), x, y, |builder| {
            builder.emotion(EmotionalState::new(valence, arousal, dominance))
        })
        .unwrap()
}

/// Current valence of an entity.
pub fn valence_of(world: &World, id: &EntityId) -> f32 {
    world.entity(id).unwrap().emotion().unwrap().valence
}
