//! Scenario: snapshot round-trip.
//!
//! `restore(snapshot(W))` reproduces `W` up to registry re-supply:
//! snapshotting the restored world yields the exact same bytes. The
//! registries themselves are not part of the document and must be
//! handed back at restore time; a missing registry entry is fatal.

mod common;

use common::{material_id, registered_world, spawn_emotional};
use pretty_assertions::assert_eq;
use vivarium::entity::Feature;
use vivarium::types::FieldSpecId;
use vivarium::world::material::MaterialSpec;
use vivarium::world::{
    FieldSpecRegistry, MaterialRegistry, World, WorldConfig, WorldFile,
};

fn materials() -> MaterialRegistry {
    let mut registry = MaterialRegistry::new();
    registry.register(MaterialSpec::new(material_id(), "Testling"));
    registry
}

#[test]
fn snapshot_restore_snapshot_is_bytewise_equal() {
    let mut world = registered_world(WorldConfig::default(), 11);
    let a = spawn_emotional(&mut world, 100.0, 100.0, 0.6, 0.7, 0.5);
    let b = spawn_emotional(&mut world, 140.0, 100.0, 0.6, 0.7, 0.5);
    world
        .spawn_with(&material_id(), 500.0, 400.0, |builder| {
            builder
                .autonomous(true)
                .with_feature(Feature::Skills)
                .with_feature(Feature::Learning)
        })
        .unwrap();
    world.form_link(&a, &b, 0.7, true).unwrap();

    world.run(50, 0.1);
    // Keep a live field in flight across the round trip.
    world
        .spawn_field(&FieldSpecId::new("field.longing").unwrap(), 120.0, 110.0, None)
        .unwrap();
    world.run(10, 0.1);

    let first = world.snapshot();
    let json = first.to_json().unwrap();

    let parsed = WorldFile::from_json(&json).unwrap();
    let restored = World::restore(
        WorldConfig::default(),
        &parsed,
        materials(),
        FieldSpecRegistry::with_builtins(),
    )
    .unwrap();

    let second = restored.snapshot();
    assert_eq!(json, second.to_json().unwrap());
}

#[test]
fn restored_world_preserves_entity_state() {
    let mut world = registered_world(WorldConfig::bare(), 3);
    let a = spawn_emotional(&mut world, 100.0, 100.0, 0.8, 0.6, 0.5);
    let b = spawn_emotional(&mut world, 150.0, 100.0, -0.6, 0.3, 0.4);
    world.run(25, 0.1);

    let file = world.snapshot();
    let restored = World::restore(
        WorldConfig::bare(),
        &file,
        materials(),
        FieldSpecRegistry::with_builtins(),
    )
    .unwrap();

    assert_eq!(restored.world_time(), world.world_time());
    assert_eq!(restored.tick_count(), world.tick_count());
    assert_eq!(restored.len(), 2);

    let original = world.entity(&a).unwrap();
    let copy = restored.entity(&a).unwrap();
    assert_eq!(original.emotion(), copy.emotion());
    assert_eq!(original.pos, copy.pos);
    assert_eq!(original.age(), copy.age());
    assert_eq!(
        original.relationship_with(&b).unwrap(),
        copy.relationship_with(&b).unwrap()
    );
    assert_eq!(
        original.memory().unwrap().len(),
        copy.memory().unwrap().len()
    );
}

#[test]
fn restore_without_material_is_fatal() {
    let mut world = registered_world(WorldConfig::bare(), 3);
    world.spawn(&material_id(), 0.0, 0.0).unwrap();
    let file = world.snapshot();

    let result = World::restore(
        WorldConfig::bare(),
        &file,
        MaterialRegistry::new(),
        FieldSpecRegistry::with_builtins(),
    );
    assert!(result.is_err());
}

#[test]
fn restore_without_field_spec_is_fatal() {
    let mut world = registered_world(WorldConfig::bare(), 3);
    world
        .spawn_field(&FieldSpecId::new("field.longing").unwrap(), 0.0, 0.0, None)
        .unwrap();
    let file = world.snapshot();

    let result = World::restore(
        WorldConfig::bare(),
        &file,
        materials(),
        FieldSpecRegistry::default(),
    );
    assert!(result.is_err());
}

#[test]
fn restore_reconstructs_missing_bidirectional_mirror() {
    let mut world = registered_world(WorldConfig::bare(), 3);
    let a = spawn_emotional(&mut world, 100.0, 100.0, 0.0, 0.5, 0.5);
    let b = spawn_emotional(&mut world, 600.0, 400.0, 0.0, 0.5, 0.5);
    world.form_link(&a, &b, 0.5, true).unwrap();

    // Corrupt the document: drop B's half of the pair.
    let mut file = world.snapshot();
    for entity in &mut file.entities {
        if entity.id == b {
            if let Some(links) = entity.cognitive_links.as_mut() {
                links.disconnect(&a);
            }
        }
    }

    let restored = World::restore(
        WorldConfig::bare(),
        &file,
        materials(),
        FieldSpecRegistry::with_builtins(),
    )
    .unwrap();

    // The loader reconstructed the mirror.
    assert!(restored
        .entity(&b)
        .unwrap()
        .cognitive_links()
        .unwrap()
        .is_connected(&a));
}
