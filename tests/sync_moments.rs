//! Scenario: sync moments and trust-gated memory replication.
//!
//! Two aligned entities that keep interacting produce exactly one
//! sync-moment field, whose abstract effects lift the relationship
//! toward the field's source. Memory replication across the pair is
//! gated by the trust system's share policies.

mod common;

use common::{registered_world, spawn_emotional};
use vivarium::relationship::ShareCategory;
use vivarium::types::{EntityId, FieldSpecId};
use vivarium::world::{World, WorldConfig};

/// A pair that is emotionally aligned from the start and interacts
/// every tick.
fn aligned_pair(seed: u64) -> (World, EntityId, EntityId) {
    let mut world = registered_world(WorldConfig::bare(), seed);
    let a = spawn_emotional(&mut world, 100.0, 100.0, 0.5, 0.6, 0.5);
    let b = spawn_emotional(&mut world, 130.0, 100.0, 0.5, 0.6, 0.5);
    (world, a, b)
}

#[test]
fn exactly_one_sync_moment_fires() {
    let (mut world, _a, _b) = aligned_pair(1);

    // Three interactions are required before the detector may fire;
    // the cooldown then holds the pair for thirty seconds.
    world.run(100, 0.1);

    assert_eq!(world.events().of_kind("sync-moment").len(), 1);
    let spawns = world.events().of_kind("field-spawn");
    let sync_spawns = spawns
        .iter()
        .filter(|e| e.data["spec"] == "field.sync_moment")
        .count();
    assert_eq!(sync_spawns, 1);
}

#[test]
fn sync_field_has_documented_shape() {
    let (mut world, _a, _b) = aligned_pair(1);
    world.run(4, 0.1);

    assert_eq!(world.fields().len(), 1);
    let field = &world.fields()[0];
    assert_eq!(
        field.spec_id,
        FieldSpecId::new("field.sync_moment").unwrap()
    );
    assert_eq!(field.radius, 200.0);
    assert_eq!(field.duration_ms, 5000.0);
}

#[test]
fn sync_field_boosts_relationship_trust_by_five_hundredths() {
    let (mut world, a, b) = aligned_pair(1);

    // Relationship trust starts at the neutral 0.5 and proximity
    // updates are neutral-outcome, so the field is the only mover.
    world.run(100, 0.1);

    let trust = world
        .entity(&a)
        .unwrap()
        .relationship_with(&b)
        .unwrap()
        .trust;
    let gain = trust - 0.5;
    assert!(
        (gain - 0.05).abs() <= 0.01,
        "trust gain outside 0.05 +/- 0.01: {gain}"
    );
}

#[test]
fn default_trust_blocks_memory_replication() {
    let (mut world, a, b) = aligned_pair(1);

    // Policy(memory) = trust by default; both sides sit at the 0.5
    // baseline, below the 0.6 threshold.
    world.run(100, 0.1);

    assert!(world.events().of_kind("memory-sync").is_empty());
    let blocked = world.events().of_kind("trust-blocked");
    assert_eq!(blocked.len(), 1);
    let data = &blocked[0].data;
    assert!((data["trust_a"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    assert!((data["trust_b"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    // No replicated records landed anywhere.
    let a_ref = world.entity(&a).unwrap();
    assert!(a_ref.memory_log().iter().all(|r| r.origin == a));
    let b_ref = world.entity(&b).unwrap();
    assert!(b_ref.memory_log().iter().all(|r| r.origin == b));
}

#[test]
fn trusted_pair_replicates_memories_both_ways() {
    let (mut world, a, b) = aligned_pair(1);
    world.trust_mut().table_mut(&a).set_trust(b.clone(), 0.9);
    world.trust_mut().table_mut(&b).set_trust(a.clone(), 0.9);

    world.run(100, 0.1);

    let syncs = world.events().of_kind("memory-sync");
    assert_eq!(syncs.len(), 1);
    assert!(world.events().of_kind("trust-blocked").is_empty());

    let a_ref = world.entity(&a).unwrap();
    assert!(a_ref.memory_log().iter().any(|r| r.origin == b));
    let b_ref = world.entity(&b).unwrap();
    assert!(b_ref.memory_log().iter().any(|r| r.origin == a));
}

#[test]
fn one_sided_trust_still_blocks() {
    let (mut world, a, b) = aligned_pair(1);
    world.trust_mut().table_mut(&a).set_trust(b.clone(), 0.9);
    // b never extended trust toward a.

    world.run(100, 0.1);

    assert!(world.events().of_kind("memory-sync").is_empty());
    assert_eq!(world.events().of_kind("trust-blocked").len(), 1);
}

#[test]
fn misaligned_pair_never_syncs() {
    let mut world = registered_world(WorldConfig::bare(), 1);
    let _a = spawn_emotional(&mut world, 100.0, 100.0, 0.9, 0.9, 0.5);
    let _b = spawn_emotional(&mut world, 130.0, 100.0, -0.9, 0.1, 0.5);

    world.run(30, 0.1);
    assert!(world.events().of_kind("sync-moment").is_empty());
}

#[test]
fn longing_field_spawns_after_absence() {
    let mut world = registered_world(WorldConfig::bare(), 5);
    let a = spawn_emotional(&mut world, 100.0, 100.0, 0.2, 0.4, 0.5);
    let b = spawn_emotional(&mut world, 130.0, 100.0, 0.2, 0.4, 0.5);

    // Build familiarity above the longing floor, then separate.
    world.run(300, 0.1);
    let familiarity = world
        .entity(&a)
        .unwrap()
        .relationship_with(&b)
        .unwrap()
        .familiarity;
    assert!(familiarity > 0.6, "familiarity too low: {familiarity}");

    world.entity_mut(&b).unwrap().pos.x = 700.0;
    world.entity_mut(&b).unwrap().pos.y = 500.0;
    // Absence threshold is 30 s.
    world.run(320, 0.1);

    assert!(!world.events().of_kind("longing-field").is_empty());
}
