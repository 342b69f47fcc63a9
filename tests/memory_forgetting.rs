//! Scenario: memory decay and the forget sweep.
//!
//! Ten faint memories with no further reinforcement decay linearly and
//! are culled by the periodic forget sweep; after twenty simulated
//! seconds nothing faint remains, and nothing that survives sits below
//! the forget threshold.

mod common;

use common::{material_id, registered_world};
use vivarium::memory::{MemoryContent, MemoryKind, MemorySubject, RecallFilter};
use vivarium::world::WorldConfig;

#[test]
fn faint_memories_are_gone_after_twenty_seconds() {
    let mut world = registered_world(WorldConfig::bare(), 9);
    let id = world.spawn(&material_id(), 400.0, 300.0).unwrap();

    for i in 0..10 {
        world.entity_mut(&id).unwrap().remember(
            MemoryKind::Observation,
            MemorySubject::World,
            MemoryContent::text(format!("faint impression {i}")),
            0.2,
            0.0,
        );
    }
    assert_eq!(
        world
            .entity(&id)
            .unwrap()
            .memory()
            .unwrap()
            .recall(&RecallFilter::new().with_kind(MemoryKind::Observation))
            .len(),
        10
    );

    // Decay rate 0.01/s erodes 0.2 of salience over 20 s; the sweep
    // culls everything that falls below 0.1 along the way.
    world.run(200, 0.1);

    let entity = world.entity(&id).unwrap();
    let observations = entity
        .memory()
        .unwrap()
        .recall(&RecallFilter::new().with_kind(MemoryKind::Observation));
    assert!(observations.is_empty(), "{} remained", observations.len());
}

#[test]
fn survivors_stay_at_or_above_the_threshold() {
    let mut world = registered_world(WorldConfig::bare(), 9);
    let id = world.spawn(&material_id(), 400.0, 300.0).unwrap();

    // A strong memory survives the window; a faint one does not.
    world.entity_mut(&id).unwrap().remember(
        MemoryKind::Observation,
        MemorySubject::World,
        MemoryContent::text("vivid"),
        0.9,
        0.0,
    );
    world.entity_mut(&id).unwrap().remember(
        MemoryKind::Observation,
        MemorySubject::World,
        MemoryContent::text("faint"),
        0.15,
        0.0,
    );

    world.run(200, 0.1);

    let entity = world.entity(&id).unwrap();
    let threshold = world.config().forget_threshold;
    for memory in entity.memory().unwrap().iter() {
        assert!(
            memory.salience >= threshold,
            "memory below threshold survived: {}",
            memory.salience
        );
    }
    let observations = entity
        .memory()
        .unwrap()
        .recall(&RecallFilter::new().with_kind(MemoryKind::Observation));
    assert_eq!(observations.len(), 1);
}

#[test]
fn reinforced_memories_outlive_the_sweep() {
    let mut world = registered_world(WorldConfig::bare(), 9);
    // Two entities in proximity re-remember each other every tick, so
    // interaction memories keep being re-added at full salience.
    let a = world.spawn(&material_id(), 100.0, 100.0).unwrap();
    let _b = world.spawn(&material_id(), 130.0, 100.0).unwrap();

    world.run(200, 0.1);

    let buffer = world.entity(&a).unwrap().memory().unwrap();
    let interactions = buffer.recall(&RecallFilter::new().with_kind(MemoryKind::Interaction));
    assert!(!interactions.is_empty());
}
