//! The renderer adapter contract.
//!
//! Rendering is an output-side concern: the kernel calls whichever
//! surface an adapter provides: batched `render_all` when the adapter
//! declares batch support, else per-entity and per-field updates. A
//! headless adapter is a first-class citizen: with it attached (or with
//! no adapter at all) the simulation is bit-identical to a rendered
//! run.

use crate::entity::Entity;
use crate::types::EntityId;
use crate::world::field::Field;

/// Output adapter driven by the rendering phase.
///
/// Every method has a no-op default so adapters implement only what
/// their backend needs.
pub trait RendererAdapter {
    /// One-time setup.
    fn init(&mut self) {}

    /// A new entity entered the world.
    fn spawn(&mut self, _entity: &Entity) {}

    /// Per-entity per-tick update (non-batched adapters).
    fn update(&mut self, _entity: &Entity, _dt: f64) {}

    /// An entity left the world.
    fn destroy(&mut self, _id: &EntityId) {}

    /// A new field appeared.
    fn render_field(&mut self, _field: &Field) {}

    /// Per-field per-tick update (non-batched adapters).
    fn update_field(&mut self, _field: &Field, _dt: f64) {}

    /// Whether the adapter prefers the batched call.
    fn supports_batch(&self) -> bool {
        false
    }

    /// Batched whole-scene render.
    fn render_all(&mut self, _entities: &[Entity], _fields: &[Field]) {}

    /// Clear the output surface.
    fn clear(&mut self) {}

    /// Final teardown.
    fn dispose(&mut self) {}
}

/// Adapter with no observable side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRenderer;

impl RendererAdapter for HeadlessRenderer {}

/// Adapter that counts calls; used to verify the rendering contract.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    /// Whether to report batch support.
    pub batch: bool,
    /// Ids passed to `spawn`.
    pub spawned: Vec<EntityId>,
    /// Ids passed to `destroy`.
    pub destroyed: Vec<EntityId>,
    /// Number of per-entity `update` calls.
    pub updates: usize,
    /// Number of per-field `update_field` calls.
    pub field_updates: usize,
    /// Number of `render_all` calls.
    pub batches: usize,
}

impl RecordingRenderer {
    /// Creates a recorder, batched or per-entity.
    #[must_use]
    pub fn new(batch: bool) -> Self {
        RecordingRenderer {
            batch,
            ..RecordingRenderer::default()
        }
    }
}

impl RendererAdapter for RecordingRenderer {
    fn spawn(&mut self, entity: &Entity) {
        self.spawned.push(entity.id().clone());
    }

    fn update(&mut self, _entity: &Entity, _dt: f64) {
        self.updates += 1;
    }

    fn destroy(&mut self, id: &EntityId) {
        self.destroyed.push(id.clone());
    }

    fn update_field(&mut self, _field: &Field, _dt: f64) {
        self.field_updates += 1;
    }

    fn supports_batch(&self) -> bool {
        self.batch
    }

    fn render_all(&mut self, _entities: &[Entity], _fields: &[Field]) {
        self.batches += 1;
    }
}
