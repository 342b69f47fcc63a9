//! The world kernel: registries, the event log and the tick scheduler.
//!
//! A world owns every entity and field outright and advances them
//! through a fixed phase order each tick:
//!
//! 1. clock, 2. context drain, 3. physical, 4. environmental,
//! 5. mental, 6. communication, 7. relational, 8. cognitive,
//! 9. world mind, 10. fields, 11. sync moments and longing,
//! 12. rendering, 13. cleanup and (in debug builds) invariant checks.
//!
//! The scheduler is single-threaded and never suspends mid-phase;
//! external async work happens outside `tick` and re-enters through
//! context providers or boundary calls. Entities iterate in registry
//! insertion order and pairs lexicographically by index, which keeps
//! runs with equal seeds and inputs byte-identical.

pub mod config;
pub mod context;
pub mod energy;
pub mod environment;
pub mod events;
pub mod field;
pub mod material;
pub mod mind;
pub mod renderer;
pub mod snapshot;
pub mod weather;

pub use config::{BoundaryBehavior, WorldConfig};
pub use events::{EventLog, WorldEvent};
pub use field::{Field, FieldEffects, FieldSpec, FieldSpecRegistry};
pub use material::{MaterialRegistry, MaterialSpec};
pub use mind::{Pattern, PatternKind, WorldMind, WorldStats};
pub use renderer::{HeadlessRenderer, RecordingRenderer, RendererAdapter};
pub use snapshot::{EntitySnapshot, FieldSnapshot, WorldFile, SNAPSHOT_VERSION};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::emotion::{EmotionCoupler, EmotionDelta};
use crate::entity::{Entity, EntityBuilder};
use crate::error::WorldError;
use crate::math::{SimRng, Vec2};
use crate::memory::{LogRecord, MemoryContent, MemoryKind, MemorySubject};
use crate::relationship::{InteractionOutcome, Relationship, ShareCategory, TrustSystem};
use crate::types::{EntityId, FieldSpecId, MaterialId};
use crate::world::context::ContextProvider;
use crate::world::energy::{collision_pairs, EnergySystem};
use crate::world::environment::Environment;
use crate::world::weather::Weather;

/// Kinetic noise magnitude applied to fearful entities.
const KINETIC_NOISE: f32 = 5.0;

/// Valence loss per second at full rain intensity.
const RAIN_VALENCE_RATE: f32 = 0.01;

/// Humidity coupling rate toward the ambient per second.
const HUMIDITY_COUPLING: f32 = 0.05;

/// Salience of the memory recorded at spawn.
const SPAWN_MEMORY_SALIENCE: f32 = 0.6;

/// Spatial jitter applied to spawn positions, in pixels.
const SPAWN_JITTER: f32 = 1.0;

/// The simulation kernel.
///
/// # Examples
///
/// ```
/// use vivarium::types::MaterialId;
/// use vivarium::world::material::MaterialSpec;
/// use vivarium::world::{World, WorldConfig};
///
/// let mut world = World::new(WorldConfig::default(), 42);
/// let mat = MaterialId::new("mat.spark").unwrap();
/// world.register_material(MaterialSpec::new(mat.clone(), "Spark"));
///
/// let id = world.spawn(&mat, 100.0, 100.0).unwrap();
/// world.tick(0.1);
/// assert_eq!(world.tick_count(), 1);
/// assert!(world.entity(&id).is_some());
/// ```
pub struct World {
    config: WorldConfig,
    seed: u64,
    rng: SimRng,
    world_time: f64,
    tick_count: u64,
    entities: Vec<Entity>,
    index: BTreeMap<EntityId, usize>,
    fields: Vec<Field>,
    materials: MaterialRegistry,
    field_specs: FieldSpecRegistry,
    providers: Vec<Box<dyn ContextProvider>>,
    renderer: Option<Box<dyn RendererAdapter>>,
    broadcast_context: BTreeMap<String, serde_json::Value>,
    trust: TrustSystem,
    weather: Weather,
    environment: Environment,
    energy: EnergySystem,
    mind: WorldMind,
    events: EventLog,
    last_forget: f64,
    sync_cooldowns: BTreeMap<(EntityId, EntityId), f64>,
    longing_cooldowns: BTreeMap<(EntityId, EntityId), f64>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("seed", &self.seed)
            .field("world_time", &self.world_time)
            .field("tick_count", &self.tick_count)
            .field("entities", &self.entities.len())
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

impl World {
    /// Creates a world with the given configuration and PRNG seed.
    ///
    /// The field-spec registry starts with the builtin sync-moment and
    /// longing specs; the material registry starts empty.
    #[must_use]
    pub fn new(config: WorldConfig, seed: u64) -> Self {
        let weather = Weather::new(config.weather);
        let mind = WorldMind::new(config.stats_interval);
        let events = EventLog::new(config.event_log_capacity);
        let trust = TrustSystem::new(config.trust_threshold);
        World {
            config,
            seed,
            rng: SimRng::new(seed),
            world_time: 0.0,
            tick_count: 0,
            entities: Vec::new(),
            index: BTreeMap::new(),
            fields: Vec::new(),
            materials: MaterialRegistry::new(),
            field_specs: FieldSpecRegistry::with_builtins(),
            providers: Vec::new(),
            renderer: None,
            broadcast_context: BTreeMap::new(),
            trust,
            weather,
            environment: Environment::default(),
            energy: EnergySystem::default(),
            mind,
            events,
            last_forget: 0.0,
            sync_cooldowns: BTreeMap::new(),
            longing_cooldowns: BTreeMap::new(),
        }
    }

    // Accessors

    /// The seed this world was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulated seconds since world creation.
    #[must_use]
    pub fn world_time(&self) -> f64 {
        self.world_time
    }

    /// Number of executed ticks.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Entities in registry insertion order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Live fields.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.index.get(id).map(|&i| &self.entities[i])
    }

    /// Mutable entity lookup. External mutation is valid between
    /// ticks only.
    pub fn entity_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        let i = *self.index.get(id)?;
        Some(&mut self.entities[i])
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true when the world holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The world event log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The analytics engine.
    #[must_use]
    pub fn mind(&self) -> &WorldMind {
        &self.mind
    }

    /// The weather process.
    #[must_use]
    pub fn weather(&self) -> &Weather {
        &self.weather
    }

    /// The environment.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The trust system.
    #[must_use]
    pub fn trust(&self) -> &TrustSystem {
        &self.trust
    }

    /// Mutable trust system.
    pub fn trust_mut(&mut self) -> &mut TrustSystem {
        &mut self.trust
    }

    /// The material registry.
    #[must_use]
    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    /// The field-spec registry.
    #[must_use]
    pub fn field_specs(&self) -> &FieldSpecRegistry {
        &self.field_specs
    }

    /// The current world broadcast context.
    #[must_use]
    pub fn broadcast_context(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.broadcast_context
    }

    // Registry and boundary operations

    /// Registers a material spec.
    pub fn register_material(&mut self, spec: MaterialSpec) {
        self.materials.register(spec);
    }

    /// Registers a field spec.
    pub fn register_field_spec(&mut self, spec: FieldSpec) {
        self.field_specs.register(spec);
    }

    /// Registers a context provider, polled each tick in registration
    /// order.
    pub fn add_provider(&mut self, provider: Box<dyn ContextProvider>) {
        self.providers.push(provider);
    }

    /// Attaches a renderer adapter, initializing it.
    pub fn set_renderer(&mut self, mut renderer: Box<dyn RendererAdapter>) {
        renderer.init();
        for entity in &self.entities {
            renderer.spawn(entity);
        }
        self.renderer = Some(renderer);
    }

    /// Detaches the renderer, disposing it.
    pub fn clear_renderer(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
    }

    /// Injects a host value into the broadcast context.
    pub fn broadcast(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.broadcast_context.insert(key.into(), value);
    }

    /// Appends a host event to the world log.
    pub fn inject_event(&mut self, kind: impl Into<String>, data: serde_json::Value) {
        self.events.record(self.world_time, kind, None, data);
    }

    /// Spawns an entity of a registered material at a position.
    ///
    /// # Errors
    ///
    /// Fails when the material is unknown.
    pub fn spawn(&mut self, material_id: &MaterialId, x: f32, y: f32) -> Result<EntityId, WorldError> {
        self.spawn_with(material_id, x, y, |builder| builder)
    }

    /// Spawns an entity with builder customization (emotion, features,
    /// autonomy, languages).
    ///
    /// # Errors
    ///
    /// Fails when the material is unknown.
    pub fn spawn_with<F>(
        &mut self,
        material_id: &MaterialId,
        x: f32,
        y: f32,
        customize: F,
    ) -> Result<EntityId, WorldError>
    where
        F: FnOnce(EntityBuilder) -> EntityBuilder,
    {
        let material = self
            .materials
            .get(material_id)
            .ok_or_else(|| WorldError::UnknownMaterial(material_id.clone()))?
            .clone();

        let id = self.rng.entity_id();
        let jx = self.rng.range_f32(-SPAWN_JITTER, SPAWN_JITTER);
        let jy = self.rng.range_f32(-SPAWN_JITTER, SPAWN_JITTER);

        let builder = EntityBuilder::new()
            .id(id.clone())
            .material(material)
            .position(x + jx, y + jy);
        let mut entity = customize(builder).build()?;

        entity.remember(
            MemoryKind::Spawn,
            MemorySubject::World,
            MemoryContent::text("came into being"),
            SPAWN_MEMORY_SALIENCE,
            self.world_time,
        );

        Ok(self.insert_entity(entity))
    }

    /// Inserts a fully built entity, assigning it the next registry
    /// slot. Used by restore and by hosts with custom builds.
    pub fn insert_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id().clone();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.spawn(&entity);
        }
        self.events.record(
            self.world_time,
            "spawn",
            Some(id.clone()),
            serde_json::json!({ "material": entity.material_id().as_str() }),
        );
        self.index.insert(id.clone(), self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Removes an entity. Valid between ticks only.
    ///
    /// # Errors
    ///
    /// Fails when the entity is unknown.
    pub fn remove(&mut self, id: &EntityId) -> Result<(), WorldError> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| WorldError::UnknownEntity(id.clone()))?;
        self.entities.remove(position);
        self.rebuild_index();
        self.trust.forget_entity(id);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.destroy(id);
        }
        self.events.record(
            self.world_time,
            "remove",
            Some(id.clone()),
            serde_json::Value::Null,
        );
        Ok(())
    }

    /// Forms a cognitive link from `a` to `b`, and the mirror link when
    /// bidirectional.
    ///
    /// # Errors
    ///
    /// Fails when either entity is unknown.
    pub fn form_link(
        &mut self,
        a: &EntityId,
        b: &EntityId,
        strength: f32,
        bidirectional: bool,
    ) -> Result<(), WorldError> {
        let ai = *self
            .index
            .get(a)
            .ok_or_else(|| WorldError::UnknownEntity(a.clone()))?;
        let bi = *self
            .index
            .get(b)
            .ok_or_else(|| WorldError::UnknownEntity(b.clone()))?;
        let now = self.world_time;

        if let Some(links) = self.entities[ai].cognitive_links_mut() {
            links.connect(b.clone(), strength, bidirectional, now);
        }
        if bidirectional {
            if let Some(links) = self.entities[bi].cognitive_links_mut() {
                links.connect(a.clone(), strength, true, now);
            }
        }
        Ok(())
    }

    /// Spawns a field from a registered spec.
    ///
    /// # Errors
    ///
    /// Fails when the spec is unknown.
    pub fn spawn_field(
        &mut self,
        spec_id: &FieldSpecId,
        x: f32,
        y: f32,
        source: Option<EntityId>,
    ) -> Result<(), WorldError> {
        let spec = self
            .field_specs
            .get(spec_id)
            .ok_or_else(|| WorldError::UnknownFieldSpec(spec_id.clone()))?;
        let mut field = Field::from_spec(spec, Vec2::new(x, y));
        if let Some(source) = source {
            field = field.with_source(source);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render_field(&field);
        }
        self.events.record(
            self.world_time,
            "field-spawn",
            None,
            serde_json::json!({ "spec": spec_id.as_str() }),
        );
        self.fields.push(field);
        Ok(())
    }

    // The scheduler

    /// Advances the world by one fixed step.
    pub fn tick(&mut self, dt: f64) {
        self.world_time += dt;
        self.tick_count += 1;
        let now = self.world_time;

        self.drain_providers();
        self.phase_physical(dt, now);
        if self.config.enable_environment {
            self.phase_environment(dt, now);
        }
        if self.config.enable_ontology {
            self.phase_mental(dt, now);
        }
        self.phase_communication(now);
        if self.config.enable_ontology {
            self.phase_relational(dt, now);
        }
        if self.config.enable_cognition {
            self.phase_cognitive(dt, now);
        }
        self.phase_world_mind(now);
        self.phase_fields(dt, now);
        if self.config.enable_ontology {
            self.phase_sync_moments(now);
        }
        self.phase_render(dt);
        self.phase_cleanup();
        #[cfg(debug_assertions)]
        self.verify_invariants();
    }

    /// Runs `count` ticks of `dt` each.
    pub fn run(&mut self, count: usize, dt: f64) {
        for _ in 0..count {
            self.tick(dt);
        }
    }

    fn drain_providers(&mut self) {
        for provider in &mut self.providers {
            match provider.get_context() {
                Ok(values) => self.broadcast_context.extend(values),
                Err(err) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %err,
                        "context provider skipped this tick"
                    );
                }
            }
        }
    }

    fn phase_physical(&mut self, dt: f64, now: f64) {
        let coupler = EmotionCoupler::new(self.config.coupler);
        let physics = self.config.enable_physics;
        let width = self.config.width;
        let height = self.config.height;
        let boundary = self.config.boundary;
        let rng = &mut self.rng;

        for entity in &mut self.entities {
            if physics && entity.autonomous() {
                let emotion = entity.emotion().copied().unwrap_or_default();
                let movement = coupler.map(&emotion);
                let (dx, dy) = rng.unit_direction();
                let impulse = movement.force / movement.mass.max(0.01) * dt as f32;
                entity.vel += Vec2::new(dx, dy) * impulse;
                let speed = entity.vel.length();
                if speed > movement.speed {
                    entity.vel = entity.vel.normalized() * movement.speed;
                }
            }
            entity.update(dt, now, rng);
            entity.integrate(dt);
            apply_boundary(entity, width, height, boundary);
        }
    }

    fn phase_environment(&mut self, dt: f64, now: f64) {
        self.weather.update(dt, &mut self.rng);
        self.weather.apply(&mut self.environment, dt);

        let rain = self.weather.state().rain;
        let intensity = self.weather.state().rain_intensity;
        let energy = self.energy;
        let environment = &self.environment;
        let dt32 = dt as f32;

        for entity in &mut self.entities {
            let ambient = environment.state_at(entity.pos.x, entity.pos.y);
            if let Some(temp) = entity.temperature {
                entity.temperature = Some(energy.couple_to_ambient(temp, ambient.temperature, dt));
                let loss = energy.thermal_opacity_loss(temp, dt);
                if loss > 0.0 {
                    entity.opacity = (entity.opacity - loss).clamp(0.0, 1.0);
                }
            }
            if let Some(humidity) = entity.humidity {
                let coupled =
                    humidity + (ambient.humidity - humidity) * (HUMIDITY_COUPLING * dt32).min(1.0);
                entity.humidity = Some(coupled.clamp(0.0, 1.0));
            }
            if rain {
                entity.feel(&EmotionDelta::new(
                    -RAIN_VALENCE_RATE * intensity * dt32,
                    0.0,
                    0.0,
                ));
            }
        }

        let pairs = collision_pairs(&self.entities, self.config.collision_radius);
        for (i, j) in pairs {
            let a_id = self.entities[i].id().clone();
            let b_id = self.entities[j].id().clone();
            self.events.record(
                now,
                "entity_collision",
                Some(a_id.clone()),
                serde_json::json!({ "a": a_id.as_str(), "b": b_id.as_str() }),
            );
            if let (Some(ta), Some(tb)) =
                (self.entities[i].temperature, self.entities[j].temperature)
            {
                let flux = self.energy.exchange(ta, tb, dt);
                self.entities[i].temperature = Some(ta - flux);
                self.entities[j].temperature = Some(tb + flux);
            }
        }
    }

    fn phase_mental(&mut self, dt: f64, now: f64) {
        let forget_due = now - self.last_forget >= self.config.forget_interval;
        if forget_due {
            self.last_forget = now;
        }
        let memory_decay = self.config.memory_decay_rate;
        let forget_threshold = self.config.forget_threshold;
        let drift = (self.config.emotion_drift_rate * dt as f32).clamp(0.0, 1.0);
        let physics = self.config.enable_physics;
        let decay_manager = self.config.relationship_decay.clone();
        let dt32 = dt as f32;
        let broadcast = &self.broadcast_context;
        let rng = &mut self.rng;

        for entity in &mut self.entities {
            if let Some(buffer) = entity.memory_mut() {
                buffer.decay(dt, memory_decay);
                if forget_due {
                    buffer.forget(forget_threshold);
                }
            }

            let baseline = *entity.emotion_baseline();
            if let Some(emotion) = entity.emotion_mut() {
                emotion.drift_toward(&baseline, drift);
            }

            if physics {
                if let Some(emotion) = entity.emotion().copied() {
                    if emotion.valence > 0.5 {
                        let relief = 0.10 * (emotion.valence - 0.5) / 0.5;
                        entity.entropy = (entity.entropy * (1.0 - relief * dt32)).clamp(0.0, 1.0);
                    }
                    if emotion.arousal > 0.7 && emotion.dominance < 0.3 {
                        let fear = emotion.arousal * (1.0 - emotion.dominance);
                        let (dx, dy) = rng.unit_direction();
                        entity.vel += Vec2::new(dx, dy) * (fear * KINETIC_NOISE * dt32);
                    }
                    if emotion.valence < -0.3 {
                        let viscosity = 0.05 * ((-emotion.valence - 0.3) / 0.7).min(1.0);
                        entity.vel = entity.vel * (1.0 - viscosity * dt32);
                    }
                }
            }

            // Entity-local context is merged lazily over the broadcast.
            let mut merged = broadcast.clone();
            merged.extend(
                entity
                    .trigger_context()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
            entity.apply_context_rules(&merged, dt, now);

            if let Some(relationships) = entity.relationships_mut() {
                decay_manager.apply(relationships, now, dt);
            }

            if let Some(stack) = entity.intents_mut() {
                stack.update(now);
            }
        }

        if self.config.trust_decay_rate > 0.0 {
            self.trust.decay_trust(dt, self.config.trust_decay_rate);
        }
    }

    fn phase_communication(&mut self, now: f64) {
        let mut outgoing = Vec::new();
        for (i, entity) in self.entities.iter_mut().enumerate() {
            for message in entity.mailbox_mut().drain_outbox() {
                outgoing.push((i, message));
            }
        }

        let broadcast_radius = self.config.broadcast_radius;
        for (sender, message) in outgoing {
            let sender_id = self.entities[sender].id().clone();
            let sender_pos = self.entities[sender].pos;
            match message.to {
                Some(receiver) => {
                    if let Some(&target) = self.index.get(&receiver) {
                        self.entities[target].mailbox_mut().deliver(
                            sender_id,
                            message.content,
                            now,
                        );
                    }
                }
                None => {
                    for j in 0..self.entities.len() {
                        if j == sender {
                            continue;
                        }
                        if self.entities[j].pos.distance_to(sender_pos) <= broadcast_radius {
                            self.entities[j].mailbox_mut().deliver(
                                sender_id.clone(),
                                message.content.clone(),
                                now,
                            );
                        }
                    }
                }
            }
        }

        let retention = self.config.inbox_retention;
        for entity in &mut self.entities {
            entity.mailbox_mut().trim(retention, now);
        }
    }

    fn phase_relational(&mut self, dt: f64, now: f64) {
        let radius = self.config.proximity_radius;
        let contagion = self.config.contagion_rate;
        let bond_rate = self.config.proximity_bond_rate;
        let attraction_threshold = self.config.attraction_threshold;
        let attraction_rate = self.config.attraction_rate;
        let dt32 = dt as f32;

        for i in 0..self.entities.len() {
            for j in (i + 1)..self.entities.len() {
                let dist = self.entities[i].pos.distance_to(self.entities[j].pos);
                if dist >= radius {
                    continue;
                }
                let salience = 1.0 - dist / radius;
                let (a, b) = pair_mut(&mut self.entities, i, j);
                let a_id = a.id().clone();
                let b_id = b.id().clone();

                a.remember(
                    MemoryKind::Interaction,
                    MemorySubject::Entity(b_id.clone()),
                    MemoryContent::text("crossed paths"),
                    salience,
                    now,
                );
                b.remember(
                    MemoryKind::Interaction,
                    MemorySubject::Entity(a_id.clone()),
                    MemoryContent::text("crossed paths"),
                    salience,
                    now,
                );

                let bond = bond_rate * dt32;
                if let Some(relationships) = a.relationships_mut() {
                    relationships
                        .entry(b_id.clone())
                        .or_insert_with(Relationship::new)
                        .update(InteractionOutcome::Neutral, bond, now);
                }
                if let Some(relationships) = b.relationships_mut() {
                    relationships
                        .entry(a_id.clone())
                        .or_insert_with(Relationship::new)
                        .update(InteractionOutcome::Neutral, bond, now);
                }

                if let (Some(ea), Some(eb)) = (a.emotion().copied(), b.emotion().copied()) {
                    let rate = contagion * dt32;
                    a.feel(&EmotionDelta::new(
                        (eb.valence - ea.valence) * rate,
                        (eb.arousal - ea.arousal) * rate,
                        (eb.dominance - ea.dominance) * rate,
                    ));
                    b.feel(&EmotionDelta::new(
                        (ea.valence - eb.valence) * rate,
                        (ea.arousal - eb.arousal) * rate,
                        (ea.dominance - eb.dominance) * rate,
                    ));
                }

                if let (Some(ma), Some(mb)) = (a.memory(), b.memory()) {
                    let toward_b = ma.strength_of(&MemorySubject::Entity(b_id.clone()));
                    let toward_a = mb.strength_of(&MemorySubject::Entity(a_id.clone()));
                    let avg = 0.5 * (toward_b + toward_a);
                    if avg > attraction_threshold {
                        let direction = (b.pos - a.pos).normalized();
                        let force = direction * (attraction_rate * avg);
                        a.vel += force;
                        b.vel += force * -1.0;
                    }
                }
            }
        }
    }

    fn phase_cognitive(&mut self, dt: f64, now: f64) {
        let skill_rate = self.config.skill_decay_rate;
        let link_rate = self.config.link_decay_rate;
        for entity in &mut self.entities {
            if let Some(skills) = entity.skills_mut() {
                skills.decay(dt, skill_rate);
            }
            if let Some(links) = entity.cognitive_links_mut() {
                links.decay(dt, link_rate);
            }
            entity.consolidate(now);
            if let Some(learning) = entity.learning_mut() {
                learning.forget_older_than(crate::cognition::DEFAULT_FORGET_HORIZON, now);
            }
        }
    }

    fn phase_world_mind(&mut self, now: f64) {
        if !self.mind.due(now) {
            return;
        }
        self.mind.run(&self.entities, now);
        let stats = serde_json::to_value(self.mind.stats()).unwrap_or(serde_json::Value::Null);
        self.events.record(now, "world-stats", None, stats);
    }

    fn phase_fields(&mut self, dt: f64, now: f64) {
        let entities = &mut self.entities;
        for field in &mut self.fields {
            field.update(dt, now, entities);
        }
        self.fields.retain(|f| !f.is_expired());
    }

    fn phase_sync_moments(&mut self, now: f64) {
        let threshold = self.config.sync_threshold;
        let window = self.config.sync_recent_window;
        let min_interactions = self.config.sync_min_interactions;

        // Detection pass is read-only; spawns happen afterwards.
        let mut syncs: Vec<(EntityId, EntityId, Vec2)> = Vec::new();
        for i in 0..self.entities.len() {
            for j in (i + 1)..self.entities.len() {
                let a = &self.entities[i];
                let b = &self.entities[j];
                let (Some(ea), Some(eb)) = (a.emotion(), b.emotion()) else {
                    continue;
                };
                let alignment =
                    (ea.valence - eb.valence).abs() + (ea.arousal - eb.arousal).abs();
                if alignment >= threshold {
                    continue;
                }
                let (Some(toward_b), Some(toward_a)) =
                    (a.relationship_with(b.id()), b.relationship_with(a.id()))
                else {
                    continue;
                };
                if toward_b.interaction_count < min_interactions
                    || toward_a.interaction_count < min_interactions
                {
                    continue;
                }
                let recent = |rel: &Relationship| {
                    rel.last_interaction.is_some_and(|t| now - t <= window)
                };
                if !recent(toward_b) || !recent(toward_a) {
                    continue;
                }
                let key = (a.id().clone(), b.id().clone());
                let cooled = self
                    .sync_cooldowns
                    .get(&key)
                    .is_none_or(|last| now - last >= self.config.sync_cooldown);
                if !cooled {
                    continue;
                }
                self.sync_cooldowns.insert(key, now);
                syncs.push((a.id().clone(), b.id().clone(), a.pos));
            }
        }

        let sync_spec = FieldSpecId::new("field.sync_moment").expect("static id");
        for (a_id, b_id, position) in syncs {
            self.events.record(
                now,
                "sync-moment",
                Some(a_id.clone()),
                serde_json::json!({ "a": a_id.as_str(), "b": b_id.as_str() }),
            );
            // The field lives at A's position and points its relational
            // channels at B.
            let _ = self.spawn_field(&sync_spec, position.x, position.y, Some(b_id.clone()));
            self.sync_memories(&a_id, &b_id, now);
        }

        self.spawn_longing_fields(now);
    }

    /// Trust-gated CRDT memory replication between a synced pair.
    fn sync_memories(&mut self, a_id: &EntityId, b_id: &EntityId, now: f64) {
        let a_shares = self.trust.should_share(a_id, ShareCategory::Memory, b_id);
        let b_shares = self.trust.should_share(b_id, ShareCategory::Memory, a_id);
        if !(a_shares && b_shares) {
            self.events.record(
                now,
                "trust-blocked",
                Some(a_id.clone()),
                serde_json::json!({
                    "a": a_id.as_str(),
                    "b": b_id.as_str(),
                    "trust_a": self.trust.trust_between(a_id, b_id),
                    "trust_b": self.trust.trust_between(b_id, a_id),
                }),
            );
            return;
        }

        let (Some(&ai), Some(&bi)) = (self.index.get(a_id), self.index.get(b_id)) else {
            return;
        };
        let k = self.config.sync_memory_count;
        let from_a: Vec<LogRecord> = self.entities[ai]
            .memory_log()
            .recent_own(k)
            .into_iter()
            .cloned()
            .collect();
        let from_b: Vec<LogRecord> = self.entities[bi]
            .memory_log()
            .recent_own(k)
            .into_iter()
            .cloned()
            .collect();

        let into_b = self.entities[bi]
            .memory_log_mut()
            .merge_records(from_a.iter());
        let into_a = self.entities[ai]
            .memory_log_mut()
            .merge_records(from_b.iter());

        self.events.record(
            now,
            "memory-sync",
            Some(a_id.clone()),
            serde_json::json!({
                "a": a_id.as_str(),
                "b": b_id.as_str(),
                "into_a": into_a.added,
                "into_b": into_b.added,
            }),
        );
    }

    fn spawn_longing_fields(&mut self, now: f64) {
        let familiarity_floor = self.config.longing_familiarity;
        let absence = self.config.longing_after;

        let mut longings: Vec<(EntityId, EntityId, Vec2)> = Vec::new();
        for entity in &self.entities {
            let Some(relationships) = entity.relationships() else {
                continue;
            };
            for (target, rel) in relationships {
                if rel.familiarity <= familiarity_floor {
                    continue;
                }
                let Some(last) = rel.last_interaction else {
                    continue;
                };
                if now - last <= absence {
                    continue;
                }
                let key = (entity.id().clone(), target.clone());
                let cooled = self
                    .longing_cooldowns
                    .get(&key)
                    .is_none_or(|t| now - t >= self.config.longing_cooldown);
                if !cooled {
                    continue;
                }
                longings.push((entity.id().clone(), target.clone(), entity.pos));
            }
        }

        let longing_spec = FieldSpecId::new("field.longing").expect("static id");
        for (owner, target, position) in longings {
            self.longing_cooldowns
                .insert((owner.clone(), target.clone()), now);
            self.events.record(
                now,
                "longing-field",
                Some(owner.clone()),
                serde_json::json!({ "for": target.as_str() }),
            );
            let _ = self.spawn_field(&longing_spec, position.x, position.y, None);
        }
    }

    fn phase_render(&mut self, dt: f64) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if renderer.supports_batch() {
            renderer.render_all(&self.entities, &self.fields);
        } else {
            for entity in &self.entities {
                renderer.update(entity, dt);
            }
            for field in &self.fields {
                renderer.update_field(field, dt);
            }
        }
    }

    fn phase_cleanup(&mut self) {
        let known: BTreeSet<EntityId> = self.index.keys().cloned().collect();
        for entity in &mut self.entities {
            entity.prune_dangling(&known);
        }

        // A bidirectional link whose mirror decayed away is demoted to
        // a plain directed link so the symmetry invariant holds at
        // every tick boundary.
        let mut demotions: Vec<(usize, EntityId)> = Vec::new();
        for (i, entity) in self.entities.iter().enumerate() {
            let Some(links) = entity.cognitive_links() else {
                continue;
            };
            for (target, link) in links.iter() {
                if !link.bidirectional {
                    continue;
                }
                if let Some(&t) = self.index.get(target) {
                    let mirrored = self.entities[t]
                        .cognitive_links()
                        .is_some_and(|l| l.is_connected(entity.id()));
                    if !mirrored {
                        demotions.push((i, target.clone()));
                    }
                }
            }
        }
        for (i, target) in demotions {
            if let Some(links) = self.entities[i].cognitive_links_mut() {
                links.set_bidirectional(&target, false);
            }
        }

        self.sync_cooldowns
            .retain(|(a, b), _| known.contains(a) && known.contains(b));
        self.longing_cooldowns
            .retain(|(a, b), _| known.contains(a) && known.contains(b));
    }

    #[cfg(debug_assertions)]
    fn verify_invariants(&self) {
        for entity in &self.entities {
            if let Some(emotion) = entity.emotion() {
                debug_assert!(emotion.is_valid(), "emotion out of range: {emotion:?}");
            }
            if let Some(buffer) = entity.memory() {
                debug_assert!(buffer.len() <= buffer.capacity());
                for memory in buffer.iter() {
                    debug_assert!((0.0..=1.0).contains(&memory.salience));
                }
            }
            if let Some(relationships) = entity.relationships() {
                for rel in relationships.values() {
                    debug_assert!((0.0..=1.0).contains(&rel.trust));
                    debug_assert!((0.0..=1.0).contains(&rel.familiarity));
                }
            }
            if let Some(links) = entity.cognitive_links() {
                for (target, link) in links.iter() {
                    debug_assert!((0.0..=1.0).contains(&link.strength));
                    if link.bidirectional {
                        if let Some(other) = self.entity(target) {
                            debug_assert!(
                                other
                                    .cognitive_links()
                                    .is_some_and(|l| l.is_connected(entity.id())),
                                "bidirectional link missing mirror"
                            );
                        }
                    }
                }
            }
        }
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, entity) in self.entities.iter().enumerate() {
            self.index.insert(entity.id().clone(), i);
        }
    }

    // Persistence

    /// Captures the world as a snapshot document.
    #[must_use]
    pub fn snapshot(&self) -> WorldFile {
        WorldFile {
            version: SNAPSHOT_VERSION,
            seed: self.seed,
            world_time: self.world_time,
            tick_count: self.tick_count,
            saved_at: None,
            entities: self.entities.iter().map(EntitySnapshot::capture).collect(),
            fields: self.fields.iter().map(FieldSnapshot::capture).collect(),
            event_log: self.events.iter().cloned().collect(),
            trust: self.trust.clone(),
            weather: *self.weather.state(),
            environment: *self.environment.base(),
            broadcast_context: self.broadcast_context.clone(),
        }
    }

    /// Rebuilds a world from a snapshot and re-supplied registries.
    ///
    /// Bidirectional links missing their mirror are reconstructed with
    /// a warning.
    ///
    /// # Errors
    ///
    /// Fails when a referenced material or field spec is missing, or
    /// the snapshot version is unsupported.
    pub fn restore(
        config: WorldConfig,
        file: &WorldFile,
        materials: MaterialRegistry,
        field_specs: FieldSpecRegistry,
    ) -> Result<Self, WorldError> {
        if file.version > SNAPSHOT_VERSION {
            return Err(WorldError::UnsupportedSnapshotVersion(file.version));
        }
        let mut world = World::new(config, file.seed);
        world.materials = materials;
        world.field_specs = field_specs;
        world.world_time = file.world_time;
        world.tick_count = file.tick_count;
        world.last_forget = file.world_time;
        world.trust = file.trust.clone();
        world.weather.set_state(file.weather);
        *world.environment.base_mut() = file.environment;
        world.broadcast_context = file.broadcast_context.clone();

        for snapshot in &file.entities {
            let entity = snapshot.restore(&world.materials)?;
            world.index.insert(entity.id().clone(), world.entities.len());
            world.entities.push(entity);
        }
        for snapshot in &file.fields {
            let field = snapshot.restore(&world.field_specs)?;
            world.fields.push(field);
        }
        world.events.replace(file.event_log.clone());
        world.reconstruct_mirrors();
        Ok(world)
    }

    fn reconstruct_mirrors(&mut self) {
        let mut missing: Vec<(EntityId, EntityId, f32)> = Vec::new();
        for entity in &self.entities {
            let Some(links) = entity.cognitive_links() else {
                continue;
            };
            for (target, link) in links.iter() {
                if !link.bidirectional {
                    continue;
                }
                if let Some(other) = self.entity(target) {
                    let mirrored = other
                        .cognitive_links()
                        .is_some_and(|l| l.is_connected(entity.id()));
                    if !mirrored {
                        missing.push((target.clone(), entity.id().clone(), link.strength));
                    }
                }
            }
        }
        let now = self.world_time;
        for (owner, target, strength) in missing {
            tracing::warn!(
                owner = owner.as_str(),
                target = target.as_str(),
                "reconstructing missing mirror link"
            );
            if let Some(entity) = self.entity_mut(&owner) {
                if let Some(links) = entity.cognitive_links_mut() {
                    links.connect(target, strength, true, now);
                }
            }
        }
    }
}

/// Splits two disjoint mutable entity references out of the registry.
fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> (&mut Entity, &mut Entity) {
    debug_assert!(i < j);
    let (left, right) = entities.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

fn apply_boundary(entity: &mut Entity, width: f32, height: f32, boundary: BoundaryBehavior) {
    match boundary {
        BoundaryBehavior::Clamp => {
            entity.pos.x = entity.pos.x.clamp(0.0, width);
            entity.pos.y = entity.pos.y.clamp(0.0, height);
        }
        BoundaryBehavior::Bounce { damping } => {
            if entity.pos.x < 0.0 {
                entity.pos.x = -entity.pos.x;
                entity.vel.x = -entity.vel.x * damping;
            } else if entity.pos.x > width {
                entity.pos.x = 2.0 * width - entity.pos.x;
                entity.vel.x = -entity.vel.x * damping;
            }
            if entity.pos.y < 0.0 {
                entity.pos.y = -entity.pos.y;
                entity.vel.y = -entity.vel.y * damping;
            } else if entity.pos.y > height {
                entity.pos.y = 2.0 * height - entity.pos.y;
                entity.vel.y = -entity.vel.y * damping;
            }
            entity.pos.x = entity.pos.x.clamp(0.0, width);
            entity.pos.y = entity.pos.y.clamp(0.0, height);
        }
        BoundaryBehavior::Wrap => {
            entity.pos.x = entity.pos.x.rem_euclid(width.max(f32::EPSILON));
            entity.pos.y = entity.pos.y.rem_euclid(height.max(f32::EPSILON));
        }
    }
}
