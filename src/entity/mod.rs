//! The living entity: an aggregate of kinematics, affect, memory,
//! goals, bonds and links under feature flags.
//!
//! # Key Types
//!
//! - [`Entity`] - the agent itself
//! - [`EntityBuilder`] - fluent construction with validation
//! - [`Thought`] - the product of [`Entity::reflect`]
//!
//! Ownership: an entity exclusively owns its sub-aggregates.
//! Relationships and cognitive links are indexed references (they
//! store target ids, never pointers) and the world resolves them
//! through its registry. Calling a feature-gated method while the
//! feature is disabled is a documented no-op, not an error.

mod builder;
mod features;
mod messaging;

pub use builder::{EntityBuildError, EntityBuilder};
pub use features::{Feature, FeatureSet};
pub use messaging::{InboxMessage, Mailbox, OutgoingMessage, INBOX_RETENTION};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::cognition::{CognitiveLinkMap, LearningSystem, SkillSystem};
use crate::dialogue::{builtin_phrases, DialogueEnhancer};
use crate::emotion::{EmotionDelta, EmotionLabel, EmotionalState};
use crate::intent::{Goal, Intent, IntentStack};
use crate::math::{SimRng, Vec2};
use crate::memory::{
    Memory, MemoryBuffer, MemoryContent, MemoryCrystallizer, MemoryKind, MemoryLog, MemorySubject,
};
use crate::relationship::Relationship;
use crate::types::{EntityId, MaterialId};
use crate::world::material::{MaterialSpec, RuleAction};

/// Seconds before an autonomously generated intent expires.
const GENERATED_INTENT_TIMEOUT: f64 = 20.0;

/// Salience of the memory recorded when an intent changes.
const INTENT_MEMORY_SALIENCE: f32 = 0.3;

/// A reflection produced by [`Entity::reflect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    /// World time of the reflection.
    pub timestamp: f64,
    /// Synthesized inner monologue.
    pub text: String,
    /// Current emotion label, when the entity feels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionLabel>,
    /// Number of learned patterns at reflection time.
    pub pattern_count: usize,
    /// Motivation of the current intent, or 0.
    pub motivation: f32,
}

/// A living entity.
///
/// # Examples
///
/// ```
/// use vivarium::entity::EntityBuilder;
/// use vivarium::types::{EntityId, MaterialId};
/// use vivarium::world::material::MaterialSpec;
///
/// let material = MaterialSpec::new(MaterialId::new("mat.spark").unwrap(), "Spark");
/// let entity = EntityBuilder::new()
///     .id(EntityId::new("e1").unwrap())
///     .material(material)
///     .position(100.0, 100.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(entity.id().as_str(), "e1");
/// assert!(entity.emotion().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    material: MaterialSpec,
    /// Position in world pixels.
    pub pos: Vec2,
    /// Velocity in pixels per second.
    pub vel: Vec2,
    age: f64,
    /// Disorder, 0 to 1. Lowered by positive affect.
    pub entropy: f32,
    /// Energy reserve, 0 to 1.
    pub energy: f32,
    /// Visual presence, 0 to 1. Decays by the material's rate.
    pub opacity: f32,
    /// Body temperature in kelvin, when thermal.
    pub temperature: Option<f32>,
    /// Local humidity, 0 to 1, when tracked.
    pub humidity: Option<f32>,
    features: FeatureSet,
    memory: Option<MemoryBuffer>,
    emotion: Option<EmotionalState>,
    emotion_baseline: EmotionalState,
    intents: Option<IntentStack>,
    relationships: Option<BTreeMap<EntityId, Relationship>>,
    links: Option<CognitiveLinkMap>,
    learning: Option<LearningSystem>,
    skills: Option<SkillSystem>,
    crystallizer: Option<MemoryCrystallizer>,
    memory_log: MemoryLog,
    mailbox: Mailbox,
    native_language: String,
    language_weights: BTreeMap<String, f32>,
    autonomous: bool,
    trigger_context: BTreeMap<String, serde_json::Value>,
    rule_cooldowns: BTreeMap<usize, f64>,
}

impl Entity {
    pub(crate) fn from_parts(
        id: EntityId,
        material: MaterialSpec,
        pos: Vec2,
        vel: Vec2,
        features: FeatureSet,
        emotion: Option<EmotionalState>,
        memory_capacity: usize,
        native_language: String,
        language_weights: BTreeMap<String, f32>,
        autonomous: bool,
        temperature: Option<f32>,
        humidity: Option<f32>,
    ) -> Self {
        let memory_log = MemoryLog::new(id.clone());
        let mut entity = Entity {
            id,
            pos,
            vel,
            age: 0.0,
            entropy: 0.5,
            energy: 1.0,
            opacity: 1.0,
            temperature: temperature.or(material.physics.temperature),
            humidity: humidity.or(material.physics.humidity),
            material,
            features: FeatureSet::none(),
            memory: None,
            emotion: None,
            emotion_baseline: EmotionalState::neutral(),
            intents: None,
            relationships: None,
            links: None,
            learning: None,
            skills: None,
            crystallizer: None,
            memory_log,
            mailbox: Mailbox::new(),
            native_language,
            language_weights,
            autonomous,
            trigger_context: BTreeMap::new(),
            rule_cooldowns: BTreeMap::new(),
        };
        for feature in Feature::ALL {
            if features.contains(feature) {
                entity.enable(feature);
            }
        }
        if entity.features.memory {
            entity.memory = Some(MemoryBuffer::new(memory_capacity));
        }
        if let Some(initial) = emotion {
            if entity.features.emotion {
                entity.emotion = Some(initial);
            }
        }
        entity
    }

    // Identity and scalars

    /// Returns the entity's id.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Returns the material this entity was spawned from.
    #[must_use]
    pub fn material(&self) -> &MaterialSpec {
        &self.material
    }

    /// Returns the material id.
    #[must_use]
    pub fn material_id(&self) -> &MaterialId {
        &self.material.id
    }

    /// Seconds since spawn.
    #[must_use]
    pub fn age(&self) -> f64 {
        self.age
    }

    pub(crate) fn set_age(&mut self, age: f64) {
        self.age = age;
    }

    /// Whether the entity generates its own intents.
    #[must_use]
    pub fn autonomous(&self) -> bool {
        self.autonomous
    }

    /// Sets autonomy.
    pub fn set_autonomous(&mut self, autonomous: bool) {
        self.autonomous = autonomous;
    }

    /// Native language code.
    #[must_use]
    pub fn native_language(&self) -> &str {
        &self.native_language
    }

    /// Language selection weights.
    #[must_use]
    pub fn language_weights(&self) -> &BTreeMap<String, f32> {
        &self.language_weights
    }

    // Feature management

    /// Returns the feature set.
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Returns whether a feature is enabled.
    #[must_use]
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }

    /// Enables a feature, creating its component if absent.
    pub fn enable(&mut self, feature: Feature) {
        self.features.set(feature, true);
        match feature {
            Feature::Memory => {
                if self.memory.is_none() {
                    self.memory = Some(MemoryBuffer::default());
                }
            }
            Feature::Emotion => {
                if self.emotion.is_none() {
                    self.emotion = Some(EmotionalState::neutral());
                }
            }
            Feature::Intent => {
                if self.intents.is_none() {
                    self.intents = Some(IntentStack::new());
                }
            }
            Feature::Relationships => {
                if self.relationships.is_none() {
                    self.relationships = Some(BTreeMap::new());
                }
            }
            Feature::CognitiveLinks => {
                if self.links.is_none() {
                    self.links = Some(CognitiveLinkMap::new());
                }
            }
            Feature::Learning => {
                if self.learning.is_none() {
                    self.learning = Some(LearningSystem::new());
                }
            }
            Feature::Skills => {
                if self.skills.is_none() {
                    self.skills = Some(SkillSystem::new());
                }
            }
            Feature::Consolidation => {
                if self.crystallizer.is_none() {
                    self.crystallizer = Some(MemoryCrystallizer::default());
                }
            }
        }
    }

    /// Disables a feature and drops its component.
    pub fn disable(&mut self, feature: Feature) {
        self.features.set(feature, false);
        match feature {
            Feature::Memory => self.memory = None,
            Feature::Emotion => self.emotion = None,
            Feature::Intent => self.intents = None,
            Feature::Relationships => self.relationships = None,
            Feature::CognitiveLinks => self.links = None,
            Feature::Learning => self.learning = None,
            Feature::Skills => self.skills = None,
            Feature::Consolidation => self.crystallizer = None,
        }
    }

    // Component access

    /// The memory buffer, when the memory feature is on.
    #[must_use]
    pub fn memory(&self) -> Option<&MemoryBuffer> {
        self.memory.as_ref()
    }

    pub(crate) fn memory_mut(&mut self) -> Option<&mut MemoryBuffer> {
        self.memory.as_mut()
    }

    /// The emotional state, when the emotion feature is on.
    #[must_use]
    pub fn emotion(&self) -> Option<&EmotionalState> {
        self.emotion.as_ref()
    }

    /// Mutable emotional state.
    pub fn emotion_mut(&mut self) -> Option<&mut EmotionalState> {
        self.emotion.as_mut()
    }

    /// The neutral point this entity drifts back to.
    #[must_use]
    pub fn emotion_baseline(&self) -> &EmotionalState {
        &self.emotion_baseline
    }

    /// The intent stack, when the intent feature is on.
    #[must_use]
    pub fn intents(&self) -> Option<&IntentStack> {
        self.intents.as_ref()
    }

    pub(crate) fn intents_mut(&mut self) -> Option<&mut IntentStack> {
        self.intents.as_mut()
    }

    /// Relationships keyed by target id.
    #[must_use]
    pub fn relationships(&self) -> Option<&BTreeMap<EntityId, Relationship>> {
        self.relationships.as_ref()
    }

    /// Mutable relationships map.
    pub fn relationships_mut(&mut self) -> Option<&mut BTreeMap<EntityId, Relationship>> {
        self.relationships.as_mut()
    }

    /// The relationship toward a specific target, if any.
    #[must_use]
    pub fn relationship_with(&self, target: &EntityId) -> Option<&Relationship> {
        self.relationships.as_ref()?.get(target)
    }

    /// Cognitive links, when the feature is on.
    #[must_use]
    pub fn cognitive_links(&self) -> Option<&CognitiveLinkMap> {
        self.links.as_ref()
    }

    /// Mutable cognitive links.
    pub fn cognitive_links_mut(&mut self) -> Option<&mut CognitiveLinkMap> {
        self.links.as_mut()
    }

    /// The learning system, when the feature is on.
    #[must_use]
    pub fn learning(&self) -> Option<&LearningSystem> {
        self.learning.as_ref()
    }

    /// Mutable learning system.
    pub fn learning_mut(&mut self) -> Option<&mut LearningSystem> {
        self.learning.as_mut()
    }

    /// The skill system, when the feature is on.
    #[must_use]
    pub fn skills(&self) -> Option<&SkillSystem> {
        self.skills.as_ref()
    }

    /// Mutable skill system.
    pub fn skills_mut(&mut self) -> Option<&mut SkillSystem> {
        self.skills.as_mut()
    }

    /// The crystallizer, when the consolidation feature is on.
    #[must_use]
    pub fn crystallizer(&self) -> Option<&MemoryCrystallizer> {
        self.crystallizer.as_ref()
    }

    /// The replicated memory log.
    #[must_use]
    pub fn memory_log(&self) -> &MemoryLog {
        &self.memory_log
    }

    /// Mutable replicated memory log.
    pub fn memory_log_mut(&mut self) -> &mut MemoryLog {
        &mut self.memory_log
    }

    pub(crate) fn set_memory_log(&mut self, log: MemoryLog) {
        self.memory_log = log;
    }

    /// The mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub(crate) fn mailbox_mut(&mut self) -> &mut Mailbox {
        &mut self.mailbox
    }

    /// Entity-local trigger context overrides.
    #[must_use]
    pub fn trigger_context(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.trigger_context
    }

    /// Sets a local context value. Unknown keys are preserved for rule
    /// evaluation.
    pub fn set_context(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.trigger_context.insert(key.into(), value);
    }

    // Tick operations

    /// Advances intrinsic state by one step.
    ///
    /// Ages the entity, decays opacity by the material's rate, applies
    /// friction, and, for autonomous entities with an empty intent
    /// stack, produces a new intent: a learning suggestion when one
    /// exists, else the deterministic emotion-driven generator.
    pub fn update(&mut self, dt: f64, now: f64, rng: &mut SimRng) {
        self.age += dt;
        self.opacity =
            (self.opacity - self.material.physics.decay_rate * dt as f32).clamp(0.0, 1.0);
        let damping = (1.0 - self.material.physics.friction * dt as f32).max(0.0);
        self.vel = self.vel * damping;

        if self.autonomous && self.features.intent {
            if let Some(stack) = self.intents.as_mut() {
                stack.update(now);
                if stack.is_empty() {
                    let suggested = self
                        .learning
                        .as_ref()
                        .and_then(|learning| learning.suggest(now));
                    let intent = match suggested {
                        Some(intent) => intent,
                        None => generate_intent(self.emotion.as_ref(), now, rng),
                    };
                    stack.push(intent);
                }
            }
        }
    }

    /// Integrates position from velocity.
    pub fn integrate(&mut self, dt: f64) {
        self.pos += self.vel * dt as f32;
    }

    /// Records a memory. No-op when the memory feature is off.
    ///
    /// The memory is also appended to the replicated log so trusted
    /// peers can receive it at sync points.
    pub fn remember(
        &mut self,
        kind: MemoryKind,
        subject: MemorySubject,
        content: MemoryContent,
        salience: f32,
        now: f64,
    ) {
        if !self.features.memory {
            return;
        }
        let memory = Memory::new(now, kind, subject, content, salience);
        if let Some(buffer) = self.memory.as_mut() {
            buffer.add(memory.clone());
        }
        self.memory_log.append(memory, now);
    }

    /// Applies an emotion delta. No-op when the emotion feature is off.
    pub fn feel(&mut self, delta: &EmotionDelta) {
        if let Some(emotion) = self.emotion.as_mut() {
            emotion.apply_delta(delta);
        }
    }

    /// Pushes an explicit intent. No-op when the intent feature is off.
    ///
    /// Explicit pushes outrank learning suggestions and the autonomous
    /// generator, which only run on an empty stack.
    pub fn set_intent(&mut self, intent: Intent) {
        if !self.features.intent {
            return;
        }
        let goal_text = intent.goal.as_str().to_string();
        let created = intent.created;
        if let Some(stack) = self.intents.as_mut() {
            stack.push(intent);
        }
        self.remember(
            MemoryKind::IntentChange,
            MemorySubject::Own,
            MemoryContent::text(goal_text),
            INTENT_MEMORY_SALIENCE,
            created,
        );
    }

    /// Synthesizes a thought from recent memories, current emotion,
    /// learned patterns and the active intent.
    #[must_use]
    pub fn reflect(&self, stimulus: Option<&str>, now: f64) -> Thought {
        let mut parts: Vec<String> = Vec::new();
        if let Some(stimulus) = stimulus {
            parts.push(format!("considering {stimulus}"));
        }
        if let Some(buffer) = &self.memory {
            let fresh = buffer.recent(3).len();
            if fresh > 0 {
                parts.push(format!("{fresh} recent memories surface"));
            }
        }
        let label = self.emotion.as_ref().map(EmotionalState::label);
        if let Some(label) = label {
            parts.push(format!("feeling {}", label.as_str()));
        }
        let pattern_count = self.learning.as_ref().map_or(0, LearningSystem::pattern_count);
        if pattern_count > 0 {
            parts.push(format!("{pattern_count} learned patterns"));
        }
        let motivation = self
            .intents
            .as_ref()
            .and_then(|stack| stack.current(now))
            .map_or(0.0, |intent| {
                parts.push(format!("drawn toward {}", intent.goal.as_str()));
                intent.motivation
            });
        let text = if parts.is_empty() {
            "a quiet mind".to_string()
        } else {
            parts.join(", ")
        };
        Thought {
            timestamp: now,
            text,
            emotion: label,
            pattern_count,
            motivation,
        }
    }

    /// Produces a phrase for a dialogue category.
    ///
    /// Selection order: the material's dialogue table, then the builtin
    /// bank, then the builtin bank keyed by the current emotion label.
    /// An unresolvable category returns the literal `"..."`. Language
    /// comes from `lang` when given, else a weighted pick over the
    /// entity's language weights, else the native language.
    #[must_use]
    pub fn speak(&self, category: &str, lang: Option<&str>, rng: &mut SimRng) -> String {
        let lang = match lang {
            Some(lang) => lang.to_string(),
            None => self.pick_language(rng),
        };

        let phrase = self
            .material_phrase(category, &lang, rng)
            .or_else(|| pick_builtin(category, &lang, rng))
            .or_else(|| {
                self.emotion.as_ref().and_then(|emotion| {
                    let label = emotion.label();
                    pick_builtin(label.as_str(), &lang, rng)
                        .or_else(|| pick_builtin(label.as_str(), "en", rng))
                })
            });

        match phrase {
            Some(text) => {
                DialogueEnhancer.enhance(&text, self.emotion.as_ref(), &self.trigger_context)
            }
            None => {
                tracing::debug!(category, "no dialogue for category");
                "...".to_string()
            }
        }
    }

    fn material_phrase(&self, category: &str, lang: &str, rng: &mut SimRng) -> Option<String> {
        let phrases = self.material.dialogue.get(category)?;
        let in_lang: Vec<&str> = phrases
            .iter()
            .filter(|p| p.lang == lang)
            .map(|p| p.text.as_str())
            .collect();
        let pool: Vec<&str> = if in_lang.is_empty() {
            phrases.iter().map(|p| p.text.as_str()).collect()
        } else {
            in_lang
        };
        rng.pick(&pool).map(|text| (*text).to_string())
    }

    fn pick_language(&self, rng: &mut SimRng) -> String {
        if self.language_weights.is_empty() {
            return self.native_language.clone();
        }
        let keys: Vec<&String> = self.language_weights.keys().collect();
        let weights: Vec<f32> = self.language_weights.values().copied().collect();
        match rng.pick_weighted(&weights) {
            Some(idx) => keys[idx].clone(),
            None => self.native_language.clone(),
        }
    }

    /// Queues a message. `to = None` broadcasts within the world's
    /// broadcast radius at the next communication phase.
    pub fn send_message(&mut self, to: Option<EntityId>, content: impl Into<String>, now: f64) {
        self.mailbox.send(to, content, now);
    }

    /// Returns the oldest unread message, marking it read.
    pub fn read_next_message(&mut self) -> Option<InboxMessage> {
        self.mailbox.read_next()
    }

    /// Whether unread messages are waiting.
    #[must_use]
    pub fn has_unread_messages(&self) -> bool {
        self.mailbox.has_unread()
    }

    /// Evaluates the material's emotion transitions and behavior rules
    /// against a merged trigger context.
    pub(crate) fn apply_context_rules(
        &mut self,
        merged: &BTreeMap<String, serde_json::Value>,
        dt: f64,
        now: f64,
    ) {
        for transition in &self.material.emotion_transitions.clone() {
            if transition.when.evaluate(merged) {
                if let Some(emotion) = self.emotion.as_mut() {
                    let target = transition.target.prototype();
                    emotion.drift_toward(&target, (transition.rate * dt as f32).clamp(0.0, 1.0));
                }
            }
        }

        let rules = self.material.behavior_rules.clone();
        for (index, rule) in rules.iter().enumerate() {
            let ready = self
                .rule_cooldowns
                .get(&index)
                .map_or(true, |fired| now - fired >= rule.cooldown);
            if !ready || !rule.when.evaluate(merged) {
                continue;
            }
            self.rule_cooldowns.insert(index, now);
            match &rule.action {
                RuleAction::SetIntent {
                    goal,
                    motivation,
                    priority,
                } => {
                    self.set_intent(Intent::new(
                        Goal::Custom(goal.clone()),
                        *motivation,
                        *priority,
                        now,
                    ));
                }
                RuleAction::Feel(delta) => self.feel(delta),
            }
        }
    }

    /// Runs memory consolidation when due. No-op without the
    /// consolidation and memory features.
    pub(crate) fn consolidate(&mut self, now: f64) {
        if let (Some(crystallizer), Some(buffer)) = (self.crystallizer.as_mut(), self.memory.as_ref())
        {
            if crystallizer.due(now) {
                crystallizer.consolidate(buffer, now);
            }
        }
    }

    // Restore-path setters. The snapshot layer rebuilds an entity from
    // its DTO after constructing it through the builder.

    pub(crate) fn set_emotion_state(&mut self, emotion: Option<EmotionalState>) {
        self.emotion = emotion;
    }

    pub(crate) fn set_intent_stack(&mut self, intents: Option<IntentStack>) {
        self.intents = intents;
    }

    pub(crate) fn set_memory_buffer(&mut self, memory: Option<MemoryBuffer>) {
        self.memory = memory;
    }

    pub(crate) fn set_relationship_map(
        &mut self,
        relationships: Option<BTreeMap<EntityId, Relationship>>,
    ) {
        self.relationships = relationships;
    }

    pub(crate) fn set_link_map(&mut self, links: Option<CognitiveLinkMap>) {
        self.links = links;
    }

    pub(crate) fn set_learning_system(&mut self, learning: Option<LearningSystem>) {
        self.learning = learning;
    }

    pub(crate) fn set_skill_system(&mut self, skills: Option<SkillSystem>) {
        self.skills = skills;
    }

    pub(crate) fn set_crystallizer(&mut self, crystallizer: Option<MemoryCrystallizer>) {
        self.crystallizer = crystallizer;
    }

    pub(crate) fn set_trigger_context(&mut self, context: BTreeMap<String, serde_json::Value>) {
        self.trigger_context = context;
    }

    /// Drops relationship, link and intent entries that reference
    /// entities absent from `known`. Returns the number removed.
    pub(crate) fn prune_dangling(&mut self, known: &BTreeSet<EntityId>) -> usize {
        let mut removed = 0;
        if let Some(relationships) = self.relationships.as_mut() {
            let before = relationships.len();
            relationships.retain(|id, _| known.contains(id));
            removed += before - relationships.len();
        }
        if let Some(links) = self.links.as_mut() {
            for target in links.connected_ids() {
                if !known.contains(&target) {
                    links.disconnect(&target);
                    removed += 1;
                }
            }
        }
        if let Some(stack) = self.intents.as_mut() {
            let stale: Vec<EntityId> = stack
                .iter()
                .filter_map(|i| i.target.clone())
                .filter(|t| !known.contains(t))
                .collect();
            for target in stale {
                removed += stack.remove_target(&target);
            }
        }
        removed
    }
}

fn pick_builtin(category: &str, lang: &str, rng: &mut SimRng) -> Option<String> {
    builtin_phrases(category, lang)
        .and_then(|phrases| rng.pick(phrases))
        .map(|phrase| (*phrase).to_string())
}

/// The deterministic autonomous intent generator.
fn generate_intent(emotion: Option<&EmotionalState>, now: f64, rng: &mut SimRng) -> Intent {
    let intent = match emotion {
        Some(e) if e.arousal > 0.5 && e.valence > 0.0 => {
            Intent::new(Goal::Explore, 0.8 * e.arousal, 2, now)
        }
        Some(e) if e.arousal > 0.5 && e.valence < 0.0 => {
            Intent::new(Goal::Wander, 0.7 * e.arousal, 2, now)
        }
        Some(e) if e.arousal < 0.3 => {
            let goal = if rng.chance(0.5) { Goal::Rest } else { Goal::Observe };
            Intent::new(goal, 0.4, 1, now)
        }
        _ => Intent::new(Goal::Wander, 0.3, 1, now),
    };
    intent.with_timeout(GENERATED_INTENT_TIMEOUT)
}
