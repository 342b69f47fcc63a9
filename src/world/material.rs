//! Parsed material specifications and their registry.
//!
//! A material describes what a kind of entity is made of: physical
//! coefficients, a dialogue table, emotional transitions and behavior
//! rules driven by trigger context. The `.mdm` file format and its
//! parser live outside the engine; the kernel only consumes this parsed
//! representation. The registry must be re-supplied when restoring a
//! snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::emotion::{EmotionDelta, EmotionLabel};
use crate::types::MaterialId;

/// Physical coefficients of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPhysics {
    /// Mass in arbitrary units.
    pub mass: f32,
    /// Velocity damping per second, 0 to 1.
    pub friction: f32,
    /// Boundary restitution, 0 to 1.
    pub bounce: f32,
    /// Opacity loss per second.
    pub decay_rate: f32,
    /// Rest temperature in kelvin, when the material is thermal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Rest humidity, 0 to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f32>,
    /// Thermal conductivity used by the energy system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductivity: Option<f32>,
    /// Density, used by hosts; the kernel carries it through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f32>,
}

impl Default for MaterialPhysics {
    fn default() -> Self {
        MaterialPhysics {
            mass: 1.0,
            friction: 0.05,
            bounce: 0.5,
            decay_rate: 0.0,
            temperature: None,
            humidity: None,
            conductivity: None,
            density: None,
        }
    }
}

/// A single language-tagged phrase in a material's dialogue table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialoguePhrase {
    /// BCP-47-ish language code, e.g. `"en"`.
    pub lang: String,
    /// The phrase text.
    pub text: String,
}

/// Language profile of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Language used when no weights apply.
    pub native: String,
    /// Relative weights for language selection.
    pub weights: BTreeMap<String, f32>,
    /// Whether entities adapt language to their trigger context.
    pub adapt_to_context: bool,
}

impl Default for LanguageProfile {
    fn default() -> Self {
        LanguageProfile {
            native: "en".to_string(),
            weights: BTreeMap::new(),
            adapt_to_context: false,
        }
    }
}

/// Comparison operator of a context trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    Contains,
}

/// A predicate over the merged trigger context.
///
/// Keys are dot-delimited strings such as `user.message` or
/// `cpu.usage`; values are JSON scalars. A trigger whose key is missing
/// never fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextTrigger {
    /// Context key to inspect.
    pub key: String,
    /// Comparison to apply.
    pub op: CompareOp,
    /// Right-hand side of the comparison.
    pub value: serde_json::Value,
}

impl ContextTrigger {
    /// Evaluates the trigger against a merged context.
    #[must_use]
    pub fn evaluate(&self, context: &BTreeMap<String, serde_json::Value>) -> bool {
        let Some(actual) = context.get(&self.key) else {
            return false;
        };
        match self.op {
            CompareOp::Eq => actual == &self.value,
            CompareOp::NotEq => actual != &self.value,
            CompareOp::Gt => match (actual.as_f64(), self.value.as_f64()) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
            CompareOp::Lt => match (actual.as_f64(), self.value.as_f64()) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
            CompareOp::Contains => match (actual.as_str(), self.value.as_str()) {
                (Some(a), Some(b)) => a.contains(b),
                _ => false,
            },
        }
    }
}

/// Context-driven shift toward a named emotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionTransition {
    /// Trigger that activates the transition.
    pub when: ContextTrigger,
    /// Emotion the entity drifts toward while the trigger holds.
    pub target: EmotionLabel,
    /// Fraction of the gap closed per second.
    pub rate: f32,
}

/// Action taken when a behavior rule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Push a custom-goal intent.
    SetIntent {
        goal: String,
        motivation: f32,
        priority: i32,
    },
    /// Apply an emotion delta.
    Feel(EmotionDelta),
}

/// A trigger/action pair with a refire cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRule {
    /// Trigger that fires the rule.
    pub when: ContextTrigger,
    /// What happens when it fires.
    pub action: RuleAction,
    /// Seconds before the rule may fire again.
    pub cooldown: f64,
}

/// Parsed representation of one `.mdm` material document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Registry key.
    pub id: MaterialId,
    /// Human-readable name.
    pub name: String,
    /// Physical coefficients.
    #[serde(default)]
    pub physics: MaterialPhysics,
    /// Dialogue table: category to ordered phrases.
    #[serde(default)]
    pub dialogue: BTreeMap<String, Vec<DialoguePhrase>>,
    /// Context-driven emotion transitions.
    #[serde(default)]
    pub emotion_transitions: Vec<EmotionTransition>,
    /// Language profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageProfile>,
    /// Behavior rules.
    #[serde(default)]
    pub behavior_rules: Vec<BehaviorRule>,
}

impl MaterialSpec {
    /// Creates a minimal material with default physics.
    #[must_use]
    pub fn new(id: MaterialId, name: impl Into<String>) -> Self {
        MaterialSpec {
            id,
            name: name.into(),
            physics: MaterialPhysics::default(),
            dialogue: BTreeMap::new(),
            emotion_transitions: Vec::new(),
            language: None,
            behavior_rules: Vec::new(),
        }
    }
}

/// Owner collection of material specs, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialRegistry {
    materials: BTreeMap<MaterialId, MaterialSpec>,
}

impl MaterialRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        MaterialRegistry::default()
    }

    /// Registers a spec, replacing any previous spec with the same id.
    pub fn register(&mut self, spec: MaterialSpec) {
        self.materials.insert(spec.id.clone(), spec);
    }

    /// Looks up a spec by id.
    #[must_use]
    pub fn get(&self, id: &MaterialId) -> Option<&MaterialSpec> {
        self.materials.get(id)
    }

    /// Returns whether a spec is registered.
    #[must_use]
    pub fn contains(&self, id: &MaterialId) -> bool {
        self.materials.contains_key(id)
    }

    /// Number of registered specs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns true when the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
