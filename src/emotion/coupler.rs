//! Emotion-to-physics coupling.
//!
//! A pure mapping from an emotional state to the movement parameters of
//! an autonomous random walk. The kernel consults it when nudging
//! autonomous entities; it never mutates emotion.

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionalState;

/// Movement parameters derived from emotion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplingOutput {
    /// Maximum speed in pixels per second.
    pub speed: f32,
    /// Effective mass; higher mass damps applied forces.
    pub mass: f32,
    /// Magnitude of the random-walk impulse.
    pub force: f32,
}

/// Preset coefficient sets for the coupler.
///
/// - `Expressive`: emotion moves the body strongly.
/// - `Restrained`: emotion barely shows in movement.
/// - `Neutral`: middle ground, the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplerPreset {
    Expressive,
    Restrained,
    #[default]
    Neutral,
}

impl CouplerPreset {
    /// Scalar coefficients (speed gain, force gain) for this preset.
    #[must_use]
    pub fn coefficients(self) -> (f32, f32) {
        match self {
            CouplerPreset::Expressive => (1.5, 1.6),
            CouplerPreset::Restrained => (0.5, 0.4),
            CouplerPreset::Neutral => (1.0, 1.0),
        }
    }
}

/// Pure emotion-to-physics mapping with a preset coefficient set.
///
/// # Examples
///
/// ```
/// use vivarium::emotion::{EmotionalState, EmotionCoupler};
///
/// let coupler = EmotionCoupler::default();
/// let calm = coupler.map(&EmotionalState::new(0.0, 0.1, 0.5));
/// let agitated = coupler.map(&EmotionalState::new(-0.2, 0.9, 0.5));
/// assert!(agitated.speed > calm.speed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionCoupler {
    /// Active preset.
    pub preset: CouplerPreset,
}

/// Base speed of an entity with mid-range arousal, pixels per second.
const BASE_SPEED: f32 = 40.0;

/// Base mass; low dominance raises it (timid entities move sluggishly).
const BASE_MASS: f32 = 1.0;

/// Base random-walk impulse magnitude.
const BASE_FORCE: f32 = 8.0;

impl EmotionCoupler {
    /// Creates a coupler with the given preset.
    #[must_use]
    pub fn new(preset: CouplerPreset) -> Self {
        EmotionCoupler { preset }
    }

    /// Maps an emotional state to movement parameters.
    ///
    /// Arousal drives speed and force, dominance lowers effective mass,
    /// and strong valence of either sign adds urgency to the impulse.
    #[must_use]
    pub fn map(&self, emotion: &EmotionalState) -> CouplingOutput {
        let (speed_gain, force_gain) = self.preset.coefficients();
        CouplingOutput {
            speed: BASE_SPEED * (0.5 + emotion.arousal) * speed_gain,
            mass: BASE_MASS * (1.5 - 0.5 * emotion.dominance),
            force: BASE_FORCE * (0.25 + emotion.arousal) * (0.5 + emotion.valence.abs())
                * force_gain,
        }
    }
}
