//! PAD emotional state and its algebra.
//!
//! Per the Mehrabian-Russell PAD model, affect is represented by three
//! orthogonal dimensions, valence (pleasantness), arousal (activation)
//! and dominance (sense of control), plus an optional vitality
//! dimension some materials carry. All mutation paths clamp to the
//! declared ranges and quarantine NaN inputs; the engine never
//! propagates NaN through affect.

use serde::{Deserialize, Serialize};

use crate::math::lerp;

/// Neutral baseline valence.
pub const NEUTRAL_VALENCE: f32 = 0.0;

/// Neutral baseline arousal.
pub const NEUTRAL_AROUSAL: f32 = 0.5;

/// Neutral baseline dominance.
pub const NEUTRAL_DOMINANCE: f32 = 0.5;

/// Emotional state in PAD space with optional vitality.
///
/// Ranges: valence in `[-1, 1]`, arousal, dominance and vitality in
/// `[0, 1]`. Every mutation clamps back into range, so the ranges hold
/// at every observation point.
///
/// # Examples
///
/// ```
/// use vivarium::emotion::{EmotionDelta, EmotionalState};
///
/// let mut state = EmotionalState::neutral();
/// state.apply_delta(&EmotionDelta::new(0.4, 0.2, 0.0));
/// assert!((state.valence - 0.4).abs() < f32::EPSILON);
/// assert!((state.arousal - 0.7).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Valence: pleasantness (-1 to 1).
    pub valence: f32,
    /// Arousal: activation (0 to 1).
    pub arousal: f32,
    /// Dominance: control (0 to 1).
    pub dominance: f32,
    /// Vitality: energy reserve (0 to 1), when the material models it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitality: Option<f32>,
}

/// A change to apply to an emotional state.
///
/// Components are added to the corresponding dimensions and the result
/// is clamped. NaN components are dropped rather than applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionDelta {
    /// Change in valence.
    pub valence: f32,
    /// Change in arousal.
    pub arousal: f32,
    /// Change in dominance.
    pub dominance: f32,
    /// Change in vitality; ignored when the state has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitality: Option<f32>,
}

impl EmotionDelta {
    /// Creates a delta over the three core dimensions.
    #[must_use]
    pub fn new(valence: f32, arousal: f32, dominance: f32) -> Self {
        EmotionDelta {
            valence,
            arousal,
            dominance,
            vitality: None,
        }
    }

    /// Adds a vitality component.
    #[must_use]
    pub fn with_vitality(mut self, vitality: f32) -> Self {
        self.vitality = Some(vitality);
        self
    }
}

/// The twelve named emotion labels used by reflection and dialogue
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionLabel {
    Excited,
    Happy,
    Relieved,
    Playful,
    Curious,
    Grateful,
    Anxious,
    Sad,
    Lonely,
    Inspired,
    Tired,
    Thinking,
}

impl EmotionLabel {
    /// All labels, in the order used for nearest-prototype matching.
    pub const ALL: [EmotionLabel; 12] = [
        EmotionLabel::Excited,
        EmotionLabel::Happy,
        EmotionLabel::Relieved,
        EmotionLabel::Playful,
        EmotionLabel::Curious,
        EmotionLabel::Grateful,
        EmotionLabel::Anxious,
        EmotionLabel::Sad,
        EmotionLabel::Lonely,
        EmotionLabel::Inspired,
        EmotionLabel::Tired,
        EmotionLabel::Thinking,
    ];

    /// PAD prototype for this label.
    #[must_use]
    pub fn prototype(self) -> EmotionalState {
        let (v, a, d) = match self {
            EmotionLabel::Excited => (0.7, 0.9, 0.6),
            EmotionLabel::Happy => (0.8, 0.6, 0.6),
            EmotionLabel::Relieved => (0.5, 0.25, 0.55),
            EmotionLabel::Playful => (0.7, 0.75, 0.7),
            EmotionLabel::Curious => (0.35, 0.6, 0.5),
            EmotionLabel::Grateful => (0.6, 0.4, 0.4),
            EmotionLabel::Anxious => (-0.5, 0.8, 0.25),
            EmotionLabel::Sad => (-0.7, 0.25, 0.3),
            EmotionLabel::Lonely => (-0.5, 0.35, 0.2),
            EmotionLabel::Inspired => (0.6, 0.7, 0.75),
            EmotionLabel::Tired => (-0.1, 0.1, 0.35),
            EmotionLabel::Thinking => (0.0, 0.45, 0.55),
        };
        EmotionalState::new(v, a, d)
    }

    /// The label's dialogue-category key, e.g. `"anxious"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Excited => "excited",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Relieved => "relieved",
            EmotionLabel::Playful => "playful",
            EmotionLabel::Curious => "curious",
            EmotionLabel::Grateful => "grateful",
            EmotionLabel::Anxious => "anxious",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Lonely => "lonely",
            EmotionLabel::Inspired => "inspired",
            EmotionLabel::Tired => "tired",
            EmotionLabel::Thinking => "thinking",
        }
    }
}

/// Advisory HSL color derived from an emotional state.
///
/// Used by renderers only; nothing in the kernel reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionColor {
    /// Hue in degrees, 0 to 240.
    pub hue: f32,
    /// Saturation, 0 to 1.
    pub saturation: f32,
    /// Lightness, 0 to 1.
    pub lightness: f32,
}

impl EmotionColor {
    /// Formats as a CSS `hsl()` value.
    #[must_use]
    pub fn to_css(self) -> String {
        format!(
            "hsl({:.0}, {:.0}%, {:.0}%)",
            self.hue,
            self.saturation * 100.0,
            self.lightness * 100.0
        )
    }
}

impl EmotionalState {
    /// Creates a state, clamping each component into range.
    #[must_use]
    pub fn new(valence: f32, arousal: f32, dominance: f32) -> Self {
        let mut state = EmotionalState {
            valence,
            arousal,
            dominance,
            vitality: None,
        };
        state.clamp_in_place();
        state
    }

    /// Creates the neutral baseline state (0, 0.5, 0.5).
    #[must_use]
    pub fn neutral() -> Self {
        EmotionalState::new(NEUTRAL_VALENCE, NEUTRAL_AROUSAL, NEUTRAL_DOMINANCE)
    }

    /// Adds a vitality dimension, clamped.
    #[must_use]
    pub fn with_vitality(mut self, vitality: f32) -> Self {
        self.vitality = Some(sanitize(vitality, 1.0).clamp(0.0, 1.0));
        self
    }

    fn clamp_in_place(&mut self) {
        self.valence = sanitize(self.valence, NEUTRAL_VALENCE).clamp(-1.0, 1.0);
        self.arousal = sanitize(self.arousal, NEUTRAL_AROUSAL).clamp(0.0, 1.0);
        self.dominance = sanitize(self.dominance, NEUTRAL_DOMINANCE).clamp(0.0, 1.0);
        if let Some(v) = self.vitality {
            self.vitality = Some(sanitize(v, 1.0).clamp(0.0, 1.0));
        }
    }

    /// Applies a delta component-wise with clamping.
    ///
    /// NaN delta components are dropped and logged; the state never
    /// leaves its declared ranges.
    pub fn apply_delta(&mut self, delta: &EmotionDelta) {
        if delta.valence.is_nan() || delta.arousal.is_nan() || delta.dominance.is_nan() {
            tracing::debug!("dropping NaN components from emotion delta");
        }
        self.valence = (self.valence + finite_or_zero(delta.valence)).clamp(-1.0, 1.0);
        self.arousal = (self.arousal + finite_or_zero(delta.arousal)).clamp(0.0, 1.0);
        self.dominance = (self.dominance + finite_or_zero(delta.dominance)).clamp(0.0, 1.0);
        if let (Some(v), Some(dv)) = (self.vitality, delta.vitality) {
            self.vitality = Some((v + finite_or_zero(dv)).clamp(0.0, 1.0));
        }
    }

    /// Moves each component toward a baseline by `rate` of the gap.
    pub fn drift_toward(&mut self, baseline: &EmotionalState, rate: f32) {
        let rate = finite_or_zero(rate).clamp(0.0, 1.0);
        self.valence += (baseline.valence - self.valence) * rate;
        self.arousal += (baseline.arousal - self.arousal) * rate;
        self.dominance += (baseline.dominance - self.dominance) * rate;
        if let (Some(v), Some(b)) = (self.vitality, baseline.vitality) {
            self.vitality = Some(v + (b - v) * rate);
        }
    }

    /// Euclidean distance in PAD space, including vitality when both
    /// states carry it.
    #[must_use]
    pub fn distance(&self, other: &EmotionalState) -> f32 {
        let dv = self.valence - other.valence;
        let da = self.arousal - other.arousal;
        let dd = self.dominance - other.dominance;
        let mut sum = dv * dv + da * da + dd * dd;
        if let (Some(a), Some(b)) = (self.vitality, other.vitality) {
            let dvit = a - b;
            sum += dvit * dvit;
        }
        sum.sqrt()
    }

    /// Linear blend of two states by `t` in `[0, 1]`.
    #[must_use]
    pub fn blend(&self, other: &EmotionalState, t: f32) -> EmotionalState {
        let mut out = EmotionalState::new(
            lerp(self.valence, other.valence, t),
            lerp(self.arousal, other.arousal, t),
            lerp(self.dominance, other.dominance, t),
        );
        if let (Some(a), Some(b)) = (self.vitality, other.vitality) {
            out.vitality = Some(lerp(a, b, t));
        }
        out
    }

    /// Pulls this state toward another by `strength`, in place.
    pub fn resonate(&mut self, other: &EmotionalState, strength: f32) {
        self.drift_toward(other, strength);
        self.clamp_in_place();
    }

    /// Returns the nearest named emotion label.
    #[must_use]
    pub fn label(&self) -> EmotionLabel {
        let mut best = EmotionLabel::Thinking;
        let mut best_dist = f32::INFINITY;
        for label in EmotionLabel::ALL {
            let d = self.distance(&label.prototype());
            if d < best_dist {
                best_dist = d;
                best = label;
            }
        }
        best
    }

    /// Deterministic color mapping: valence to hue (0..240 degrees),
    /// arousal to saturation, dominance to lightness. Advisory only.
    #[must_use]
    pub fn to_color(&self) -> EmotionColor {
        EmotionColor {
            hue: (self.valence + 1.0) / 2.0 * 240.0,
            saturation: self.arousal,
            lightness: 0.3 + 0.4 * self.dominance,
        }
    }

    /// Returns true when all components are finite and in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-1.0..=1.0).contains(&self.valence)
            && (0.0..=1.0).contains(&self.arousal)
            && (0.0..=1.0).contains(&self.dominance)
            && self.vitality.map_or(true, |v| (0.0..=1.0).contains(&v))
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        EmotionalState::neutral()
    }
}

fn sanitize(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_is_valid() {
        let state = EmotionalState::neutral();
        assert!(state.is_valid());
        assert_eq!(state.valence, 0.0);
        assert_eq!(state.arousal, 0.5);
        assert_eq!(state.dominance, 0.5);
    }

    #[test]
    fn new_clamps_out_of_range() {
        let state = EmotionalState::new(5.0, -1.0, 2.0);
        assert_eq!(state.valence, 1.0);
        assert_eq!(state.arousal, 0.0);
        assert_eq!(state.dominance, 1.0);
    }

    #[test]
    fn new_replaces_nan_with_defaults() {
        let state = EmotionalState::new(f32::NAN, f32::NAN, f32::NAN);
        assert_eq!(state.valence, 0.0);
        assert_eq!(state.arousal, 0.5);
        assert_eq!(state.dominance, 0.5);
    }

    #[test]
    fn apply_delta_clamps() {
        let mut state = EmotionalState::new(0.9, 0.9, 0.9);
        state.apply_delta(&EmotionDelta::new(0.5, 0.5, 0.5));
        assert_eq!(state.valence, 1.0);
        assert_eq!(state.arousal, 1.0);
        assert_eq!(state.dominance, 1.0);
    }

    #[test]
    fn apply_delta_drops_nan_components() {
        let mut state = EmotionalState::new(0.3, 0.4, 0.6);
        state.apply_delta(&EmotionDelta::new(f32::NAN, 0.1, f32::NAN));
        assert!((state.valence - 0.3).abs() < f32::EPSILON);
        assert!((state.arousal - 0.5).abs() < f32::EPSILON);
        assert!((state.dominance - 0.6).abs() < f32::EPSILON);
        assert!(state.is_valid());
    }

    #[test]
    fn drift_closes_the_gap() {
        let mut state = EmotionalState::new(1.0, 1.0, 0.0);
        let baseline = EmotionalState::neutral();
        state.drift_toward(&baseline, 0.5);
        assert!((state.valence - 0.5).abs() < f32::EPSILON);
        assert!((state.arousal - 0.75).abs() < f32::EPSILON);
        assert!((state.dominance - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = EmotionalState::new(0.5, 0.3, 0.7);
        let b = EmotionalState::new(-0.2, 0.8, 0.1);
        assert!((a.distance(&b) - b.distance(&a)).abs() < f32::EPSILON);
        assert!(a.distance(&a) < f32::EPSILON);
    }

    #[test]
    fn distance_includes_vitality_when_both_present() {
        let a = EmotionalState::neutral().with_vitality(1.0);
        let b = EmotionalState::neutral().with_vitality(0.0);
        assert!((a.distance(&b) - 1.0).abs() < f32::EPSILON);

        let c = EmotionalState::neutral();
        assert!(a.distance(&c) < f32::EPSILON);
    }

    #[test]
    fn blend_midpoint() {
        let a = EmotionalState::new(1.0, 0.0, 0.0);
        let b = EmotionalState::new(-1.0, 1.0, 1.0);
        let mid = a.blend(&b, 0.5);
        assert!(mid.valence.abs() < f32::EPSILON);
        assert!((mid.arousal - 0.5).abs() < f32::EPSILON);
        assert!((mid.dominance - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn resonate_moves_toward_other() {
        let mut a = EmotionalState::new(0.8, 0.6, 0.5);
        let b = EmotionalState::new(-0.6, 0.3, 0.4);
        let before = (a.valence - b.valence).abs();
        a.resonate(&b, 0.1);
        let after = (a.valence - b.valence).abs();
        assert!(after < before);
        assert!(a.is_valid());
    }

    #[test]
    fn label_matches_prototypes() {
        for label in EmotionLabel::ALL {
            assert_eq!(label.prototype().label(), label);
        }
    }

    #[test]
    fn label_of_neutral_is_thinking() {
        assert_eq!(EmotionalState::neutral().label(), EmotionLabel::Thinking);
    }

    #[test]
    fn color_mapping_extremes() {
        let negative = EmotionalState::new(-1.0, 0.0, 0.0).to_color();
        assert!(negative.hue.abs() < f32::EPSILON);
        let positive = EmotionalState::new(1.0, 1.0, 1.0).to_color();
        assert!((positive.hue - 240.0).abs() < f32::EPSILON);
        assert!((positive.saturation - 1.0).abs() < f32::EPSILON);
        assert!((positive.lightness - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn color_css_format() {
        let css = EmotionalState::neutral().to_color().to_css();
        assert!(css.starts_with("hsl("));
        assert!(css.ends_with(')'));
    }
}
