//! A directed social bond between two entities.
//!
//! Relationships carry trust (earned through outcomes) and familiarity
//! (accumulated through contact). The combined strength weighs trust at
//! 0.7 and familiarity at 0.3.

use serde::{Deserialize, Serialize};

/// Initial trust for a fresh relationship.
pub const INITIAL_TRUST: f32 = 0.5;

/// Initial familiarity for a fresh relationship.
pub const INITIAL_FAMILIARITY: f32 = 0.1;

/// Weight of trust in the combined strength.
pub const TRUST_WEIGHT: f32 = 0.7;

/// Weight of familiarity in the combined strength.
pub const FAMILIARITY_WEIGHT: f32 = 0.3;

/// How an interaction went, from the updating side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionOutcome {
    Positive,
    Negative,
    Neutral,
}

/// Trust/familiarity bond toward another entity.
///
/// Stored in the owner's relationship map keyed by the target's id; the
/// reverse direction lives on the other entity and may differ.
///
/// # Examples
///
/// ```
/// use vivarium::relationship::{InteractionOutcome, Relationship};
///
/// let mut rel = Relationship::new();
/// rel.update(InteractionOutcome::Positive, 0.2, 5.0);
/// assert!((rel.trust - 0.7).abs() < f32::EPSILON);
/// assert!((rel.familiarity - 0.2).abs() < f32::EPSILON);
/// assert_eq!(rel.interaction_count, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Willingness to rely on the other party, 0 to 1.
    pub trust: f32,
    /// Accumulated contact, 0 to 1.
    pub familiarity: f32,
    /// World time of the most recent interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<f64>,
    /// Number of interactions recorded.
    pub interaction_count: u64,
}

impl Relationship {
    /// Creates a relationship with the default starting values.
    #[must_use]
    pub fn new() -> Self {
        Relationship::with_values(INITIAL_TRUST, INITIAL_FAMILIARITY)
    }

    /// Creates a relationship with explicit starting values, clamped.
    #[must_use]
    pub fn with_values(trust: f32, familiarity: f32) -> Self {
        Relationship {
            trust: trust.clamp(0.0, 1.0),
            familiarity: familiarity.clamp(0.0, 1.0),
            last_interaction: None,
            interaction_count: 0,
        }
    }

    /// Combined strength: `0.7 * trust + 0.3 * familiarity`.
    #[must_use]
    pub fn strength(&self) -> f32 {
        TRUST_WEIGHT * self.trust + FAMILIARITY_WEIGHT * self.familiarity
    }

    /// Records an interaction.
    ///
    /// Positive and negative outcomes move trust by `±strength`;
    /// familiarity grows by half the strength either way. Stamps
    /// `last_interaction` and increments the count.
    pub fn update(&mut self, outcome: InteractionOutcome, strength: f32, now: f64) {
        let strength = if strength.is_nan() { 0.0 } else { strength };
        match outcome {
            InteractionOutcome::Positive => {
                self.trust = (self.trust + strength).clamp(0.0, 1.0);
            }
            InteractionOutcome::Negative => {
                self.trust = (self.trust - strength).clamp(0.0, 1.0);
            }
            InteractionOutcome::Neutral => {}
        }
        self.familiarity = (self.familiarity + 0.5 * strength).clamp(0.0, 1.0);
        self.last_interaction = Some(now);
        self.interaction_count += 1;
    }

    /// Applies time decay: familiarity fades at `rate`, trust at half
    /// that rate. Both clamp at zero.
    pub fn decay(&mut self, dt: f64, rate: f32) {
        let loss = rate * dt as f32;
        if loss <= 0.0 {
            return;
        }
        self.familiarity = (self.familiarity - loss).max(0.0);
        self.trust = (self.trust - 0.5 * loss).max(0.0);
    }

    /// Boosts trust and familiarity (familiarity by half), clamped.
    /// Used by field effects.
    pub fn boost(&mut self, amount: f32) {
        if !amount.is_finite() {
            return;
        }
        self.trust = (self.trust + amount).clamp(0.0, 1.0);
        self.familiarity = (self.familiarity + 0.5 * amount).clamp(0.0, 1.0);
    }
}

impl Default for Relationship {
    fn default() -> Self {
        Relationship::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let rel = Relationship::new();
        assert!((rel.trust - 0.5).abs() < f32::EPSILON);
        assert!((rel.familiarity - 0.1).abs() < f32::EPSILON);
        assert!(rel.last_interaction.is_none());
        assert_eq!(rel.interaction_count, 0);
    }

    #[test]
    fn strength_formula_to_tolerance() {
        let rel = Relationship::with_values(0.8, 0.4);
        let expected = 0.7 * 0.8 + 0.3 * 0.4;
        assert!((rel.strength() - expected).abs() < 1e-9);
    }

    #[test]
    fn positive_outcome_raises_trust() {
        let mut rel = Relationship::new();
        rel.update(InteractionOutcome::Positive, 0.3, 1.0);
        assert!((rel.trust - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn negative_outcome_lowers_trust() {
        let mut rel = Relationship::new();
        rel.update(InteractionOutcome::Negative, 0.3, 1.0);
        assert!((rel.trust - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn neutral_outcome_leaves_trust_but_grows_familiarity() {
        let mut rel = Relationship::new();
        rel.update(InteractionOutcome::Neutral, 0.2, 1.0);
        assert!((rel.trust - 0.5).abs() < f32::EPSILON);
        assert!((rel.familiarity - 0.2).abs() < f32::EPSILON);
        assert_eq!(rel.last_interaction, Some(1.0));
    }

    #[test]
    fn update_clamps_trust() {
        let mut rel = Relationship::with_values(0.9, 0.1);
        rel.update(InteractionOutcome::Positive, 0.5, 1.0);
        assert_eq!(rel.trust, 1.0);
        rel.update(InteractionOutcome::Negative, 2.0, 2.0);
        assert_eq!(rel.trust, 0.0);
    }

    #[test]
    fn decay_hits_familiarity_twice_as_hard() {
        let mut rel = Relationship::with_values(0.5, 0.5);
        rel.decay(10.0, 0.01);
        assert!((rel.familiarity - 0.4).abs() < 1e-6);
        assert!((rel.trust - 0.45).abs() < 1e-6);
    }

    #[test]
    fn decay_clamps_at_zero() {
        let mut rel = Relationship::with_values(0.01, 0.01);
        rel.decay(100.0, 0.1);
        assert_eq!(rel.trust, 0.0);
        assert_eq!(rel.familiarity, 0.0);
    }

    #[test]
    fn boost_raises_both_dimensions() {
        let mut rel = Relationship::with_values(0.5, 0.2);
        rel.boost(0.1);
        assert!((rel.trust - 0.6).abs() < f32::EPSILON);
        assert!((rel.familiarity - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn boost_ignores_non_finite() {
        let mut rel = Relationship::new();
        rel.boost(f32::NAN);
        assert!((rel.trust - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn nan_strength_is_inert() {
        let mut rel = Relationship::new();
        rel.update(InteractionOutcome::Positive, f32::NAN, 1.0);
        assert!((rel.trust - 0.5).abs() < f32::EPSILON);
        assert_eq!(rel.interaction_count, 1);
    }
}
