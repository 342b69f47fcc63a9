//! Idle-time decay of relationship maps.
//!
//! The decay manager erodes bonds that go without interaction. A grace
//! period protects recently active bonds; beyond it the configured
//! curve shapes how fast erosion accelerates, and bonds whose strength
//! falls below the prune threshold are removed at tick boundaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::relationship::Relationship;
use crate::types::EntityId;

/// Time constant, in seconds, over which the curves steepen.
const CURVE_SCALE: f64 = 60.0;

/// Shape of decay acceleration once the grace period is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayCurve {
    /// Constant rate regardless of idle time.
    #[default]
    Linear,
    /// Quadratic acceleration with idle time.
    Exponential,
    /// Rate grows only logarithmically with idle time.
    Logarithmic,
    /// Discrete steps: base rate, doubled, quadrupled.
    Stepped,
}

impl DecayCurve {
    /// Rate multiplier for a bond idle `over` seconds past its grace
    /// period.
    #[must_use]
    pub fn factor(self, over: f64) -> f32 {
        let x = (over / CURVE_SCALE).max(0.0);
        let factor = match self {
            DecayCurve::Linear => 1.0,
            DecayCurve::Exponential => (1.0 + x) * (1.0 + x),
            DecayCurve::Logarithmic => 1.0 + x.ln_1p(),
            DecayCurve::Stepped => {
                if x < 1.0 {
                    1.0
                } else if x < 5.0 {
                    2.0
                } else {
                    4.0
                }
            }
        };
        factor as f32
    }
}

/// Applies curve-shaped decay and pruning to relationship maps.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use vivarium::relationship::{DecayCurve, DecayManager, Relationship};
/// use vivarium::types::EntityId;
///
/// let manager = DecayManager::new(DecayCurve::Linear, 0.01, 5.0, 0.05);
/// let mut bonds = BTreeMap::new();
/// bonds.insert(EntityId::new("b").unwrap(), Relationship::new());
///
/// // Inside the grace period nothing changes.
/// manager.apply(&mut bonds, 1.0, 1.0);
/// assert!((bonds.values().next().unwrap().familiarity - 0.1).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayManager {
    /// Decay acceleration curve.
    pub curve: DecayCurve,
    /// Base familiarity loss per second.
    pub rate: f32,
    /// Seconds after the last interaction before decay starts.
    pub grace_period: f64,
    /// Bonds weaker than this are pruned.
    pub prune_threshold: f32,
}

impl DecayManager {
    /// Creates a manager with explicit settings.
    #[must_use]
    pub fn new(curve: DecayCurve, rate: f32, grace_period: f64, prune_threshold: f32) -> Self {
        DecayManager {
            curve,
            rate,
            grace_period,
            prune_threshold,
        }
    }

    /// Decays every bond past its grace period and prunes weak ones.
    ///
    /// Bonds that never interacted measure idleness from world start.
    /// Returns the ids pruned, in key order.
    pub fn apply(
        &self,
        relationships: &mut BTreeMap<EntityId, Relationship>,
        now: f64,
        dt: f64,
    ) -> Vec<EntityId> {
        for rel in relationships.values_mut() {
            let reference = rel.last_interaction.unwrap_or(0.0);
            let over = now - reference - self.grace_period;
            if over <= 0.0 {
                continue;
            }
            rel.decay(dt, self.rate * self.curve.factor(over));
        }

        let pruned: Vec<EntityId> = relationships
            .iter()
            .filter(|(_, rel)| rel.strength() < self.prune_threshold)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &pruned {
            relationships.remove(id);
        }
        pruned
    }
}

impl Default for DecayManager {
    fn default() -> Self {
        DecayManager::new(DecayCurve::Linear, 0.001, 30.0, 0.02)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::InteractionOutcome;

    fn bonds_with(rel: Relationship) -> BTreeMap<EntityId, Relationship> {
        let mut map = BTreeMap::new();
        map.insert(EntityId::new("b").unwrap(), rel);
        map
    }

    #[test]
    fn grace_period_blocks_decay() {
        let manager = DecayManager::new(DecayCurve::Linear, 0.1, 100.0, 0.0);
        let mut rel = Relationship::new();
        rel.update(InteractionOutcome::Neutral, 0.0, 50.0);
        let mut bonds = bonds_with(rel);

        manager.apply(&mut bonds, 60.0, 1.0);
        assert!((bonds.values().next().unwrap().familiarity - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn decay_applies_past_grace() {
        let manager = DecayManager::new(DecayCurve::Linear, 0.01, 1.0, 0.0);
        let mut rel = Relationship::with_values(0.5, 0.5);
        rel.last_interaction = Some(0.0);
        let mut bonds = bonds_with(rel);

        manager.apply(&mut bonds, 10.0, 1.0);
        let rel = bonds.values().next().unwrap();
        assert!((rel.familiarity - 0.49).abs() < 1e-6);
        assert!((rel.trust - 0.495).abs() < 1e-6);
    }

    #[test]
    fn curves_order_by_aggressiveness() {
        let over = 300.0;
        let linear = DecayCurve::Linear.factor(over);
        let log = DecayCurve::Logarithmic.factor(over);
        let stepped = DecayCurve::Stepped.factor(over);
        let exp = DecayCurve::Exponential.factor(over);
        assert!(linear < log);
        assert!(log < stepped);
        assert!(stepped < exp);
    }

    #[test]
    fn curve_factors_start_at_one() {
        for curve in [
            DecayCurve::Linear,
            DecayCurve::Exponential,
            DecayCurve::Logarithmic,
            DecayCurve::Stepped,
        ] {
            assert!((curve.factor(0.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn stepped_curve_steps() {
        assert_eq!(DecayCurve::Stepped.factor(30.0), 1.0);
        assert_eq!(DecayCurve::Stepped.factor(120.0), 2.0);
        assert_eq!(DecayCurve::Stepped.factor(400.0), 4.0);
    }

    #[test]
    fn weak_bonds_are_pruned() {
        let manager = DecayManager::new(DecayCurve::Linear, 0.0, 0.0, 0.2);
        let mut bonds = bonds_with(Relationship::with_values(0.1, 0.1));
        let pruned = manager.apply(&mut bonds, 1.0, 0.1);
        assert_eq!(pruned.len(), 1);
        assert!(bonds.is_empty());
    }

    #[test]
    fn strong_bonds_survive_pruning() {
        let manager = DecayManager::default();
        let mut bonds = bonds_with(Relationship::with_values(0.8, 0.5));
        let pruned = manager.apply(&mut bonds, 1.0, 0.1);
        assert!(pruned.is_empty());
        assert_eq!(bonds.len(), 1);
    }

    #[test]
    fn never_interacted_measures_idle_from_world_start() {
        let manager = DecayManager::new(DecayCurve::Linear, 0.01, 5.0, 0.0);
        let mut bonds = bonds_with(Relationship::with_values(0.5, 0.5));
        manager.apply(&mut bonds, 100.0, 1.0);
        assert!(bonds.values().next().unwrap().familiarity < 0.5);
    }
}
