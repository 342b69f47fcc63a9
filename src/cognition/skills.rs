//! Named skills with practice saturation and decay.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One proficiency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Proficiency level, 0 to 1.
    pub level: f32,
    /// World time of the last practice.
    pub last_practiced: f64,
}

/// An entity's skill set.
///
/// Practicing raises a level toward 1 with diminishing returns; unused
/// skills decay each tick and vanish at zero.
///
/// # Examples
///
/// ```
/// use vivarium::cognition::SkillSystem;
///
/// let mut skills = SkillSystem::new();
/// skills.practice("foraging", 0.3, 0.0);
/// assert!(skills.level_of("foraging") > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkillSystem {
    skills: BTreeMap<String, Skill>,
}

impl SkillSystem {
    /// Creates an empty skill set.
    #[must_use]
    pub fn new() -> Self {
        SkillSystem::default()
    }

    /// Number of known skills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Returns true when no skills are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Practices a skill: the level closes `amount` of the remaining
    /// gap to 1, so early practice pays more than late practice.
    pub fn practice(&mut self, name: impl Into<String>, amount: f32, now: f64) {
        let amount = if amount.is_nan() {
            0.0
        } else {
            amount.clamp(0.0, 1.0)
        };
        let skill = self.skills.entry(name.into()).or_insert(Skill {
            level: 0.0,
            last_practiced: now,
        });
        skill.level += (1.0 - skill.level) * amount;
        skill.last_practiced = now;
    }

    /// Returns the level of a skill, or 0 when unknown.
    #[must_use]
    pub fn level_of(&self, name: &str) -> f32 {
        self.skills.get(name).map_or(0.0, |s| s.level)
    }

    /// Decays every skill by `rate * dt`; skills at zero are dropped.
    pub fn decay(&mut self, dt: f64, rate: f32) {
        let loss = rate * dt as f32;
        if loss <= 0.0 {
            return;
        }
        for skill in self.skills.values_mut() {
            skill.level -= loss;
        }
        self.skills.retain(|_, s| s.level > 0.0);
    }

    /// Iterates skills in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Skill)> {
        self.skills.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn practice_has_diminishing_returns() {
        let mut skills = SkillSystem::new();
        skills.practice("carving", 0.5, 0.0);
        let first = skills.level_of("carving");
        skills.practice("carving", 0.5, 1.0);
        let second = skills.level_of("carving");
        assert!((first - 0.5).abs() < f32::EPSILON);
        assert!((second - 0.75).abs() < f32::EPSILON);
        assert!(second - first < first);
    }

    #[test]
    fn practice_never_exceeds_one() {
        let mut skills = SkillSystem::new();
        for t in 0..100 {
            skills.practice("carving", 0.9, f64::from(t));
        }
        assert!(skills.level_of("carving") <= 1.0);
    }

    #[test]
    fn decay_removes_dead_skills() {
        let mut skills = SkillSystem::new();
        skills.practice("carving", 0.05, 0.0);
        skills.decay(1.0, 0.1);
        assert!(skills.is_empty());
        assert_eq!(skills.level_of("carving"), 0.0);
    }

    #[test]
    fn unknown_skill_is_zero() {
        let skills = SkillSystem::new();
        assert_eq!(skills.level_of("nothing"), 0.0);
    }

    #[test]
    fn nan_amount_is_inert() {
        let mut skills = SkillSystem::new();
        skills.practice("carving", f32::NAN, 0.0);
        assert_eq!(skills.level_of("carving"), 0.0);
    }
}
