//! World configuration and default tuning constants.
//!
//! Every second-order constant the kernel uses is surfaced here as a
//! tunable with the engine's defaults. The per-tick formulas that
//! consume them live in the relevant phases.

use serde::{Deserialize, Serialize};

use crate::emotion::CouplerPreset;
use crate::relationship::{DecayManager, DEFAULT_TRUST_THRESHOLD};
use crate::world::weather::WeatherPreset;

/// How the physical phase treats world edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryBehavior {
    /// Clamp position to the world rectangle.
    Clamp,
    /// Reflect velocity with damping.
    Bounce {
        /// Velocity retained after a bounce, 0 to 1.
        damping: f32,
    },
    /// Wrap around to the opposite edge.
    Wrap,
}

/// Configuration of a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width in pixels.
    pub width: f32,
    /// World height in pixels.
    pub height: f32,
    /// Edge behavior.
    pub boundary: BoundaryBehavior,

    /// Master toggle for the physical phase extras (random walk,
    /// emotion-physics coupling).
    pub enable_physics: bool,
    /// Master toggle for weather, collisions and energy transfer.
    pub enable_environment: bool,
    /// Master toggle for the mental and relational phases.
    pub enable_ontology: bool,
    /// Master toggle for the cognitive phase.
    pub enable_cognition: bool,

    /// Distance within which two entities interact, in pixels.
    pub proximity_radius: f32,
    /// Radius of broadcast message delivery, in pixels.
    pub broadcast_radius: f32,
    /// Distance at which a collision event fires, in pixels.
    pub collision_radius: f32,

    /// Emotional contagion rate per second of proximity.
    pub contagion_rate: f32,
    /// Familiarity accrual per second of proximity.
    pub proximity_bond_rate: f32,
    /// Memory-strength threshold for mutual attraction.
    pub attraction_threshold: f32,
    /// Attraction force coefficient.
    pub attraction_rate: f32,

    /// Memory salience loss per second.
    pub memory_decay_rate: f32,
    /// Salience below which memories are forgotten.
    pub forget_threshold: f32,
    /// Seconds between forget sweeps.
    pub forget_interval: f64,
    /// Fraction of the emotion gap closed toward baseline per second.
    pub emotion_drift_rate: f32,

    /// Seconds a delivered message survives in an inbox.
    pub inbox_retention: f64,

    /// Emotional alignment threshold for a sync moment
    /// (`|dValence| + |dArousal|`).
    pub sync_threshold: f32,
    /// Seconds both sides must have interacted within.
    pub sync_recent_window: f64,
    /// Interactions required on both sides before sync can fire.
    pub sync_min_interactions: u64,
    /// Seconds between sync moments for the same pair.
    pub sync_cooldown: f64,
    /// How many of each side's latest memories replicate at a sync.
    pub sync_memory_count: usize,

    /// Familiarity above which absence produces longing.
    pub longing_familiarity: f32,
    /// Seconds without interaction before longing.
    pub longing_after: f64,
    /// Seconds between longing fields for the same pair.
    pub longing_cooldown: f64,

    /// Seconds between world-mind recomputations.
    pub stats_interval: f64,

    /// Link strength loss per second.
    pub link_decay_rate: f32,
    /// Skill level loss per second.
    pub skill_decay_rate: f32,

    /// Relationship decay curve, grace period and pruning.
    pub relationship_decay: DecayManager,
    /// Trust share threshold.
    pub trust_threshold: f32,
    /// Trust drift toward baseline per second; 0 disables.
    pub trust_decay_rate: f32,

    /// Emotion-to-physics preset.
    pub coupler: CouplerPreset,
    /// Weather preset.
    pub weather: WeatherPreset,

    /// Maximum retained world events.
    pub event_log_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width: 800.0,
            height: 600.0,
            boundary: BoundaryBehavior::Bounce { damping: 0.8 },
            enable_physics: true,
            enable_environment: true,
            enable_ontology: true,
            enable_cognition: true,
            proximity_radius: 80.0,
            broadcast_radius: 200.0,
            collision_radius: 24.0,
            contagion_rate: 0.05,
            proximity_bond_rate: 0.05,
            attraction_threshold: 0.3,
            attraction_rate: 0.01,
            memory_decay_rate: 0.01,
            forget_threshold: 0.1,
            forget_interval: 10.0,
            emotion_drift_rate: 0.01,
            inbox_retention: 60.0,
            sync_threshold: 0.15,
            sync_recent_window: 5.0,
            sync_min_interactions: 3,
            sync_cooldown: 30.0,
            sync_memory_count: 5,
            longing_familiarity: 0.6,
            longing_after: 30.0,
            longing_cooldown: 30.0,
            stats_interval: 1.0,
            link_decay_rate: 0.0005,
            skill_decay_rate: 0.001,
            relationship_decay: DecayManager::default(),
            trust_threshold: DEFAULT_TRUST_THRESHOLD,
            trust_decay_rate: 0.0,
            coupler: CouplerPreset::Neutral,
            weather: WeatherPreset::Calm,
            event_log_capacity: 1024,
        }
    }
}

impl WorldConfig {
    /// A minimal headless configuration: ontology only, no physics
    /// extras, no environment. Useful for tests that want the social
    /// machinery without weather noise.
    #[must_use]
    pub fn bare() -> Self {
        WorldConfig {
            enable_physics: false,
            enable_environment: false,
            ..WorldConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = WorldConfig::default();
        assert_eq!(config.proximity_radius, 80.0);
        assert_eq!(config.broadcast_radius, 200.0);
        assert_eq!(config.contagion_rate, 0.05);
        assert_eq!(config.memory_decay_rate, 0.01);
        assert_eq!(config.forget_interval, 10.0);
        assert_eq!(config.stats_interval, 1.0);
        assert_eq!(config.trust_threshold, 0.6);
    }

    #[test]
    fn bare_disables_physics_and_environment() {
        let config = WorldConfig::bare();
        assert!(!config.enable_physics);
        assert!(!config.enable_environment);
        assert!(config.enable_ontology);
    }
}
