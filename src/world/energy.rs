//! Proximity collisions and thermal energy exchange.
//!
//! Collisions are detection-only: close pairs emit an event and any
//! physical resolution is a host concern. The energy system moves heat
//! between entities (hot to cold), couples entities to the ambient
//! temperature, and makes hot entities fade faster.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Thermal exchange coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySystem {
    /// Entity-to-entity heat flow rate per kelvin of difference.
    pub exchange_rate: f32,
    /// Coupling rate toward the ambient temperature.
    pub env_coupling: f32,
    /// Opacity loss per kelvin above the hot threshold per second.
    pub thermal_opacity_rate: f32,
    /// Temperature above which thermal decay applies, in kelvin.
    pub hot_threshold: f32,
}

impl Default for EnergySystem {
    fn default() -> Self {
        EnergySystem {
            exchange_rate: 0.1,
            env_coupling: 0.05,
            thermal_opacity_rate: 0.0002,
            hot_threshold: 330.0,
        }
    }
}

impl EnergySystem {
    /// Heat flowing from `a` to `b` over `dt`: `k * (T_a - T_b) * dt`.
    /// Negative when `b` is hotter.
    #[must_use]
    pub fn exchange(&self, temp_a: f32, temp_b: f32, dt: f64) -> f32 {
        self.exchange_rate * (temp_a - temp_b) * dt as f32
    }

    /// New temperature after coupling toward the ambient for `dt`.
    #[must_use]
    pub fn couple_to_ambient(&self, temp: f32, ambient: f32, dt: f64) -> f32 {
        temp + (ambient - temp) * (self.env_coupling * dt as f32).clamp(0.0, 1.0)
    }

    /// Opacity lost over `dt` at the given temperature.
    #[must_use]
    pub fn thermal_opacity_loss(&self, temp: f32, dt: f64) -> f32 {
        if temp > self.hot_threshold {
            (temp - self.hot_threshold) * self.thermal_opacity_rate * dt as f32
        } else {
            0.0
        }
    }
}

/// Index pairs (i < j) of entities within `radius` of each other.
#[must_use]
pub fn collision_pairs(entities: &[Entity], radius: f32) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            if entities[i].pos.distance_to(entities[j].pos) < radius {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
