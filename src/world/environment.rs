//! Spatial environment sampling.
//!
//! The environment exposes temperature, humidity, light and wind at any
//! point. A base state (mutated by weather each tick) is modulated by
//! smooth deterministic spatial variation, so two worlds with equal
//! base state sample identical values everywhere.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Environmental readings at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Temperature in kelvin.
    pub temperature: f32,
    /// Humidity, 0 to 1.
    pub humidity: f32,
    /// Light level, 0 to 1.
    pub light: f32,
    /// Wind vector in pixels per second.
    pub wind: Vec2,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        EnvironmentState {
            temperature: 293.15,
            humidity: 0.4,
            light: 1.0,
            wind: Vec2::ZERO,
        }
    }
}

/// The world's environment field.
///
/// # Examples
///
/// ```
/// use vivarium::world::environment::Environment;
///
/// let env = Environment::default();
/// let state = env.state_at(100.0, 200.0);
/// assert!(state.temperature > 0.0);
/// assert!((0.0..=1.0).contains(&state.humidity));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    base: EnvironmentState,
    /// Amplitude of spatial temperature variation, in kelvin.
    pub temperature_variation: f32,
    /// Amplitude of spatial humidity variation.
    pub humidity_variation: f32,
}

impl Environment {
    /// Creates an environment around a base state.
    #[must_use]
    pub fn new(base: EnvironmentState) -> Self {
        Environment {
            base,
            temperature_variation: 2.0,
            humidity_variation: 0.05,
        }
    }

    /// Returns the base state.
    #[must_use]
    pub fn base(&self) -> &EnvironmentState {
        &self.base
    }

    /// Mutable base state, used by the weather process.
    pub fn base_mut(&mut self) -> &mut EnvironmentState {
        &mut self.base
    }

    /// Samples the environment at a point.
    ///
    /// Spatial variation is a fixed pair of low-frequency waves; it
    /// depends only on position and the base state.
    #[must_use]
    pub fn state_at(&self, x: f32, y: f32) -> EnvironmentState {
        let ripple = (x * 0.011).sin() * (y * 0.013).cos();
        EnvironmentState {
            temperature: self.base.temperature + self.temperature_variation * ripple,
            humidity: (self.base.humidity + self.humidity_variation * ripple).clamp(0.0, 1.0),
            light: self.base.light.clamp(0.0, 1.0),
            wind: self.base.wind,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(EnvironmentState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_deterministic() {
        let env = Environment::default();
        let a = env.state_at(123.0, 456.0);
        let b = env.state_at(123.0, 456.0);
        assert_eq!(a, b);
    }

    #[test]
    fn sampling_varies_spatially() {
        let env = Environment::default();
        let a = env.state_at(0.0, 0.0);
        let b = env.state_at(150.0, 90.0);
        assert_ne!(a.temperature, b.temperature);
    }

    #[test]
    fn humidity_stays_in_range() {
        let mut env = Environment::default();
        env.base_mut().humidity = 0.999;
        for x in 0..20 {
            let state = env.state_at(x as f32 * 37.0, 11.0);
            assert!((0.0..=1.0).contains(&state.humidity));
        }
    }

    #[test]
    fn wind_passes_through_from_base() {
        let mut env = Environment::default();
        env.base_mut().wind = Vec2::new(3.0, -1.0);
        assert_eq!(env.state_at(5.0, 5.0).wind, Vec2::new(3.0, -1.0));
    }
}
