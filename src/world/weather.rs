//! The stochastic weather process.
//!
//! Weather evolves through PRNG-driven transitions and mutates the
//! environment each tick: rain raises humidity, cloud cover dims light,
//! wind scales the base wind vector. All randomness flows through the
//! world's seeded stream, so weather is reproducible run to run.

use serde::{Deserialize, Serialize};

use crate::math::{SimRng, Vec2};
use crate::world::environment::Environment;

/// Named parameter presets for the weather process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherPreset {
    #[default]
    Calm,
    Stormy,
    Dry,
    Variable,
}

impl WeatherPreset {
    /// Resolves the preset to concrete parameters.
    #[must_use]
    pub fn config(self) -> WeatherConfig {
        match self {
            WeatherPreset::Calm => WeatherConfig {
                rain_start_chance: 0.005,
                rain_stop_chance: 0.05,
                max_intensity: 0.4,
                wind_max: 4.0,
                evaporation_rate: 0.002,
            },
            WeatherPreset::Stormy => WeatherConfig {
                rain_start_chance: 0.08,
                rain_stop_chance: 0.01,
                max_intensity: 1.0,
                wind_max: 20.0,
                evaporation_rate: 0.001,
            },
            WeatherPreset::Dry => WeatherConfig {
                rain_start_chance: 0.0005,
                rain_stop_chance: 0.2,
                max_intensity: 0.2,
                wind_max: 8.0,
                evaporation_rate: 0.01,
            },
            WeatherPreset::Variable => WeatherConfig {
                rain_start_chance: 0.03,
                rain_stop_chance: 0.03,
                max_intensity: 0.8,
                wind_max: 12.0,
                evaporation_rate: 0.004,
            },
        }
    }
}

/// Concrete weather parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Chance per second that rain starts.
    pub rain_start_chance: f32,
    /// Chance per second that rain stops.
    pub rain_stop_chance: f32,
    /// Ceiling for rain intensity.
    pub max_intensity: f32,
    /// Ceiling for wind strength, pixels per second.
    pub wind_max: f32,
    /// Humidity loss per second without rain.
    pub evaporation_rate: f32,
}

/// Observable weather state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherState {
    /// Whether it is raining.
    pub rain: bool,
    /// Rain intensity, 0 to 1.
    pub rain_intensity: f32,
    /// Cloud cover, 0 to 1.
    pub cloud_cover: f32,
    /// Wind strength in pixels per second.
    pub wind_strength: f32,
    /// Wind direction in radians.
    pub wind_direction: f32,
    /// Current humidity loss per second.
    pub evaporation_rate: f32,
}

/// The weather process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    config: WeatherConfig,
    state: WeatherState,
}

impl Weather {
    /// Creates a weather process from a preset.
    #[must_use]
    pub fn new(preset: WeatherPreset) -> Self {
        Weather::with_config(preset.config())
    }

    /// Creates a weather process from explicit parameters.
    #[must_use]
    pub fn with_config(config: WeatherConfig) -> Self {
        Weather {
            config,
            state: WeatherState {
                evaporation_rate: config.evaporation_rate,
                ..WeatherState::default()
            },
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &WeatherState {
        &self.state
    }

    /// Returns the parameters.
    #[must_use]
    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    pub(crate) fn set_state(&mut self, state: WeatherState) {
        self.state = state;
    }

    /// Advances the stochastic process by one step.
    pub fn update(&mut self, dt: f64, rng: &mut SimRng) {
        let dt32 = dt as f32;

        if self.state.rain {
            if rng.chance(self.config.rain_stop_chance * dt32) {
                self.state.rain = false;
            }
        } else if rng.chance(self.config.rain_start_chance * dt32) {
            self.state.rain = true;
            self.state.rain_intensity =
                rng.range_f32(0.2, 1.0) * self.config.max_intensity;
        }

        // Intensity eases toward its target, cloud cover follows rain.
        let intensity_target = if self.state.rain {
            self.state.rain_intensity.max(0.1)
        } else {
            0.0
        };
        self.state.rain_intensity += (intensity_target - self.state.rain_intensity) * 0.5 * dt32;
        let cloud_target = if self.state.rain {
            (0.4 + self.state.rain_intensity).min(1.0)
        } else {
            0.1
        };
        self.state.cloud_cover += (cloud_target - self.state.cloud_cover) * 0.3 * dt32;

        // Wind takes a bounded random walk.
        let wind_step = rng.range_f32(-1.0, 1.0) * self.config.wind_max * 0.2 * dt32;
        self.state.wind_strength =
            (self.state.wind_strength + wind_step).clamp(0.0, self.config.wind_max);
        self.state.wind_direction += rng.range_f32(-0.5, 0.5) * dt32;

        self.state.evaporation_rate = self.config.evaporation_rate;
    }

    /// Applies the current state to the environment.
    pub fn apply(&self, environment: &mut Environment, dt: f64) {
        let dt32 = dt as f32;
        let base = environment.base_mut();

        if self.state.rain {
            base.humidity =
                (base.humidity + self.state.rain_intensity * 0.02 * dt32).clamp(0.0, 1.0);
        } else {
            base.humidity = (base.humidity - self.state.evaporation_rate * dt32).clamp(0.0, 1.0);
        }
        base.light = (1.0 - 0.7 * self.state.cloud_cover).clamp(0.0, 1.0);
        base.wind = Vec2::new(
            self.state.wind_direction.cos(),
            self.state.wind_direction.sin(),
        ) * self.state.wind_strength;
    }
}

impl Default for Weather {
    fn default() -> Self {
        Weather::new(WeatherPreset::Calm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_weather_trace() {
        let mut a = Weather::new(WeatherPreset::Variable);
        let mut b = Weather::new(WeatherPreset::Variable);
        let mut rng_a = SimRng::new(7);
        let mut rng_b = SimRng::new(7);
        for _ in 0..200 {
            a.update(0.1, &mut rng_a);
            b.update(0.1, &mut rng_b);
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn stormy_eventually_rains() {
        let mut weather = Weather::new(WeatherPreset::Stormy);
        let mut rng = SimRng::new(3);
        let mut rained = false;
        for _ in 0..2000 {
            weather.update(0.1, &mut rng);
            rained |= weather.state().rain;
        }
        assert!(rained);
    }

    #[test]
    fn rain_raises_humidity_and_clouds_dim_light() {
        let mut weather = Weather::new(WeatherPreset::Calm);
        weather.state.rain = true;
        weather.state.rain_intensity = 1.0;
        weather.state.cloud_cover = 1.0;

        let mut env = Environment::default();
        let humidity_before = env.base().humidity;
        weather.apply(&mut env, 1.0);

        assert!(env.base().humidity > humidity_before);
        assert!(env.base().light < 1.0);
    }

    #[test]
    fn dry_spell_evaporates_humidity() {
        let weather = Weather::new(WeatherPreset::Dry);
        let mut env = Environment::default();
        let before = env.base().humidity;
        weather.apply(&mut env, 10.0);
        assert!(env.base().humidity < before);
    }

    #[test]
    fn wind_strength_stays_bounded() {
        let mut weather = Weather::new(WeatherPreset::Stormy);
        let mut rng = SimRng::new(11);
        for _ in 0..1000 {
            weather.update(0.1, &mut rng);
            let strength = weather.state().wind_strength;
            assert!((0.0..=weather.config().wind_max).contains(&strength));
        }
    }

    #[test]
    fn applied_wind_matches_direction_and_strength() {
        let mut weather = Weather::default();
        weather.state.wind_strength = 5.0;
        weather.state.wind_direction = 0.0;
        let mut env = Environment::default();
        weather.apply(&mut env, 0.1);
        assert!((env.base().wind.x - 5.0).abs() < 1e-5);
        assert!(env.base().wind.y.abs() < 1e-5);
    }
}
