use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use game_common::math::SceneWrap;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Settings of the simulated world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of a tick in milliseconds.
    pub timestep_ms: f32,
    /// Downward acceleration in m/s².
    pub gravity: f32,
    /// Width of the scene in pixels.
    pub scene_width: f32,
    pub wraps_x: bool,
    /// Screen shake per unit of kinetic energy of gibs, for bodies without an explicit amount.
    pub default_shake_per_unit_of_gib_energy: f32,
    pub max_screen_shake: f32,
    /// Seed of the world's random number generator. Seeded from entropy if unset.
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let mut file = File::open(path)?;

        let mut buf = String::new();
        file.read_to_string(&mut buf)?;

        buf.parse()
    }

    pub fn timestep(&self) -> Duration {
        Duration::from_secs_f32(self.timestep_ms.max(0.0) / 1000.0)
    }

    pub fn scene_wrap(&self) -> SceneWrap {
        SceneWrap {
            width: self.scene_width,
            wraps_x: self.wraps_x,
        }
    }

    /// Returns the gravity vector. The Y axis points down.
    pub fn gravity(&self) -> Vec2 {
        Vec2::new(0.0, self.gravity)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timestep_ms: 1000.0 / 60.0,
            gravity: 9.8,
            scene_width: 0.0,
            wraps_x: false,
            default_shake_per_unit_of_gib_energy: 0.001,
            max_screen_shake: 100.0,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use game_common::assert_approx_eq;
    use glam::Vec2;

    use super::Config;

    #[test]
    fn parse_partial() {
        let config: Config = "gravity = 20.0\nrng_seed = 7\n".parse().unwrap();

        assert_eq!(config.gravity(), Vec2::new(0.0, 20.0));
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.timestep_ms, Config::default().timestep_ms);
    }

    #[test]
    fn parse_invalid() {
        assert!("gravity = \"down\"".parse::<Config>().is_err());
    }

    #[test]
    fn timestep() {
        let config = Config {
            timestep_ms: 20.0,
            ..Default::default()
        };

        assert_approx_eq!(config.timestep().as_secs_f32(), 0.02, epsilon = 1e-6);
    }

    #[test]
    fn scene_wrap() {
        let config: Config = "scene_width = 400.0\nwraps_x = true".parse().unwrap();
        let wrap = config.scene_wrap();

        assert!(wrap.wraps_x);
        assert_eq!(wrap.width, 400.0);
    }
}
