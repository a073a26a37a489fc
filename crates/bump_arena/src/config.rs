//! Arena configuration
//!
//! Loaded from `arena.toml` (or `.ron`) next to the working directory, or the
//! path given as the first command-line argument. Missing files and missing
//! sections fall back to defaults.

use bump_engine::config::{Config, ConfigError};
use bump_engine::core::config::PhysicsConfig;
use serde::{Deserialize, Serialize};

/// What to spawn and how long to run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Seed for spawn placement and behaviour
    pub seed: u64,
    /// Ticks to simulate
    pub ticks: u64,
    /// Log a statistics line every this many ticks
    pub report_every: u64,
    /// Mesh tiles along each side
    pub tiles: usize,
    /// Tile edge length
    pub tile_size: f32,
    /// Wandering characters
    pub walkers: usize,
    /// Moving platforms
    pub platforms: usize,
    /// Rideable mounts
    pub mounts: usize,
    /// Characters that shoot arrows
    pub archers: usize,
    /// Money pickups scattered at start
    pub coins: usize,
    /// Ticks between arrows from one archer
    pub fire_interval: u64,
    /// Downward acceleration per tick for grounded characters
    pub gravity: f32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 600,
            report_every: 60,
            tiles: 32,
            tile_size: 128.0,
            walkers: 120,
            platforms: 6,
            mounts: 4,
            archers: 8,
            coins: 40,
            fire_interval: 30,
            gravity: 0.5,
        }
    }
}

/// Complete arena configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Collision engine tuning
    pub physics: PhysicsConfig,
    /// Scenario layout
    pub scenario: ScenarioConfig,
}

impl Config for ArenaConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        if self.scenario.tiles < 3 {
            return Err(ConfigError::Invalid {
                field: "scenario.tiles",
                reason: "the arena needs at least one open tile inside its walls".to_string(),
            });
        }
        if self.scenario.tile_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "scenario.tile_size",
                reason: "must be positive".to_string(),
            });
        }
        if self.scenario.report_every == 0 {
            return Err(ConfigError::Invalid {
                field: "scenario.report_every",
                reason: "must be at least one tick".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: ArenaConfig = toml::from_str(
            r#"
            [scenario]
            walkers = 10

            [physics.contact]
            friction = 0.2
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.scenario.walkers, 10);
        assert_eq!(config.scenario.ticks, 600);
        assert!((config.physics.contact.friction - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tiny_arena_rejected() {
        let mut config = ArenaConfig::default();
        config.scenario.tiles = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "scenario.tiles", .. })));
    }
}
