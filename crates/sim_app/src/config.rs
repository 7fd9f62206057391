//! Simulation configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to
//! [`SimConfig::default`]. Command-line flags override individual fields
//! after loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Tunables for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Spatial hash cell size, in world units.
    pub cell_size: f32,
    /// World width, in world units.
    pub world_width: f32,
    /// World height, in world units.
    pub world_height: f32,
    /// Creatures spawned at startup.
    pub initial_entities: usize,
    /// Radius within which creatures flock with their own faction.
    pub neighbor_radius: f32,
    /// Radius within which creatures hurt the other faction.
    pub attack_radius: f32,
    /// Damage per second dealt by each enemy in range.
    pub attack_damage: f32,
    /// Speed cap applied after steering.
    pub max_speed: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 600,
            cell_size: 16.0,
            world_width: 512.0,
            world_height: 512.0,
            initial_entities: 200,
            neighbor_radius: 24.0,
            attack_radius: 4.0,
            attack_damage: 20.0,
            max_speed: 12.0,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in config {}", path.display()))
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.tick_rate.is_finite() && self.tick_rate > 0.0,
            "tick_rate must be > 0, got {}",
            self.tick_rate
        );
        ensure!(
            Duration::try_from_secs_f64(1.0 / self.tick_rate).is_ok(),
            "tick_rate {} gives an unrepresentable tick duration",
            self.tick_rate
        );
        ensure!(
            self.cell_size.is_finite() && self.cell_size > 0.0,
            "cell_size must be > 0, got {}",
            self.cell_size
        );
        ensure!(
            self.world_width.is_finite()
                && self.world_height.is_finite()
                && self.world_width > 0.0
                && self.world_height > 0.0,
            "world dimensions must be finite and > 0, got {}x{}",
            self.world_width,
            self.world_height
        );
        ensure!(
            is_non_negative(self.neighbor_radius) && is_non_negative(self.attack_radius),
            "radii must be finite and >= 0"
        );
        ensure!(
            is_non_negative(self.attack_damage),
            "attack_damage must be finite and >= 0"
        );
        ensure!(
            is_non_negative(self.max_speed),
            "max_speed must be finite and >= 0"
        );
        Ok(())
    }
}

fn is_non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json_str(r#"{ "cell_size": 32.0, "max_ticks": 5 }"#).unwrap();
        assert_eq!(config.cell_size, 32.0);
        assert_eq!(config.max_ticks, 5);
        assert_eq!(config.tick_rate, SimConfig::default().tick_rate);
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let err = SimConfig::from_json_str(r#"{ "cell_size": 0.0 }"#).unwrap_err();
        assert!(err.to_string().contains("cell_size"));
    }

    #[test]
    fn test_rejects_vanishing_tick_rate() {
        let err = SimConfig::from_json_str(r#"{ "tick_rate": 1e-300 }"#).unwrap_err();
        assert!(err.to_string().contains("tick duration"));
    }

    #[test]
    fn test_rejects_infinite_world() {
        let config = SimConfig {
            world_width: f32::INFINITY,
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("world dimensions"));
    }

    #[test]
    fn test_rejects_nan_radius() {
        let config = SimConfig {
            attack_radius: f32::NAN,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(SimConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
