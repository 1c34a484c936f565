//! World configuration
//!
//! Every field has a default, so a JSON file only needs the values it wants
//! to change.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::island::SynthesisConstants;
use crate::train::TrainMotionConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed of the world RNG (placement, altitudes, random params)
    pub seed: u64,
    /// Radius of the disc islands spawn in
    pub world_radius: f32,
    /// Clearance kept between island footprints
    pub spawn_padding: f32,
    pub max_spawn_attempts: usize,
    /// Resolution before level-of-detail reduction
    pub base_resolution: u32,
    /// Fraction of the island radius the rail anchor sits from the centre
    pub anchor_inset: f32,
    /// Height of the rail line above the sampled surface
    pub rail_lift: f32,
    /// Clearance kept clear of rail at each anchor
    pub rail_min_offset: f32,
    pub altitude_min: f32,
    pub altitude_max: f32,
    pub train: TrainMotionConfig,
    pub synthesis: SynthesisConstants,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_radius: 220.0,
            spawn_padding: 6.0,
            max_spawn_attempts: 200,
            base_resolution: 160,
            anchor_inset: 0.55,
            rail_lift: 0.35,
            rail_min_offset: 0.5,
            altitude_min: 10.0,
            altitude_max: 28.0,
            train: TrainMotionConfig::default(),
            synthesis: SynthesisConstants::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_radius > 0.0) || !self.world_radius.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "world_radius must be positive, got {}",
                self.world_radius
            )));
        }
        if !(self.altitude_min <= self.altitude_max) {
            return Err(ConfigError::Invalid(format!(
                "altitude band is empty: {}..{}",
                self.altitude_min, self.altitude_max
            )));
        }
        if !(self.train.speed >= 0.0) || !self.train.speed.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "train.speed must be a non-negative number, got {}",
                self.train.speed
            )));
        }
        if !(0.0..=1.0).contains(&self.anchor_inset) {
            return Err(ConfigError::Invalid(format!(
                "anchor_inset must be within [0, 1], got {}",
                self.anchor_inset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = WorldConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = WorldConfig::from_json_str(r#"{"world_radius": 90.0, "train": {"speed": 3.0}}"#).unwrap();
        assert_eq!(config.world_radius, 90.0);
        assert_eq!(config.train.speed, 3.0);
        assert_eq!(config.train.y_offset, TrainMotionConfig::default().y_offset);
        assert_eq!(config.seed, WorldConfig::default().seed);
    }

    #[test]
    fn test_serialized_default_round_trips() {
        let json = serde_json::to_string(&WorldConfig::default()).unwrap();
        assert_eq!(WorldConfig::from_json_str(&json).unwrap(), WorldConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(WorldConfig::from_json_str("{not json"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            WorldConfig::from_json_str(r#"{"world_radius": -1.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WorldConfig::from_json_str(r#"{"altitude_min": 50.0, "altitude_max": 10.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WorldConfig::from_json_str(r#"{"train": {"speed": -4.0}}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = WorldConfig::from_path("/nonexistent/skyrail.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("skyrail.json"));
    }
}
