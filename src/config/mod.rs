//! Configuration loading and validation.
//!
//! All knobs live in plain serde structs with named default functions,
//! loadable from YAML. Probabilities are validated to lie strictly inside
//! (0, 1); validation failures are structured errors, not panics.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::pathfinding::AStarConfig;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{field} must lie strictly between 0 and 1, got {value}")]
    ProbabilityRange { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MargaConfig {
    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub pathfinding: PathfindingConfig,

    #[serde(default)]
    pub localization: LocalizationConfig,
}

impl MargaConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.pathfinding.validate()?;
        self.localization.validate()
    }
}

/// Grid dimensions and scale.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridConfig {
    /// Grid height in cells
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Grid width in cells
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Edge length of one cell in meters
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            cell_size: default_cell_size(),
        }
    }
}

impl GridConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "grid.cell_size",
                value: self.cell_size,
            });
        }
        Ok(())
    }
}

/// Pathfinding knobs, mirrored into [`AStarConfig`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathfindingConfig {
    /// Use the Euclidean goal-distance heuristic
    #[serde(default = "default_true")]
    pub use_heuristic: bool,

    /// Scale applied to the heuristic term
    #[serde(default = "default_heuristic_weight")]
    pub heuristic_weight: f64,

    /// Goal satisfaction radius as a multiple of the cell radius
    #[serde(default = "default_goal_radius_factor")]
    pub goal_radius_factor: f64,

    /// Node expansion budget per search
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            use_heuristic: default_true(),
            heuristic_weight: default_heuristic_weight(),
            goal_radius_factor: default_goal_radius_factor(),
            max_expansions: default_max_expansions(),
        }
    }
}

impl PathfindingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.heuristic_weight <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "pathfinding.heuristic_weight",
                value: self.heuristic_weight,
            });
        }
        if self.goal_radius_factor <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "pathfinding.goal_radius_factor",
                value: self.goal_radius_factor,
            });
        }
        Ok(())
    }

    /// Build the runtime A* configuration for a grid of the given cell size.
    pub fn to_astar(&self, cell_size: f64) -> AStarConfig {
        AStarConfig {
            use_heuristic: self.use_heuristic,
            heuristic_weight: self.heuristic_weight,
            goal_radius: self.goal_radius_factor * cell_size / 2.0,
            max_expansions: self.max_expansions,
        }
    }
}

/// Belief-tracking knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalizationConfig {
    /// Probability a commanded move succeeds
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,

    /// Probability the terrain sensor reports the true class
    #[serde(default = "default_sensor_success")]
    pub sensor_success: f64,

    /// Number of ticks in one exploration round
    #[serde(default = "default_rounds")]
    pub rounds: usize,

    /// Belief pruning (off by default)
    #[serde(default)]
    pub pruning: PruneConfig,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            success_rate: default_success_rate(),
            sensor_success: default_sensor_success(),
            rounds: default_rounds(),
            pruning: PruneConfig::default(),
        }
    }
}

impl LocalizationConfig {
    /// Validate probability ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("localization.success_rate", self.success_rate),
            ("localization.sensor_success", self.sensor_success),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::ProbabilityRange { field, value });
            }
        }
        if self.pruning.enabled && self.pruning.threshold_factor <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "localization.pruning.threshold_factor",
                value: self.pruning.threshold_factor,
            });
        }
        Ok(())
    }
}

/// Adaptive belief pruning.
///
/// A cell is pruned once its belief stays below
/// `threshold_factor / active_cell_count` for `patience` consecutive
/// ticks. The current belief argmax and MAP cell are never pruned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PruneConfig {
    /// Enable pruning
    #[serde(default)]
    pub enabled: bool,

    /// Threshold as a fraction of the uniform probability
    #[serde(default = "default_prune_threshold")]
    pub threshold_factor: f64,

    /// Consecutive below-threshold ticks before a cell is pruned
    #[serde(default = "default_prune_patience")]
    pub patience: u32,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_factor: default_prune_threshold(),
            patience: default_prune_patience(),
        }
    }
}

// Default value functions for serde
fn default_rows() -> usize {
    20
}
fn default_cols() -> usize {
    20
}
fn default_cell_size() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_heuristic_weight() -> f64 {
    1.0
}
fn default_goal_radius_factor() -> f64 {
    1.5
}
fn default_max_expansions() -> usize {
    100_000
}
fn default_success_rate() -> f64 {
    0.9
}
fn default_sensor_success() -> f64 {
    0.9
}
fn default_rounds() -> usize {
    100
}
fn default_prune_threshold() -> f64 {
    1e-3
}
fn default_prune_patience() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        MargaConfig::default().validate().unwrap();
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
localization:
  success_rate: 0.8
  rounds: 40
"#;
        let config: MargaConfig = serde_yaml::from_str(yaml).unwrap();
        assert!((config.localization.success_rate - 0.8).abs() < 1e-12);
        assert_eq!(config.localization.rounds, 40);
        // Untouched sections keep their defaults.
        assert!((config.localization.sensor_success - 0.9).abs() < 1e-12);
        assert_eq!(config.grid.rows, 20);
    }

    #[test]
    fn test_probability_range_rejected() {
        let config = LocalizationConfig {
            success_rate: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityRange {
                field: "localization.success_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_goal_radius_scaling() {
        let config = PathfindingConfig::default();
        let astar = config.to_astar(1.0);
        // 1.5x the cell radius, the conventional approximate-goal radius.
        assert!((astar.goal_radius - 0.75).abs() < 1e-12);
    }
}
