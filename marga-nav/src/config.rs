//! Configuration for the sampling planner family

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Planner variant selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerKind {
    /// Rapidly-exploring random tree
    Rrt,
    /// RRT with neighborhood rewiring (asymptotically optimal)
    RrtStar,
    /// Bidirectional RRT with an extend/connect policy
    RrtConnect,
    /// RRT* with ellipsoidal sampling once a solution exists
    InformedRrt,
    /// Informed RRT* with prior-set sampling, adaptive step,
    /// heavy-tailed growth, and parallel rewire
    QuickInformedRrt,
}

impl std::fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlannerKind::Rrt => "rrt",
            PlannerKind::RrtStar => "rrt_star",
            PlannerKind::RrtConnect => "rrt_connect",
            PlannerKind::InformedRrt => "informed_rrt",
            PlannerKind::QuickInformedRrt => "quick_informed_rrt",
        };
        write!(f, "{}", name)
    }
}

/// Planner configuration.
///
/// A value handed to the planner constructor; the planner keeps no other
/// global state. Unknown `planner_name` values fail at deserialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Which planner variant to run
    #[serde(default = "default_planner_name")]
    pub planner_name: PlannerKind,

    /// Iteration budget per plan call
    #[serde(default = "default_sample_points")]
    pub sample_points: usize,

    /// Steering step: max distance between tree vertices (cells)
    #[serde(default = "default_sample_max_d")]
    pub sample_max_d: f32,

    /// Rewire neighborhood radius (cells)
    #[serde(default = "default_optimization_r")]
    pub optimization_r: f32,

    /// Scales the lethal threshold used by collision tests, in `[0, 1]`
    #[serde(default = "default_obstacle_factor")]
    pub obstacle_factor: f32,

    /// Paint the grid border lethal before planning
    #[serde(default)]
    pub outline_map: bool,

    /// Accept goal contact within this world-frame distance (meters)
    #[serde(default)]
    pub default_tolerance: f32,

    /// Radius of the disks around the incumbent path used for
    /// concentrated sampling (cells, quick_informed_rrt only)
    #[serde(default = "default_prior_sample_set_r")]
    pub prior_sample_set_r: f32,

    /// Worker count for the parallel rewire phase (quick_informed_rrt only)
    #[serde(default = "default_rewire_threads_num")]
    pub rewire_threads_num: usize,

    /// Initial steering step for the adaptive policy
    /// (cells, quick_informed_rrt only)
    #[serde(default = "default_step_extend_d")]
    pub step_extend_d: f32,

    /// Degrees of freedom of the Student-t growth distribution
    /// (quick_informed_rrt only)
    #[serde(default = "default_t_distr_freedom")]
    pub t_distr_freedom: f32,

    /// RNG seed for deterministic planning; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            planner_name: default_planner_name(),
            sample_points: default_sample_points(),
            sample_max_d: default_sample_max_d(),
            optimization_r: default_optimization_r(),
            obstacle_factor: default_obstacle_factor(),
            outline_map: false,
            default_tolerance: 0.0,
            prior_sample_set_r: default_prior_sample_set_r(),
            rewire_threads_num: default_rewire_threads_num(),
            step_extend_d: default_step_extend_d(),
            t_distr_freedom: default_t_distr_freedom(),
            seed: None,
        }
    }
}

// Default value functions
fn default_planner_name() -> PlannerKind {
    PlannerKind::Rrt
}
fn default_sample_points() -> usize {
    500
}
fn default_sample_max_d() -> f32 {
    5.0
}
fn default_optimization_r() -> f32 {
    10.0
}
fn default_obstacle_factor() -> f32 {
    0.5
}
fn default_prior_sample_set_r() -> f32 {
    10.0
}
fn default_rewire_threads_num() -> usize {
    2
}
fn default_step_extend_d() -> f32 {
    5.0
}
fn default_t_distr_freedom() -> f32 {
    1.0
}

impl PlannerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PlannerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.sample_points == 0 {
            return Err(invalid("sample_points", "must be positive"));
        }
        if self.sample_max_d <= 0.0 {
            return Err(invalid(
                "sample_max_d",
                format!("must be positive, got {}", self.sample_max_d),
            ));
        }
        if self.optimization_r < 0.0 {
            return Err(invalid(
                "optimization_r",
                format!("must not be negative, got {}", self.optimization_r),
            ));
        }
        if !(0.0..=1.0).contains(&self.obstacle_factor) {
            return Err(invalid(
                "obstacle_factor",
                format!("must be in [0, 1], got {}", self.obstacle_factor),
            ));
        }
        if self.default_tolerance < 0.0 {
            return Err(invalid(
                "default_tolerance",
                format!("must not be negative, got {}", self.default_tolerance),
            ));
        }
        if self.prior_sample_set_r < 0.0 {
            return Err(invalid(
                "prior_sample_set_r",
                format!("must not be negative, got {}", self.prior_sample_set_r),
            ));
        }
        if self.rewire_threads_num == 0 {
            return Err(invalid("rewire_threads_num", "must be at least 1"));
        }
        if self.step_extend_d <= 0.0 {
            return Err(invalid(
                "step_extend_d",
                format!("must be positive, got {}", self.step_extend_d),
            ));
        }
        if self.t_distr_freedom <= 0.0 {
            return Err(invalid(
                "t_distr_freedom",
                format!("must be positive, got {}", self.t_distr_freedom),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.planner_name, PlannerKind::Rrt);
        assert_eq!(config.sample_points, 500);
        assert_eq!(config.sample_max_d, 5.0);
        assert_eq!(config.optimization_r, 10.0);
        assert_eq!(config.obstacle_factor, 0.5);
        assert!(!config.outline_map);
        assert_eq!(config.rewire_threads_num, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config: PlannerConfig = toml::from_str(
            r#"
            planner_name = "informed_rrt"
            sample_points = 2000
            optimization_r = 5.0
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.planner_name, PlannerKind::InformedRrt);
        assert_eq!(config.sample_points, 2000);
        assert_eq!(config.optimization_r, 5.0);
        assert_eq!(config.seed, Some(42));
        // Unset fields keep their defaults
        assert_eq!(config.sample_max_d, 5.0);
    }

    #[test]
    fn test_unknown_planner_name_rejected() {
        let result = toml::from_str::<PlannerConfig>(r#"planner_name = "dijkstra""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PlannerConfig {
            sample_points: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.sample_points = 100;
        config.sample_max_d = -1.0;
        assert!(config.validate().is_err());

        config.sample_max_d = 5.0;
        config.obstacle_factor = 1.5;
        assert!(config.validate().is_err());

        config.obstacle_factor = 0.5;
        config.rewire_threads_num = 0;
        assert!(config.validate().is_err());
    }
}
