//! Planner configuration.
//!
//! Layered with figment: built-in defaults, then a TOML file, then `CAPACITY_PLANNER_*`
//! environment variables (`__` separates nested keys, e.g.
//! `CAPACITY_PLANNER_SOLVER__MAX_STEPS=5000`).

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimizer::SolverOptions;

pub const ENV_PREFIX: &str = "CAPACITY_PLANNER_";
pub const DEFAULT_CONFIG_FILE: &str = "capacity-planner.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub solver: SolverOptions,

    /// Target wait in weeks used when `target` is run without `--target-wait`
    #[serde(default = "default_target_wait")]
    pub default_target_wait: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            solver: SolverOptions::default(),
            default_target_wait: default_target_wait(),
        }
    }
}

fn default_target_wait() -> f64 {
    5.0
}

impl PlannerConfig {
    /// Load from an explicit file, or from `capacity-planner.toml` in the working directory
    /// when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::figment(&path).extract::<Self>()?.validated()
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.solver.precision_factor < 1 {
            return Err(ConfigError::Validation {
                field: "solver.precision_factor".into(),
                reason: format!("must be at least 1, got {}", self.solver.precision_factor),
            });
        }
        if !self.default_target_wait.is_finite() || self.default_target_wait <= 0.0 {
            return Err(ConfigError::Validation {
                field: "default_target_wait".into(),
                reason: format!("must be a positive number of weeks, got {}", self.default_target_wait),
            });
        }
        Ok(self)
    }
}
