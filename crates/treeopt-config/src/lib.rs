//! Configuration system for treeopt.
//!
//! Load optimizer configuration from TOML or YAML to choose the solver
//! backend and its options without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use treeopt_config::{OptimizerConfig, OptionValue};
//! use std::time::Duration;
//!
//! let config = OptimizerConfig::from_toml_str(r#"
//!     solver_name = "bnb"
//!
//!     [solver_options]
//!     time_limit = 30
//!     mip_gap = 1e-4
//!     node_selection = "best_bound"
//! "#).unwrap();
//!
//! assert_eq!(config.solver_name, "bnb");
//! assert_eq!(config.solver_options.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(
//!     config.solver_options.extra.get("node_selection"),
//!     Some(&OptionValue::Text("best_bound".to_string()))
//! );
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use treeopt_config::OptimizerConfig;
//!
//! let config = OptimizerConfig::load("treeopt.toml").unwrap_or_default();
//! assert_eq!(config.solver_name, "bnb");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the built-in branch-and-bound backend.
pub const DEFAULT_SOLVER_NAME: &str = "bnb";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main optimizer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OptimizerConfig {
    /// Solver backend looked up in the registry.
    #[serde(default = "default_solver_name")]
    pub solver_name: String,

    /// Options applied to the backend before every solve.
    #[serde(default)]
    pub solver_options: SolverOptions,
}

fn default_solver_name() -> String {
    DEFAULT_SOLVER_NAME.to_string()
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            solver_name: default_solver_name(),
            solver_options: SolverOptions::default(),
        }
    }
}

impl OptimizerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file: YAML for `.yaml`/`.yml`, TOML otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, does not parse, or holds
    /// out-of-range option values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the solver backend name.
    pub fn with_solver_name(mut self, name: impl Into<String>) -> Self {
        self.solver_name = name.into();
        self
    }

    /// Sets the solve time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.solver_options.time_limit = Some(seconds);
        self
    }

    /// Sets the branch-and-bound node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.solver_options.node_limit = Some(nodes);
        self
    }

    /// Enables solver progress logging.
    pub fn with_tee(mut self, tee: bool) -> Self {
        self.solver_options.tee = tee;
        self
    }

    /// Adds a backend-specific passthrough option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.solver_options.extra.insert(key.into(), value.into());
        self
    }

    /// Checks option ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver_name.trim().is_empty() {
            return Err(ConfigError::Invalid("solver_name is empty".to_string()));
        }
        self.solver_options.validate()
    }
}

/// Options passed to a solver backend.
///
/// The named fields are understood by every built-in backend; anything else
/// lands in [`extra`](Self::extra) and is handed to the backend untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverOptions {
    /// Wall-clock limit in seconds.
    #[serde(default)]
    pub time_limit: Option<f64>,

    /// Maximum number of branch-and-bound nodes.
    #[serde(default)]
    pub node_limit: Option<u64>,

    /// Relative optimality gap at which the search stops.
    #[serde(default)]
    pub mip_gap: Option<f64>,

    /// Integer feasibility tolerance.
    #[serde(default)]
    pub int_feas_tol: Option<f64>,

    /// Log solver progress.
    #[serde(default)]
    pub tee: bool,

    /// Backend-specific options.
    #[serde(flatten)]
    pub extra: BTreeMap<String, OptionValue>,
}

impl SolverOptions {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Checks option ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(limit) = self.time_limit {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "time_limit must be positive, got {limit}"
                )));
            }
        }
        if let Some(gap) = self.mip_gap {
            if !(0.0..=1.0).contains(&gap) {
                return Err(ConfigError::Invalid(format!(
                    "mip_gap must be in [0, 1], got {gap}"
                )));
            }
        }
        if let Some(tol) = self.int_feas_tol {
            if !(tol > 0.0 && tol < 0.5) {
                return Err(ConfigError::Invalid(format!(
                    "int_feas_tol must be in (0, 0.5), got {tol}"
                )));
            }
        }
        if self.node_limit == Some(0) {
            return Err(ConfigError::Invalid("node_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Value of a passthrough solver option.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Integer(v) => Some(*v as f64),
            OptionValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{v}"),
            OptionValue::Integer(v) => write!(f, "{v}"),
            OptionValue::Float(v) => write!(f, "{v}"),
            OptionValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}
