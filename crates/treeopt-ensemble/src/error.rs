//! Error types for loading tree ensembles

use std::io;

use thiserror::Error;

/// Errors raised while loading or validating a tree ensemble.
#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The ensemble is structurally invalid.
    #[error("Invalid tree ensemble: {0}")]
    Invalid(String),
}
