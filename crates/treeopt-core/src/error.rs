//! Error types for treeopt models and problem configurations

use thiserror::Error;

/// Main error type for model construction and decoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeOptError {
    /// A feature or objective definition is invalid.
    #[error("Problem definition error: {0}")]
    Problem(String),

    /// A variable id does not belong to the model.
    #[error("Unknown variable: {0}")]
    UnknownVariable(usize),

    /// Variable bounds are inconsistent.
    #[error("Invalid bounds for variable '{name}': [{lb}, {ub}]")]
    InvalidBounds { name: String, lb: f64, ub: f64 },

    /// The model was not built from this problem configuration.
    #[error("Model does not match problem configuration: {0}")]
    ModelMismatch(String),

    /// Values were requested from a model that has not been solved.
    #[error("Model has no solution values")]
    Unsolved,

    /// Unknown objective name.
    #[error("Unknown objective: {0}")]
    UnknownObjective(String),

    /// A surrogate failed its structural checks before encoding.
    #[error("Invalid surrogate: {0}")]
    InvalidSurrogate(String),

    /// A raw vector could not be decoded into feature values.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type alias for treeopt core operations
pub type Result<T> = std::result::Result<T, TreeOptError>;
