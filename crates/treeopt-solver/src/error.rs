//! Error types for solver backends

use std::time::Duration;

use thiserror::Error;
use treeopt_core::TreeOptError;

/// Errors raised while selecting, configuring or running a solver backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// No backend is registered under this name.
    #[error("Unknown solver backend '{name}' (available: {available})")]
    UnknownBackend { name: String, available: String },

    /// An option has a value the backend cannot use.
    #[error("Invalid value for solver option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    /// The model has no feasible point.
    #[error("Model is infeasible")]
    Infeasible,

    /// The objective is unbounded below.
    #[error("Model is unbounded")]
    Unbounded,

    /// The node limit was reached before any feasible point was found.
    #[error("Node limit of {0} reached without a feasible solution")]
    NodeLimit(u64),

    /// The time limit was reached before any feasible point was found.
    #[error("Time limit of {0:?} reached without a feasible solution")]
    TimeLimit(Duration),

    /// A linear relaxation did not converge.
    #[error("Simplex iteration limit of {0} reached")]
    IterationLimit(usize),

    /// The model could not be read or written.
    #[error(transparent)]
    Model(#[from] TreeOptError),
}
