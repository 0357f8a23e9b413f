//! Error type for the optimizer

use thiserror::Error;
use treeopt_config::ConfigError;
use treeopt_core::TreeOptError;
use treeopt_solver::SolverError;

/// Errors returned by [`Optimizer`](crate::Optimizer).
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// A result accessor was called before the first successful solve.
    #[error("No solution was generated yet")]
    NotSolved,

    #[error("Number of weights is {weights}, number of objectives is {objectives}")]
    WeightCountMismatch { weights: usize, objectives: usize },

    #[error("Weights sum to {sum}, not 1.0")]
    WeightsNotNormalized { sum: f64 },

    /// The solved one-hot indicators of a categorical feature do not select
    /// exactly one category.
    #[error("Categorical feature '{feature}' has {active} active categories, expected exactly one")]
    CategoryNotDetermined { feature: String, active: usize },

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Model(#[from] TreeOptError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
