//! The optimizer: embeds a tree surrogate, solves, and decodes the result.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};
use treeopt_config::OptimizerConfig;
use treeopt_core::{FeatureValue, LinearExpr, Model, ProblemConfig, TreeOptError};
use treeopt_ensemble::TreeModel;
use treeopt_solver::SolverRegistry;

use crate::error::OptimizerError;
use crate::extract::{active_leaves, extract_solution, output_values, ActiveLeaves};

/// Result of one solve. Not retained by the optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct OptResult {
    /// Decoded feature values, in problem order.
    pub solution: Vec<FeatureValue>,
    /// Objective value reported by the solver.
    pub objective_value: f64,
    /// Output (`mu`) value of every objective, in problem order.
    pub uncertainty_values: Vec<f64>,
}

/// Finds the point minimizing a tree-ensemble surrogate.
///
/// The optimizer owns the problem configuration, the solver configuration and
/// a backend registry. Each [`solve`](Self::solve) builds and solves a fresh
/// model; only the decoded solution and the active leaves of the last
/// successful solve are kept.
///
/// # Example
///
/// ```
/// use treeopt::prelude::*;
///
/// let mut problem = ProblemConfig::new();
/// problem.add_real("x", 0.0, 10.0).unwrap();
/// problem.add_objective("y").unwrap();
///
/// // y = x <= 4 ? 2.0 : -1.0
/// let tree = Tree::new(vec![
///     Node::Split { feature: 0, threshold: 4.0, left: 1, right: 2 },
///     Node::Leaf { value: 2.0 },
///     Node::Leaf { value: -1.0 },
/// ])
/// .unwrap();
/// let surrogate = EnsembleModel::new(vec![TreeEnsemble::new("y", vec![tree])]).unwrap();
///
/// let mut optimizer = Optimizer::new(problem, OptimizerConfig::default());
/// let result = optimizer.solve(&surrogate, None, None).unwrap();
///
/// assert!((result.objective_value + 1.0).abs() < 1e-6);
/// assert!(result.solution[0].as_f64().unwrap() > 4.0);
/// assert_eq!(optimizer.active_leaf_solution().unwrap()[0].len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Optimizer {
    problem: ProblemConfig,
    config: OptimizerConfig,
    registry: SolverRegistry,
    curr_sol: Option<Vec<FeatureValue>>,
    active_leaves: Option<ActiveLeaves>,
}

impl Optimizer {
    /// Creates an optimizer using the default backend registry.
    pub fn new(problem: ProblemConfig, config: OptimizerConfig) -> Self {
        Self::with_registry(problem, config, SolverRegistry::default())
    }

    /// Creates an optimizer that looks backends up in `registry`.
    pub fn with_registry(
        problem: ProblemConfig,
        config: OptimizerConfig,
        registry: SolverRegistry,
    ) -> Self {
        Self {
            problem,
            config,
            registry,
            curr_sol: None,
            active_leaves: None,
        }
    }

    /// Creates an optimizer with configuration loaded from a TOML or YAML file.
    pub fn from_config_file(
        problem: ProblemConfig,
        path: impl AsRef<Path>,
    ) -> Result<Self, OptimizerError> {
        let config = OptimizerConfig::load(path)?;
        Ok(Self::new(problem, config))
    }

    pub fn problem(&self) -> &ProblemConfig {
        &self.problem
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SolverRegistry {
        &self.registry
    }

    /// Solution of the last successful solve.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::NotSolved`] before the first successful solve.
    pub fn current_solution(&self) -> Result<&[FeatureValue], OptimizerError> {
        self.curr_sol.as_deref().ok_or(OptimizerError::NotSolved)
    }

    /// Active leaves of the last successful solve, per objective.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::NotSolved`] before the first successful solve.
    pub fn active_leaf_solution(&self) -> Result<&ActiveLeaves, OptimizerError> {
        self.active_leaves.as_ref().ok_or(OptimizerError::NotSolved)
    }

    /// Embeds `tree_model`, solves, and decodes the optimum.
    ///
    /// Without `model_core` the canonical skeleton of the problem is used;
    /// otherwise a copy of the caller's model is solved and the original is
    /// left untouched. `weights`, one per objective, must sum to exactly
    /// `1.0`; without them every objective is weighted `1/n`.
    ///
    /// On success the decoded solution and active leaves replace those of the
    /// previous solve. On failure they are left as they were.
    ///
    /// # Errors
    ///
    /// - [`OptimizerError::WeightCountMismatch`] /
    ///   [`OptimizerError::WeightsNotNormalized`] before any solver work
    /// - [`OptimizerError::Solver`] for unknown backends, rejected options,
    ///   infeasible or unbounded models and limits hit without a solution
    /// - [`OptimizerError::CategoryNotDetermined`] if the solved one-hot
    ///   indicators do not select a category
    /// - [`OptimizerError::Model`] / [`OptimizerError::Config`] for models
    ///   that do not match the problem and invalid configuration
    pub fn solve<T>(
        &mut self,
        tree_model: &T,
        model_core: Option<&Model>,
        weights: Option<&[f64]>,
    ) -> Result<OptResult, OptimizerError>
    where
        T: TreeModel + ?Sized,
    {
        let weights = self.objective_weights(weights)?;
        self.config.validate()?;

        let mut model = match model_core {
            None => self.problem.model_core()?,
            Some(model) => self.problem.copy_model_core(model)?,
        };

        let mut backend = self.registry.create(&self.config.solver_name)?;
        backend.apply_options(&self.config.solver_options)?;

        tree_model.add_to_model(&mut model)?;
        self.add_weighted_objective(&mut model, &weights)?;

        info!(
            event = "solve_start",
            solver = %self.config.solver_name,
            variables = model.num_vars(),
            constraints = model.constraints().len(),
            objectives = weights.len(),
        );
        let start = Instant::now();

        let report = backend.solve(&mut model)?;
        debug!(
            event = "backend_done",
            status = %report.status,
            nodes = report.nodes,
            best_bound = report.best_bound,
        );

        let solution = extract_solution(&self.problem, &model)?;
        let leaves = active_leaves(&self.problem, tree_model, &model)?;
        let uncertainty_values = output_values(&self.problem, &model)?;
        let objective_value = model.objective_value()?;

        info!(
            event = "solve_end",
            objective = objective_value,
            status = %report.status,
            active_leaves = leaves.iter().map(Vec::len).sum::<usize>(),
            duration_ms = start.elapsed().as_millis() as u64,
        );

        self.curr_sol = Some(solution.clone());
        self.active_leaves = Some(leaves);

        Ok(OptResult {
            solution,
            objective_value,
            uncertainty_values,
        })
    }

    fn objective_weights(&self, weights: Option<&[f64]>) -> Result<Vec<f64>, OptimizerError> {
        let objectives = self.problem.objectives().len();
        let Some(weights) = weights else {
            return Ok(vec![1.0 / objectives as f64; objectives]);
        };
        if weights.len() != objectives {
            return Err(OptimizerError::WeightCountMismatch {
                weights: weights.len(),
                objectives,
            });
        }
        let sum: f64 = weights.iter().sum();
        if sum != 1.0 {
            return Err(OptimizerError::WeightsNotNormalized { sum });
        }
        Ok(weights.to_vec())
    }

    fn add_weighted_objective(&self, model: &mut Model, weights: &[f64]) -> Result<(), TreeOptError> {
        for (objective, &weight) in self.problem.objectives().iter().zip(weights) {
            let output = model
                .output_var(objective.name())
                .ok_or_else(|| TreeOptError::UnknownObjective(objective.name().to_string()))?;
            model.add_to_objective(&LinearExpr::from(output), weight)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
