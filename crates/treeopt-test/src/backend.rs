//! Backends with predetermined results.
//!
//! [`ScriptedBackend`] skips the search entirely and writes whatever
//! assignment its script computes for the model it is handed. Together with
//! [`Assignment`] this pins down exact solver output, including values a real
//! solver would only produce through numerical noise.
//!
//! # Example
//!
//! ```
//! use treeopt_core::Model;
//! use treeopt_solver::SolverBackend;
//! use treeopt_test::backend::{Assignment, ScriptedBackend};
//!
//! let mut model = Model::new();
//! let x = model.add_binary("x");
//! let mut backend = ScriptedBackend::new(move |m| Assignment::zeros(m).set(x, 1.0).into_values());
//! backend.solve(&mut model).unwrap();
//! assert_eq!(model.value(x).unwrap(), 1.0);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use treeopt_config::SolverOptions;
use treeopt_core::{FeatureVars, LeafId, Model, VarId};
use treeopt_solver::{SolveReport, SolveStatus, SolverBackend, SolverError};

type Script = Arc<dyn Fn(&Model) -> Vec<f64> + Send + Sync>;

/// A backend that writes a scripted assignment.
///
/// Clones share the script and the log of applied options, so a clone can be
/// handed to a registry factory while the test keeps the original.
#[derive(Clone)]
pub struct ScriptedBackend {
    script: Script,
    applied: Arc<Mutex<Vec<SolverOptions>>>,
    solves: Arc<Mutex<usize>>,
}

impl ScriptedBackend {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&Model) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            applied: Arc::new(Mutex::new(Vec::new())),
            solves: Arc::new(Mutex::new(0)),
        }
    }

    /// Options passed to `apply_options`, in call order.
    pub fn applied_options(&self) -> Vec<SolverOptions> {
        self.applied.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Number of completed `solve` calls.
    pub fn solve_count(&self) -> usize {
        self.solves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl fmt::Debug for ScriptedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedBackend")
            .field("solves", &self.solve_count())
            .finish()
    }
}

impl SolverBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn apply_options(&mut self, options: &SolverOptions) -> Result<(), SolverError> {
        if let Ok(mut applied) = self.applied.lock() {
            applied.push(options.clone());
        }
        Ok(())
    }

    fn solve(&mut self, model: &mut Model) -> Result<SolveReport, SolverError> {
        let values = (self.script)(model);
        let objective = model.objective().evaluate(&values);
        model.set_solution(values, objective)?;
        if let Ok(mut solves) = self.solves.lock() {
            *solves += 1;
        }
        Ok(SolveReport {
            status: SolveStatus::Optimal,
            objective_value: objective,
            best_bound: objective,
            nodes: 0,
            elapsed: Duration::ZERO,
        })
    }
}

/// A backend whose every solve fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingBackend(pub SolverError);

impl SolverBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn apply_options(&mut self, _options: &SolverOptions) -> Result<(), SolverError> {
        Ok(())
    }

    fn solve(&mut self, _model: &mut Model) -> Result<SolveReport, SolverError> {
        Err(self.0.clone())
    }
}

/// Builds a value vector for a model by variable role.
///
/// Panics if the model lacks the addressed feature, leaf or output.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    /// All variables at zero.
    pub fn zeros(model: &Model) -> Self {
        Self {
            values: vec![0.0; model.num_vars()],
        }
    }

    pub fn set(mut self, var: VarId, value: f64) -> Self {
        self.values[var.index()] = value;
        self
    }

    /// Sets the variable of a numeric feature.
    pub fn feature(self, model: &Model, feature: usize, value: f64) -> Self {
        match model.feature_var(feature) {
            Some(FeatureVars::Single(var)) => self.set(*var, value),
            other => panic!("feature {feature} is not numeric: {other:?}"),
        }
    }

    /// Sets the one-hot indicators of a categorical feature.
    pub fn one_hot(mut self, model: &Model, feature: usize, indicators: &[f64]) -> Self {
        match model.feature_var(feature) {
            Some(FeatureVars::OneHot(vars)) => {
                assert_eq!(vars.len(), indicators.len(), "indicator count");
                for (var, value) in vars.iter().zip(indicators) {
                    self.values[var.index()] = *value;
                }
                self
            }
            other => panic!("feature {feature} is not categorical: {other:?}"),
        }
    }

    /// Marks one leaf of a tree as active.
    pub fn leaf(self, model: &Model, objective: &str, tree: usize, leaf: &str) -> Self {
        match model.leaf_var(objective, tree, &LeafId::from(leaf)) {
            Some(var) => self.set(var, 1.0),
            None => panic!("no leaf '{leaf}' in tree {tree} of '{objective}'"),
        }
    }

    /// Sets the output variable of an objective.
    pub fn output(self, model: &Model, objective: &str, value: f64) -> Self {
        match model.output_var(objective) {
            Some(var) => self.set(var, value),
            None => panic!("no output variable for '{objective}'"),
        }
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}
