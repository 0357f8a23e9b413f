//! The solver backend contract.

use std::fmt::{self, Debug};
use std::time::Duration;

use treeopt_config::SolverOptions;
use treeopt_core::Model;

use crate::error::SolverError;

/// How a successful solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimality was proven (within the configured gap).
    Optimal,
    /// The node limit stopped the search; the incumbent is returned.
    NodeLimit,
    /// The time limit stopped the search; the incumbent is returned.
    TimeLimit,
}

impl SolveStatus {
    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::NodeLimit => write!(f, "node_limit"),
            SolveStatus::TimeLimit => write!(f, "time_limit"),
        }
    }
}

/// Summary of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub status: SolveStatus,
    /// Objective value of the returned assignment.
    pub objective_value: f64,
    /// Best proven lower bound.
    pub best_bound: f64,
    /// Search nodes processed.
    pub nodes: u64,
    /// Wall-clock time spent in the backend.
    pub elapsed: Duration,
}

/// A solver backend.
///
/// Backends are created fresh by a [`SolverRegistry`](crate::SolverRegistry)
/// for every solve, configured through [`apply_options`](Self::apply_options)
/// and then run on a fully built model. A successful
/// [`solve`](Self::solve) must leave the assignment in the model via
/// [`Model::set_solution`]; callers read variable values back from there.
///
/// Infeasibility, unboundedness and limits reached without any feasible
/// point are reported as [`SolverError`]s. A backend never returns a
/// partial assignment.
pub trait SolverBackend: Send + Debug {
    /// Name used in log output.
    fn name(&self) -> &str;

    /// Applies options before solving.
    ///
    /// Named options the backend cannot honour and passthrough keys with
    /// invalid values are errors; unknown passthrough keys may be ignored.
    fn apply_options(&mut self, options: &SolverOptions) -> Result<(), SolverError>;

    /// Solves `model` in place.
    fn solve(&mut self, model: &mut Model) -> Result<SolveReport, SolverError>;
}
