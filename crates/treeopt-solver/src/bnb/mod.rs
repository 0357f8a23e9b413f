//! Built-in branch-and-bound backend.
//!
//! Solves the LP relaxation of every node with a dense two-phase simplex and
//! branches on fractional integer variables. The search is deterministic: the
//! same model and options always give the same assignment.
//!
//! # Options
//!
//! | key                 | meaning                                       |
//! |---------------------|-----------------------------------------------|
//! | `time_limit`        | wall-clock limit in seconds                   |
//! | `node_limit`        | maximum processed nodes                       |
//! | `mip_gap`           | relative gap at which nodes are pruned        |
//! | `int_feas_tol`      | integrality tolerance                         |
//! | `tee`               | log incumbents at INFO instead of DEBUG       |
//! | `node_selection`    | `"depth_first"` (default) or `"best_bound"`   |
//! | `branching`         | `"most_fractional"` (default) or `"first_fractional"` |
//! | `max_lp_iterations` | simplex pivot limit per relaxation            |
//!
//! Logging levels:
//! - **INFO**: solve start/end (and incumbents when `tee` is set)
//! - **DEBUG**: incumbents, limits
//! - **TRACE**: node processing

mod node;
mod relaxation;
mod simplex;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};
use treeopt_config::{OptionValue, SolverOptions};
use treeopt_core::{Model, VarKind};

use crate::backend::{SolveReport, SolveStatus, SolverBackend};
use crate::error::SolverError;

use node::{BnbNode, NodeQueue};
use relaxation::{solve_relaxation, Relaxation};

/// Order in which open nodes are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelection {
    /// Most recently created node first.
    #[default]
    DepthFirst,
    /// Node with the lowest relaxation bound first.
    BestBound,
}

/// Choice of the branching variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchingRule {
    /// Variable whose fractional part is closest to 0.5.
    #[default]
    MostFractional,
    /// Lowest-index fractional variable.
    FirstFractional,
}

/// Branch-and-bound settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BnbSettings {
    pub node_limit: Option<u64>,
    pub time_limit: Option<Duration>,
    /// Relative optimality gap.
    pub mip_gap: f64,
    /// Absolute optimality gap.
    pub abs_gap: f64,
    pub int_feas_tol: f64,
    pub node_selection: NodeSelection,
    pub branching: BranchingRule,
    pub max_lp_iterations: usize,
    pub tee: bool,
}

impl Default for BnbSettings {
    fn default() -> Self {
        Self {
            node_limit: None,
            time_limit: None,
            mip_gap: 0.0,
            abs_gap: 1e-9,
            int_feas_tol: 1e-6,
            node_selection: NodeSelection::default(),
            branching: BranchingRule::default(),
            max_lp_iterations: 100_000,
            tee: false,
        }
    }
}

/// The built-in branch-and-bound solver.
///
/// # Example
///
/// ```
/// use treeopt_core::{Constraint, LinearExpr, Model};
/// use treeopt_solver::{BranchAndBound, SolverBackend};
///
/// // min -x - y  s.t.  2x + 2y <= 3,  x, y binary
/// let mut model = Model::new();
/// let x = model.add_binary("x");
/// let y = model.add_binary("y");
/// model
///     .add_constraint(Constraint::le(LinearExpr::new().with_term(x, 2.0).with_term(y, 2.0), 3.0))
///     .unwrap();
/// model
///     .set_objective(LinearExpr::new().with_term(x, -1.0).with_term(y, -1.0))
///     .unwrap();
///
/// let report = BranchAndBound::new().solve(&mut model).unwrap();
/// assert!((report.objective_value + 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    settings: BnbSettings,
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: BnbSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BnbSettings {
        &self.settings
    }

    fn prune_threshold(&self, incumbent: f64) -> f64 {
        incumbent - (self.settings.mip_gap * incumbent.abs()).max(self.settings.abs_gap)
    }

    fn select_branch(&self, model: &Model, values: &[f64]) -> Option<usize> {
        let tol = self.settings.int_feas_tol;
        let fractional = model
            .variables()
            .iter()
            .zip(values)
            .enumerate()
            .filter(|(_, (var, _))| var.kind().is_integral())
            .map(|(j, (_, &v))| (j, (v - v.round()).abs()))
            .filter(|&(_, frac)| frac > tol);
        match self.settings.branching {
            BranchingRule::FirstFractional => fractional.map(|(j, _)| j).next(),
            BranchingRule::MostFractional => fractional
                .fold(None::<(usize, f64)>, |best, (j, frac)| match best {
                    Some((_, best_frac)) if best_frac >= frac => best,
                    _ => Some((j, frac)),
                })
                .map(|(j, _)| j),
        }
    }
}

fn root_bounds(model: &Model) -> Vec<(f64, f64)> {
    model
        .variables()
        .iter()
        .map(|var| match var.kind() {
            VarKind::Continuous => (var.lb(), var.ub()),
            VarKind::Integer | VarKind::Binary => (var.lb().ceil(), var.ub().floor()),
        })
        .collect()
}

fn invalid(key: &str, value: &OptionValue) -> SolverError {
    SolverError::InvalidOption {
        key: key.to_string(),
        reason: format!("unsupported value '{value}'"),
    }
}

impl SolverBackend for BranchAndBound {
    fn name(&self) -> &str {
        "bnb"
    }

    fn apply_options(&mut self, options: &SolverOptions) -> Result<(), SolverError> {
        let settings = &mut self.settings;
        if let Some(limit) = options.time_limit {
            settings.time_limit = options.time_limit().or_else(|| {
                warn!(time_limit = limit, "Ignoring non-positive time limit");
                None
            });
        }
        if options.node_limit.is_some() {
            settings.node_limit = options.node_limit;
        }
        if let Some(gap) = options.mip_gap {
            settings.mip_gap = gap;
        }
        if let Some(tol) = options.int_feas_tol {
            settings.int_feas_tol = tol;
        }
        settings.tee = options.tee;

        for (key, value) in &options.extra {
            match key.as_str() {
                "node_selection" => {
                    settings.node_selection = match value.as_str() {
                        Some("depth_first") => NodeSelection::DepthFirst,
                        Some("best_bound") => NodeSelection::BestBound,
                        _ => return Err(invalid(key, value)),
                    };
                }
                "branching" => {
                    settings.branching = match value.as_str() {
                        Some("most_fractional") => BranchingRule::MostFractional,
                        Some("first_fractional") => BranchingRule::FirstFractional,
                        _ => return Err(invalid(key, value)),
                    };
                }
                "max_lp_iterations" => {
                    settings.max_lp_iterations = match value {
                        OptionValue::Integer(n) if *n > 0 => *n as usize,
                        _ => return Err(invalid(key, value)),
                    };
                }
                _ => warn!(option = %key, value = %value, "Ignoring unknown bnb option"),
            }
        }
        Ok(())
    }

    fn solve(&mut self, model: &mut Model) -> Result<SolveReport, SolverError> {
        let start = Instant::now();
        let settings = self.settings.clone();
        let integral = model
            .variables()
            .iter()
            .filter(|v| v.kind().is_integral())
            .count();

        info!(
            event = "bnb_start",
            variables = model.num_vars(),
            integer_variables = integral,
            constraints = model.constraints().len(),
        );

        let mut queue = NodeQueue::new(settings.node_selection);
        queue.push(BnbNode {
            bounds: root_bounds(model),
            bound: f64::NEG_INFINITY,
            depth: 0,
            seq: 0,
        });
        let mut seq = 1u64;
        let mut nodes = 0u64;
        let mut incumbent: Option<(Vec<f64>, f64)> = None;
        let mut stopped = None;

        while let Some(node) = queue.pop() {
            if settings.node_limit.is_some_and(|limit| nodes >= limit) {
                queue.push(node);
                stopped = Some(SolveStatus::NodeLimit);
                break;
            }
            if settings.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                queue.push(node);
                stopped = Some(SolveStatus::TimeLimit);
                break;
            }
            nodes += 1;

            if let Some((_, best)) = &incumbent {
                if node.bound >= self.prune_threshold(*best) {
                    trace!(event = "prune", depth = node.depth, bound = node.bound);
                    continue;
                }
            }

            let (values, objective) =
                match solve_relaxation(model, &node.bounds, settings.max_lp_iterations)? {
                    Relaxation::Optimal {
                        values, objective, ..
                    } => (values, objective),
                    Relaxation::Infeasible => {
                        trace!(event = "infeasible", depth = node.depth);
                        continue;
                    }
                    Relaxation::Unbounded => return Err(SolverError::Unbounded),
                };
            trace!(event = "node", depth = node.depth, bound = objective);

            if let Some((_, best)) = &incumbent {
                if objective >= self.prune_threshold(*best) {
                    continue;
                }
            }

            match self.select_branch(model, &values) {
                None => {
                    if settings.tee {
                        info!(event = "incumbent", objective = objective, nodes = nodes);
                    } else {
                        debug!(event = "incumbent", objective = objective, nodes = nodes);
                    }
                    incumbent = Some((values, objective));
                }
                Some(j) => {
                    let v = values[j];
                    let (lb, ub) = node.bounds[j];
                    let mut down = node.bounds.clone();
                    down[j] = (lb, v.floor());
                    let mut up = node.bounds;
                    up[j] = (v.ceil(), ub);

                    let down = BnbNode {
                        bounds: down,
                        bound: objective,
                        depth: node.depth + 1,
                        seq,
                    };
                    let up = BnbNode {
                        bounds: up,
                        bound: objective,
                        depth: node.depth + 1,
                        seq: seq + 1,
                    };
                    seq += 2;
                    // Depth-first pops the last push: explore the nearer side first.
                    if v - v.floor() >= 0.5 {
                        queue.push(down);
                        queue.push(up);
                    } else {
                        queue.push(up);
                        queue.push(down);
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        let Some((values, objective)) = incumbent else {
            return Err(match stopped {
                Some(SolveStatus::NodeLimit) => SolverError::NodeLimit(nodes),
                Some(SolveStatus::TimeLimit) => {
                    SolverError::TimeLimit(settings.time_limit.unwrap_or(elapsed))
                }
                _ => SolverError::Infeasible,
            });
        };

        let status = stopped.unwrap_or(SolveStatus::Optimal);
        let best_bound = match status {
            SolveStatus::Optimal => objective,
            _ => queue.best_bound().map_or(objective, |b| b.min(objective)),
        };
        model.set_solution(values, objective)?;

        info!(
            event = "bnb_end",
            status = %status,
            objective = objective,
            best_bound = best_bound,
            nodes = nodes,
            open_nodes = queue.len(),
            elapsed_ms = elapsed.as_millis() as u64,
        );

        Ok(SolveReport {
            status,
            objective_value: objective,
            best_bound,
            nodes,
            elapsed,
        })
    }
}
