//! Linear relaxation of a model under node bounds.
//!
//! Model variables with arbitrary bounds are mapped onto non-negative LP
//! columns: `x = lb + y` when the lower bound is finite, `x = ub - y` when
//! only the upper bound is finite, and `x = y⁺ - y⁻` when the variable is
//! free. Finite ranges become explicit `y <= ub - lb` rows.

use treeopt_core::{Model, Sense};

use super::simplex::{self, LinearProgram, LpOutcome, LpRow};
use crate::error::SolverError;

#[derive(Debug, Clone, Copy)]
enum Column {
    Shift { col: usize, lb: f64 },
    Mirror { col: usize, ub: f64 },
    Split { pos: usize, neg: usize },
}

/// Outcome of solving a relaxation, in model space.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Relaxation {
    Optimal {
        values: Vec<f64>,
        objective: f64,
        iterations: usize,
    },
    Infeasible,
    Unbounded,
}

/// Solves the LP relaxation of `model` with variable bounds replaced by `bounds`.
pub(crate) fn solve_relaxation(
    model: &Model,
    bounds: &[(f64, f64)],
    max_iterations: usize,
) -> Result<Relaxation, SolverError> {
    if bounds.iter().any(|(lb, ub)| lb > ub) {
        return Ok(Relaxation::Infeasible);
    }

    let mut columns = Vec::with_capacity(bounds.len());
    let mut n_cols = 0;
    for &(lb, ub) in bounds {
        let column = if lb.is_finite() {
            n_cols += 1;
            Column::Shift { col: n_cols - 1, lb }
        } else if ub.is_finite() {
            n_cols += 1;
            Column::Mirror { col: n_cols - 1, ub }
        } else {
            n_cols += 2;
            Column::Split {
                pos: n_cols - 2,
                neg: n_cols - 1,
            }
        };
        columns.push(column);
    }

    let mut lp = LinearProgram {
        costs: vec![0.0; n_cols],
        rows: Vec::with_capacity(model.constraints().len() + bounds.len()),
    };

    for (var, coef) in model.objective().terms() {
        add_coef(&mut lp.costs, columns[var.index()], *coef);
    }

    for constraint in model.constraints() {
        let mut coefs = vec![0.0; n_cols];
        let mut rhs = constraint.normalized_rhs();
        for (var, coef) in constraint.expr().terms() {
            rhs -= add_coef(&mut coefs, columns[var.index()], *coef);
        }
        lp.rows.push(LpRow {
            coefs,
            sense: constraint.sense(),
            rhs,
        });
    }

    for (&(lb, ub), column) in bounds.iter().zip(&columns) {
        if let Column::Shift { col, .. } = *column {
            if ub.is_finite() {
                let mut coefs = vec![0.0; n_cols];
                coefs[col] = 1.0;
                lp.rows.push(LpRow {
                    coefs,
                    sense: Sense::Le,
                    rhs: ub - lb,
                });
            }
        }
    }

    match simplex::solve(&lp, max_iterations)? {
        LpOutcome::Optimal { y, iterations } => {
            let values: Vec<f64> = columns
                .iter()
                .map(|column| match *column {
                    Column::Shift { col, lb } => lb + y[col],
                    Column::Mirror { col, ub } => ub - y[col],
                    Column::Split { pos, neg } => y[pos] - y[neg],
                })
                .collect();
            let objective = model.objective().evaluate(&values);
            Ok(Relaxation::Optimal {
                values,
                objective,
                iterations,
            })
        }
        LpOutcome::Infeasible => Ok(Relaxation::Infeasible),
        LpOutcome::Unbounded => Ok(Relaxation::Unbounded),
    }
}

/// Adds `coef·x` to a dense row and returns the constant it contributes.
fn add_coef(row: &mut [f64], column: Column, coef: f64) -> f64 {
    match column {
        Column::Shift { col, lb } => {
            row[col] += coef;
            coef * lb
        }
        Column::Mirror { col, ub } => {
            row[col] -= coef;
            coef * ub
        }
        Column::Split { pos, neg } => {
            row[pos] += coef;
            row[neg] -= coef;
            0.0
        }
    }
}
