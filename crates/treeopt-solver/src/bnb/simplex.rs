//! Dense two-phase primal simplex.
//!
//! Solves `min c·y  s.t.  A y (<=|>=|==) b,  y >= 0` on a dense tableau.
//! Bland's rule is used for both the entering and the leaving column, so the
//! method terminates on degenerate problems.

use treeopt_core::Sense;

use crate::error::SolverError;

const PIVOT_EPS: f64 = 1e-9;
const ZERO_EPS: f64 = 1e-12;
const FEASIBILITY_TOL: f64 = 1e-7;

/// One row of a linear program over non-negative columns.
#[derive(Debug, Clone)]
pub(crate) struct LpRow {
    /// Dense coefficients, one per column.
    pub coefs: Vec<f64>,
    pub sense: Sense,
    pub rhs: f64,
}

/// `min costs·y` over `y >= 0` subject to `rows`.
#[derive(Debug, Clone, Default)]
pub(crate) struct LinearProgram {
    pub costs: Vec<f64>,
    pub rows: Vec<LpRow>,
}

/// Result of an LP solve.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LpOutcome {
    Optimal { y: Vec<f64>, iterations: usize },
    Infeasible,
    Unbounded,
}

struct Tableau {
    rows: Vec<Vec<f64>>,
    obj: Vec<f64>,
    basis: Vec<usize>,
    rhs: usize,
    iterations: usize,
    max_iterations: usize,
}

enum Phase {
    Optimal,
    Unbounded,
}

impl Tableau {
    fn pivot(&mut self, r: usize, c: usize) {
        let p = self.rows[r][c];
        for v in self.rows[r].iter_mut() {
            *v /= p;
        }
        let pivot_row = self.rows[r].clone();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r {
                continue;
            }
            let f = row[c];
            if f.abs() > ZERO_EPS {
                for (v, pv) in row.iter_mut().zip(&pivot_row) {
                    *v -= f * pv;
                    if v.abs() < ZERO_EPS {
                        *v = 0.0;
                    }
                }
            }
        }
        let f = self.obj[c];
        if f.abs() > ZERO_EPS {
            for (v, pv) in self.obj.iter_mut().zip(&pivot_row) {
                *v -= f * pv;
                if v.abs() < ZERO_EPS {
                    *v = 0.0;
                }
            }
        }
        self.basis[r] = c;
        self.iterations += 1;
    }

    /// Runs simplex iterations with entering columns restricted to `0..limit`.
    fn run(&mut self, limit: usize) -> Result<Phase, SolverError> {
        loop {
            if self.iterations >= self.max_iterations {
                return Err(SolverError::IterationLimit(self.max_iterations));
            }
            let Some(entering) = (0..limit).find(|&j| self.obj[j] < -PIVOT_EPS) else {
                return Ok(Phase::Optimal);
            };

            let mut leaving: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[entering];
                if a <= PIVOT_EPS {
                    continue;
                }
                let ratio = row[self.rhs].max(0.0) / a;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((best, best_ratio)) => {
                        if ratio < best_ratio - PIVOT_EPS
                            || ((ratio - best_ratio).abs() <= PIVOT_EPS
                                && self.basis[i] < self.basis[best])
                        {
                            Some((i, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }
            match leaving {
                Some((r, _)) => self.pivot(r, entering),
                None => return Ok(Phase::Unbounded),
            }
        }
    }

    /// Rebuilds the objective row for `costs` against the current basis.
    fn price(&mut self, costs: &[f64]) {
        self.obj.iter_mut().for_each(|v| *v = 0.0);
        self.obj[..costs.len()].copy_from_slice(costs);
        for (i, &b) in self.basis.iter().enumerate() {
            let cb = self.obj_cost(costs, b);
            if cb != 0.0 {
                for (v, rv) in self.obj.iter_mut().zip(&self.rows[i]) {
                    *v -= cb * rv;
                }
            }
        }
    }

    fn obj_cost(&self, costs: &[f64], col: usize) -> f64 {
        costs.get(col).copied().unwrap_or(0.0)
    }
}

/// Solves `lp`, giving up after `max_iterations` pivots.
pub(crate) fn solve(lp: &LinearProgram, max_iterations: usize) -> Result<LpOutcome, SolverError> {
    let n = lp.costs.len();
    let m = lp.rows.len();

    // Flip rows so every right-hand side is non-negative.
    let rows: Vec<(Vec<f64>, Sense, f64)> = lp
        .rows
        .iter()
        .map(|row| {
            if row.rhs < 0.0 {
                let sense = match row.sense {
                    Sense::Le => Sense::Ge,
                    Sense::Ge => Sense::Le,
                    Sense::Eq => Sense::Eq,
                };
                (row.coefs.iter().map(|c| -c).collect(), sense, -row.rhs)
            } else {
                (row.coefs.clone(), row.sense, row.rhs)
            }
        })
        .collect();

    let n_slack = rows.iter().filter(|(_, s, _)| *s != Sense::Eq).count();
    let n_art = rows.iter().filter(|(_, s, _)| *s != Sense::Le).count();
    let art_start = n + n_slack;
    let width = art_start + n_art + 1;
    let rhs = width - 1;

    let mut tableau = Tableau {
        rows: vec![vec![0.0; width]; m],
        obj: vec![0.0; width],
        basis: vec![0; m],
        rhs,
        iterations: 0,
        max_iterations,
    };

    let mut slack_col = n;
    let mut art_col = art_start;
    for (i, (coefs, sense, b)) in rows.iter().enumerate() {
        let row = &mut tableau.rows[i];
        row[..n].copy_from_slice(coefs);
        row[rhs] = *b;
        match sense {
            Sense::Le => {
                row[slack_col] = 1.0;
                tableau.basis[i] = slack_col;
                slack_col += 1;
            }
            Sense::Ge => {
                row[slack_col] = -1.0;
                slack_col += 1;
                row[art_col] = 1.0;
                tableau.basis[i] = art_col;
                art_col += 1;
            }
            Sense::Eq => {
                row[art_col] = 1.0;
                tableau.basis[i] = art_col;
                art_col += 1;
            }
        }
    }

    if n_art > 0 {
        let mut phase_one_costs = vec![0.0; art_start + n_art];
        phase_one_costs[art_start..].iter_mut().for_each(|c| *c = 1.0);
        tableau.price(&phase_one_costs);
        tableau.run(art_start + n_art)?;

        let infeasibility = -tableau.obj[rhs];
        if infeasibility > FEASIBILITY_TOL {
            return Ok(LpOutcome::Infeasible);
        }

        // Drive artificial columns out of the basis where possible; rows where
        // that fails are redundant and keep a zero-valued artificial.
        for i in 0..m {
            if tableau.basis[i] >= art_start {
                if let Some(j) = (0..art_start).find(|&j| tableau.rows[i][j].abs() > PIVOT_EPS) {
                    tableau.pivot(i, j);
                }
            }
        }
    }

    tableau.price(&lp.costs);
    if let Phase::Unbounded = tableau.run(art_start)? {
        return Ok(LpOutcome::Unbounded);
    }

    let mut y = vec![0.0; n];
    for (i, &b) in tableau.basis.iter().enumerate() {
        if b < n {
            y[b] = tableau.rows[i][rhs].max(0.0);
        }
    }
    Ok(LpOutcome::Optimal {
        y,
        iterations: tableau.iterations,
    })
}
