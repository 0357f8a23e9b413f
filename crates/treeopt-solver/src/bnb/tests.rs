use approx::assert_abs_diff_eq;
use treeopt_config::{OptionValue, SolverOptions};
use treeopt_core::{Constraint, LinearExpr, Model, Sense, VarId, VarKind};

use super::simplex::{self, LinearProgram, LpOutcome, LpRow};
use super::*;

/// max 5a + 4b + 3c  s.t.  2a + 3b + c <= 5,  a, b, c binary
fn knapsack() -> (Model, Vec<VarId>) {
    let mut model = Model::new();
    let vars: Vec<_> = ["a", "b", "c"].iter().map(|n| model.add_binary(*n)).collect();
    let weight = LinearExpr::new()
        .with_term(vars[0], 2.0)
        .with_term(vars[1], 3.0)
        .with_term(vars[2], 1.0);
    model.add_constraint(Constraint::le(weight, 5.0)).unwrap();
    let value = LinearExpr::new()
        .with_term(vars[0], -5.0)
        .with_term(vars[1], -4.0)
        .with_term(vars[2], -3.0);
    model.set_objective(value).unwrap();
    (model, vars)
}

fn options(entries: &[(&str, OptionValue)]) -> SolverOptions {
    let mut options = SolverOptions::default();
    for (key, value) in entries {
        options.extra.insert(key.to_string(), value.clone());
    }
    options
}

#[test]
fn test_simplex_two_constraints() {
    // min -x - y  s.t.  x + 2y <= 4,  3x + y <= 6
    let lp = LinearProgram {
        costs: vec![-1.0, -1.0],
        rows: vec![
            LpRow {
                coefs: vec![1.0, 2.0],
                sense: Sense::Le,
                rhs: 4.0,
            },
            LpRow {
                coefs: vec![3.0, 1.0],
                sense: Sense::Le,
                rhs: 6.0,
            },
        ],
    };
    match simplex::solve(&lp, 100).unwrap() {
        LpOutcome::Optimal { y, .. } => {
            assert_abs_diff_eq!(y[0], 1.6, epsilon = 1e-9);
            assert_abs_diff_eq!(y[1], 1.2, epsilon = 1e-9);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_simplex_phase_one_detects_infeasible() {
    // y0 + y1 >= 3,  y0 + y1 <= 2
    let lp = LinearProgram {
        costs: vec![1.0, 1.0],
        rows: vec![
            LpRow {
                coefs: vec![1.0, 1.0],
                sense: Sense::Ge,
                rhs: 3.0,
            },
            LpRow {
                coefs: vec![1.0, 1.0],
                sense: Sense::Le,
                rhs: 2.0,
            },
        ],
    };
    assert_eq!(simplex::solve(&lp, 100).unwrap(), LpOutcome::Infeasible);
}

#[test]
fn test_simplex_negative_rhs_equality() {
    // -y0 + y1 = -2, min y0 -> y0 = 2
    let lp = LinearProgram {
        costs: vec![1.0, 0.0],
        rows: vec![LpRow {
            coefs: vec![-1.0, 1.0],
            sense: Sense::Eq,
            rhs: -2.0,
        }],
    };
    match simplex::solve(&lp, 100).unwrap() {
        LpOutcome::Optimal { y, .. } => assert_abs_diff_eq!(y[0], 2.0, epsilon = 1e-9),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_simplex_iteration_limit() {
    let lp = LinearProgram {
        costs: vec![-1.0, -1.0],
        rows: vec![LpRow {
            coefs: vec![1.0, 1.0],
            sense: Sense::Le,
            rhs: 1.0,
        }],
    };
    assert_eq!(
        simplex::solve(&lp, 0),
        Err(SolverError::IterationLimit(0))
    );
}

#[test]
fn test_knapsack_optimum() {
    let (mut model, vars) = knapsack();
    let report = BranchAndBound::new().solve(&mut model).unwrap();

    assert_eq!(report.status, SolveStatus::Optimal);
    assert_abs_diff_eq!(report.objective_value, -9.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.value(vars[0]).unwrap(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(model.value(vars[1]).unwrap(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(model.value(vars[2]).unwrap(), 0.0, epsilon = 1e-6);
    assert!(report.nodes > 1);
}

#[test]
fn test_best_bound_finds_same_optimum() {
    let (mut model, _) = knapsack();
    let mut backend = BranchAndBound::new();
    backend
        .apply_options(&options(&[
            ("node_selection", "best_bound".into()),
            ("branching", "first_fractional".into()),
        ]))
        .unwrap();
    assert_eq!(backend.settings().node_selection, NodeSelection::BestBound);
    assert_eq!(backend.settings().branching, BranchingRule::FirstFractional);

    let report = backend.solve(&mut model).unwrap();
    assert_abs_diff_eq!(report.objective_value, -9.0, epsilon = 1e-9);
}

#[test]
fn test_solve_is_deterministic() {
    let (mut first, _) = knapsack();
    let (mut second, _) = knapsack();
    BranchAndBound::new().solve(&mut first).unwrap();
    BranchAndBound::new().solve(&mut second).unwrap();
    assert_eq!(first.values(), second.values());
}

#[test]
fn test_general_integers() {
    // min -x - y  s.t.  x + y <= 3.5,  x - y <= 0.5,  x, y in 0..=10
    let mut model = Model::new();
    let x = model.add_var("x", VarKind::Integer, 0.0, 10.0).unwrap();
    let y = model.add_var("y", VarKind::Integer, 0.0, 10.0).unwrap();
    model
        .add_constraint(Constraint::le(
            LinearExpr::new().with_term(x, 1.0).with_term(y, 1.0),
            3.5,
        ))
        .unwrap();
    model
        .add_constraint(Constraint::le(
            LinearExpr::new().with_term(x, 1.0).with_term(y, -1.0),
            0.5,
        ))
        .unwrap();
    model
        .set_objective(LinearExpr::new().with_term(x, -1.0).with_term(y, -1.0))
        .unwrap();

    let report = BranchAndBound::new().solve(&mut model).unwrap();
    assert_abs_diff_eq!(report.objective_value, -3.0, epsilon = 1e-9);
    let (xv, yv) = (model.value(x).unwrap(), model.value(y).unwrap());
    assert!(xv <= yv + 1e-6);
    assert_abs_diff_eq!(xv.fract().min(1.0 - xv.fract()), 0.0, epsilon = 1e-6);
}

#[test]
fn test_free_and_upper_bounded_columns() {
    // min x - w  s.t.  x - z = 2,  z >= -5,  w <= 4;  z free, w only bounded above
    let mut model = Model::new();
    let x = model.add_var("x", VarKind::Continuous, -10.0, 10.0).unwrap();
    let z = model.add_free("z");
    let w = model
        .add_var("w", VarKind::Continuous, f64::NEG_INFINITY, 4.0)
        .unwrap();
    model
        .add_constraint(Constraint::eq(
            LinearExpr::new().with_term(x, 1.0).with_term(z, -1.0),
            2.0,
        ))
        .unwrap();
    model
        .add_constraint(Constraint::ge(LinearExpr::new().with_term(z, 1.0), -5.0))
        .unwrap();
    model
        .set_objective(LinearExpr::new().with_term(x, 1.0).with_term(w, -1.0))
        .unwrap();

    let report = BranchAndBound::new().solve(&mut model).unwrap();
    assert_abs_diff_eq!(model.value(x).unwrap(), -3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.value(z).unwrap(), -5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.value(w).unwrap(), 4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.objective_value, -7.0, epsilon = 1e-9);
}

#[test]
fn test_objective_constant_is_reported() {
    let mut model = Model::new();
    let x = model.add_binary("x");
    model
        .set_objective(LinearExpr::new().with_term(x, 1.0).with_constant(2.5))
        .unwrap();
    let report = BranchAndBound::new().solve(&mut model).unwrap();
    assert_abs_diff_eq!(report.objective_value, 2.5, epsilon = 1e-12);
    assert_abs_diff_eq!(model.objective_value().unwrap(), 2.5, epsilon = 1e-12);
}

#[test]
fn test_infeasible_model() {
    let mut model = Model::new();
    let x = model.add_binary("x");
    model
        .add_constraint(Constraint::ge(LinearExpr::new().with_term(x, 1.0), 2.0))
        .unwrap();
    let err = BranchAndBound::new().solve(&mut model).unwrap_err();
    assert_eq!(err, SolverError::Infeasible);
    assert!(!model.is_solved());
}

#[test]
fn test_integer_infeasible_model() {
    // 2x = 1 has no integer solution
    let mut model = Model::new();
    let x = model.add_var("x", VarKind::Integer, 0.0, 5.0).unwrap();
    model
        .add_constraint(Constraint::eq(LinearExpr::new().with_term(x, 2.0), 1.0))
        .unwrap();
    let err = BranchAndBound::new().solve(&mut model).unwrap_err();
    assert_eq!(err, SolverError::Infeasible);
}

#[test]
fn test_unbounded_model() {
    let mut model = Model::new();
    let x = model.add_free("x");
    model
        .set_objective(LinearExpr::new().with_term(x, 1.0))
        .unwrap();
    let err = BranchAndBound::new().solve(&mut model).unwrap_err();
    assert_eq!(err, SolverError::Unbounded);
}

#[test]
fn test_node_limit_without_incumbent() {
    let (mut model, _) = knapsack();
    let mut backend = BranchAndBound::new();
    let options = SolverOptions {
        node_limit: Some(1),
        ..SolverOptions::default()
    };
    backend.apply_options(&options).unwrap();

    let err = backend.solve(&mut model).unwrap_err();
    assert_eq!(err, SolverError::NodeLimit(1));
}

#[test]
fn test_typed_options_are_applied() {
    let mut backend = BranchAndBound::new();
    let options = SolverOptions {
        time_limit: Some(2.5),
        node_limit: Some(50),
        mip_gap: Some(0.01),
        int_feas_tol: Some(1e-5),
        tee: true,
        ..SolverOptions::default()
    };
    backend.apply_options(&options).unwrap();

    let settings = backend.settings();
    assert_eq!(settings.time_limit, Some(std::time::Duration::from_secs_f64(2.5)));
    assert_eq!(settings.node_limit, Some(50));
    assert_eq!(settings.mip_gap, 0.01);
    assert_eq!(settings.int_feas_tol, 1e-5);
    assert!(settings.tee);
}

#[test]
fn test_invalid_passthrough_option() {
    let mut backend = BranchAndBound::new();
    let err = backend
        .apply_options(&options(&[("node_selection", "random".into())]))
        .unwrap_err();
    assert!(matches!(err, SolverError::InvalidOption { ref key, .. } if key == "node_selection"));

    let err = backend
        .apply_options(&options(&[("max_lp_iterations", OptionValue::Integer(0))]))
        .unwrap_err();
    assert!(matches!(err, SolverError::InvalidOption { .. }));
}

#[test]
fn test_unknown_passthrough_option_is_ignored() {
    let mut backend = BranchAndBound::new();
    backend
        .apply_options(&options(&[("presolve", OptionValue::Bool(true))]))
        .unwrap();
    assert_eq!(backend.settings(), &BnbSettings::default());
}
