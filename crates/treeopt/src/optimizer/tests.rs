use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use treeopt_config::OptimizerConfig;
use treeopt_core::{Constraint, FeatureValue, FeatureVars, LeafId, LinearExpr};
use treeopt_ensemble::{EnsembleModel, TreeEnsemble};
use treeopt_solver::{SolverError, SolverRegistry};
use treeopt_test::{
    cost_surrogate, mixed_problem, two_objective_problem, two_objective_surrogate, Assignment,
    FailingBackend, ScriptedBackend,
};

use super::*;

fn scripted_optimizer(backend: &ScriptedBackend) -> Optimizer {
    let backend = backend.clone();
    let registry = SolverRegistry::default().with_backend("scripted", move || Box::new(backend.clone()));
    let config = OptimizerConfig::new()
        .with_solver_name("scripted")
        .with_time_limit(5.0)
        .with_option("presolve", "off");
    Optimizer::with_registry(mixed_problem(), config, registry)
}

/// x = 3.7, category b, leaves (0, "0") and (1, "11").
fn fixed_point() -> ScriptedBackend {
    ScriptedBackend::new(|m| {
        Assignment::zeros(m)
            .feature(m, 0, 3.7)
            .one_hot(m, 1, &[0.0, 1.0, 0.0])
            .leaf(m, "cost", 0, "0")
            .leaf(m, "cost", 1, "11")
            .output(m, "cost", 0.0)
            .into_values()
    })
}

fn category(value: &FeatureValue) -> &str {
    value.as_category().unwrap_or("<not a category>")
}

#[test]
fn test_accessors_before_solve() {
    let optimizer = Optimizer::new(mixed_problem(), OptimizerConfig::default());
    assert!(matches!(
        optimizer.current_solution(),
        Err(OptimizerError::NotSolved)
    ));
    assert!(matches!(
        optimizer.active_leaf_solution(),
        Err(OptimizerError::NotSolved)
    ));
}

#[test]
fn test_solve_with_branch_and_bound() {
    let mut optimizer = Optimizer::new(mixed_problem(), OptimizerConfig::default());
    let result = optimizer.solve(&cost_surrogate(), None, None).unwrap();

    assert_abs_diff_eq!(result.objective_value, 1.0, epsilon = 1e-5);
    assert_eq!(result.uncertainty_values.len(), 1);
    assert_abs_diff_eq!(result.uncertainty_values[0], 1.0, epsilon = 1e-5);

    let x = result.solution[0].as_f64().unwrap();
    assert!(x >= 5.0 - 1e-6, "x = {x}");
    assert!(matches!(category(&result.solution[1]), "a" | "c"));

    assert_eq!(optimizer.current_solution().unwrap(), result.solution.as_slice());
    assert_eq!(
        optimizer.active_leaf_solution().unwrap(),
        &vec![vec![(0, LeafId::from("10")), (1, LeafId::from("11"))]]
    );
}

#[test]
fn test_resolve_is_idempotent() {
    let mut optimizer = Optimizer::new(mixed_problem(), OptimizerConfig::default());
    let surrogate = cost_surrogate();
    let first = optimizer.solve(&surrogate, None, None).unwrap();
    let first_leaves = optimizer.active_leaf_solution().unwrap().clone();
    let second = optimizer.solve(&surrogate, None, None).unwrap();

    assert_eq!(first, second);
    assert_eq!(&first_leaves, optimizer.active_leaf_solution().unwrap());
}

#[test]
fn test_weights_must_sum_to_exactly_one() {
    let backend = fixed_point();
    let mut optimizer = Optimizer::with_registry(
        two_objective_problem(),
        OptimizerConfig::new().with_solver_name("scripted"),
        SolverRegistry::empty().with_backend("scripted", {
            let backend = backend.clone();
            move || Box::new(backend.clone())
        }),
    );
    let surrogate = two_objective_surrogate();

    for weights in [[0.5, 0.499], [0.5, 0.501]] {
        match optimizer.solve(&surrogate, None, Some(&weights)) {
            Err(OptimizerError::WeightsNotNormalized { sum }) => {
                assert_abs_diff_eq!(sum, weights[0] + weights[1])
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
    assert!(matches!(
        optimizer.solve(&surrogate, None, Some(&[1.0])),
        Err(OptimizerError::WeightCountMismatch {
            weights: 1,
            objectives: 2
        })
    ));

    assert_eq!(backend.solve_count(), 0);
    assert!(backend.applied_options().is_empty());
    assert!(optimizer.current_solution().is_err());
}

#[test]
fn test_weights_choose_trade_off() {
    let mut optimizer = Optimizer::new(two_objective_problem(), OptimizerConfig::default());
    let surrogate = two_objective_surrogate();

    let balanced = optimizer.solve(&surrogate, None, Some(&[0.5, 0.5])).unwrap();
    let x = balanced.solution[0].as_f64().unwrap();
    assert!(x > 2.0 && x <= 5.0 + 1e-6, "x = {x}");
    assert_abs_diff_eq!(balanced.objective_value, 0.75, epsilon = 1e-5);
    assert_abs_diff_eq!(balanced.uncertainty_values[0], 1.5, epsilon = 1e-5);
    assert_abs_diff_eq!(balanced.uncertainty_values[1], 0.0, epsilon = 1e-5);

    let cost_heavy = optimizer
        .solve(&surrogate, None, Some(&[0.875, 0.125]))
        .unwrap();
    assert!(cost_heavy.solution[0].as_f64().unwrap() >= 5.0 - 1e-6);
    assert_abs_diff_eq!(cost_heavy.objective_value, 1.125, epsilon = 1e-5);
    assert_eq!(optimizer.active_leaf_solution().unwrap().len(), 2);
}

#[test]
fn test_scripted_solution_is_decoded() {
    let backend = fixed_point();
    let mut optimizer = scripted_optimizer(&backend);
    let result = optimizer.solve(&cost_surrogate(), None, None).unwrap();

    assert_eq!(result.solution[0], FeatureValue::Real(3.7));
    assert_eq!(category(&result.solution[1]), "b");
    assert_eq!(
        optimizer.active_leaf_solution().unwrap(),
        &vec![vec![(0, LeafId::from("0")), (1, LeafId::from("11"))]]
    );
    assert_eq!(backend.solve_count(), 1);
}

#[test]
fn test_solver_options_are_applied() {
    let backend = fixed_point();
    let mut optimizer = scripted_optimizer(&backend);
    optimizer.solve(&cost_surrogate(), None, None).unwrap();

    let applied = backend.applied_options();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0], optimizer.config().solver_options);
    assert_eq!(applied[0].time_limit, Some(5.0));
    assert_eq!(
        applied[0].extra.get("presolve").and_then(|v| v.as_str()),
        Some("off")
    );
}

#[test]
fn test_solution_is_overwritten_by_next_solve() {
    let calls = Arc::new(AtomicUsize::new(0));
    let backend = ScriptedBackend::new({
        let calls = Arc::clone(&calls);
        move |m| {
            let first = calls.fetch_add(1, Ordering::SeqCst) == 0;
            let indicators: &[f64] = if first {
                &[1.0, 0.0, 0.0]
            } else {
                &[0.0, 0.0, 1.0]
            };
            Assignment::zeros(m)
                .feature(m, 0, if first { 1.0 } else { 9.0 })
                .one_hot(m, 1, indicators)
                .into_values()
        }
    });
    let mut optimizer = scripted_optimizer(&backend);
    let surrogate = cost_surrogate();

    let first = optimizer.solve(&surrogate, None, None).unwrap();
    assert_eq!(category(&first.solution[1]), "a");
    assert_eq!(optimizer.current_solution().unwrap(), first.solution.as_slice());

    let second = optimizer.solve(&surrogate, None, None).unwrap();
    assert_eq!(category(&second.solution[1]), "c");
    assert_eq!(second.solution[0], FeatureValue::Real(9.0));
    assert_eq!(optimizer.current_solution().unwrap(), second.solution.as_slice());
}

#[test]
fn test_failed_solve_keeps_previous_state() {
    let good = fixed_point();
    let mut optimizer = scripted_optimizer(&good);
    let surrogate = cost_surrogate();
    let first = optimizer.solve(&surrogate, None, None).unwrap();

    // Same optimizer, but the indicators no longer select a category.
    let broken = ScriptedBackend::new(|m| Assignment::zeros(m).into_values());
    let registry = optimizer
        .registry()
        .clone()
        .with_backend("scripted", move || Box::new(broken.clone()));
    let mut optimizer = Optimizer {
        registry,
        ..optimizer
    };

    assert!(matches!(
        optimizer.solve(&surrogate, None, None),
        Err(OptimizerError::CategoryNotDetermined { active: 0, .. })
    ));
    assert_eq!(optimizer.current_solution().unwrap(), first.solution.as_slice());
}

#[test]
fn test_solver_errors_propagate_verbatim() {
    let registry = SolverRegistry::default()
        .with_backend("failing", || Box::new(FailingBackend(SolverError::Infeasible)));
    let mut optimizer = Optimizer::with_registry(
        mixed_problem(),
        OptimizerConfig::new().with_solver_name("failing"),
        registry,
    );
    assert!(matches!(
        optimizer.solve(&cost_surrogate(), None, None),
        Err(OptimizerError::Solver(SolverError::Infeasible))
    ));
    assert!(optimizer.active_leaf_solution().is_err());
}

#[test]
fn test_unknown_backend() {
    let mut optimizer = Optimizer::new(
        mixed_problem(),
        OptimizerConfig::new().with_solver_name("gurobi"),
    );
    match optimizer.solve(&cost_surrogate(), None, None) {
        Err(OptimizerError::Solver(SolverError::UnknownBackend { name, .. })) => {
            assert_eq!(name, "gurobi")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_caller_model_is_copied() {
    let problem = mixed_problem();
    let mut core = problem.model_core().unwrap();
    let x = match core.feature_var(0) {
        Some(FeatureVars::Single(var)) => *var,
        other => panic!("unexpected feature vars: {other:?}"),
    };
    core.add_constraint(Constraint::le(LinearExpr::from(x), 3.0))
        .unwrap();
    let snapshot = core.clone();

    let mut optimizer = Optimizer::new(problem, OptimizerConfig::default());
    let result = optimizer.solve(&cost_surrogate(), Some(&core), None).unwrap();

    // The user constraint keeps x out of the best region (x > 5).
    let xv = result.solution[0].as_f64().unwrap();
    assert!(xv > 2.0 && xv <= 3.0 + 1e-6, "x = {xv}");
    assert_abs_diff_eq!(result.objective_value, 1.5, epsilon = 1e-5);
    assert_eq!(core, snapshot);
}

#[test]
fn test_foreign_model_is_rejected() {
    let mut other = ProblemConfig::new();
    other.add_integer("n", 0, 3).unwrap();
    let foreign = other.model_core().unwrap();

    let mut optimizer = Optimizer::new(mixed_problem(), OptimizerConfig::default());
    assert!(matches!(
        optimizer.solve(&cost_surrogate(), Some(&foreign), None),
        Err(OptimizerError::Model(_))
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = OptimizerConfig::default();
    config.solver_options.mip_gap = Some(2.0);
    let mut optimizer = Optimizer::new(mixed_problem(), config);
    assert!(matches!(
        optimizer.solve(&cost_surrogate(), None, None),
        Err(OptimizerError::Config(_))
    ));
}

#[test]
fn test_malformed_surrogate_is_an_error() {
    let ensemble: TreeEnsemble = serde_yaml::from_str(
        r#"
objective: cost
trees:
  - nodes:
      - { type: split, feature: 0, threshold: 2.0, left: 1, right: 7 }
      - { type: leaf, value: 1.0 }
"#,
    )
    .unwrap();

    let mut optimizer = Optimizer::new(mixed_problem(), OptimizerConfig::default());
    assert!(matches!(
        optimizer.solve(&ensemble, None, None),
        Err(OptimizerError::Model(TreeOptError::InvalidSurrogate(_)))
    ));

    let unchecked_epsilon = EnsembleModel {
        split_epsilon: 0.0,
        ..cost_surrogate()
    };
    assert!(matches!(
        optimizer.solve(&unchecked_epsilon, None, None),
        Err(OptimizerError::Model(TreeOptError::InvalidSurrogate(_)))
    ));
    assert!(optimizer.current_solution().is_err());
}
