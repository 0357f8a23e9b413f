use treeopt_config::SolverOptions;
use treeopt_core::{LinearExpr, Model};

use super::*;

#[derive(Debug)]
struct FixedBackend;

impl SolverBackend for FixedBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    fn apply_options(&mut self, _options: &SolverOptions) -> Result<(), SolverError> {
        Ok(())
    }

    fn solve(&mut self, model: &mut Model) -> Result<SolveReport, SolverError> {
        let values = vec![0.0; model.num_vars()];
        model.set_solution(values, 0.0)?;
        Ok(SolveReport {
            status: SolveStatus::Optimal,
            objective_value: 0.0,
            best_bound: 0.0,
            nodes: 0,
            elapsed: std::time::Duration::ZERO,
        })
    }
}

#[test]
fn test_default_registry_has_bnb() {
    let registry = SolverRegistry::default();
    let names: Vec<_> = registry.names().collect();
    assert_eq!(names, vec!["bnb", "branch_and_bound"]);
    assert_eq!(registry.create("bnb").unwrap().name(), "bnb");
}

#[test]
fn test_unknown_backend_lists_available() {
    let registry = SolverRegistry::default();
    let err = registry.create("gurobi").unwrap_err();
    match err {
        SolverError::UnknownBackend { name, available } => {
            assert_eq!(name, "gurobi");
            assert_eq!(available, "bnb, branch_and_bound");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_empty_registry() {
    let registry = SolverRegistry::empty();
    assert!(!registry.contains("bnb"));
    assert!(registry.create("bnb").is_err());
}

#[test]
fn test_register_custom_backend() {
    let registry = SolverRegistry::default().with_backend("fixed", || Box::new(FixedBackend));
    assert!(registry.contains("fixed"));

    let mut model = Model::new();
    let x = model.add_binary("x");
    model
        .set_objective(LinearExpr::new().with_term(x, 1.0))
        .unwrap();

    let mut backend = registry.create("fixed").unwrap();
    let report = backend.solve(&mut model).unwrap();
    assert!(report.status.is_optimal());
    assert_eq!(model.value(x).unwrap(), 0.0);
}

#[test]
fn test_register_replaces_existing() {
    let mut registry = SolverRegistry::default();
    registry.register("bnb", || Box::new(FixedBackend));
    assert_eq!(registry.create("bnb").unwrap().name(), "fixed");
}

#[test]
fn test_status_display() {
    assert_eq!(SolveStatus::Optimal.to_string(), "optimal");
    assert_eq!(SolveStatus::NodeLimit.to_string(), "node_limit");
    assert!(!SolveStatus::TimeLimit.is_optimal());
}
