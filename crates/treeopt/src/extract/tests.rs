use treeopt_core::{FeatureValue, LeafId, Model, ProblemConfig};
use treeopt_ensemble::TreeModel;
use treeopt_test::{cost_surrogate, mixed_problem, Assignment};

use super::*;

fn encoded() -> (ProblemConfig, Model) {
    let problem = mixed_problem();
    let mut model = problem.model_core().unwrap();
    cost_surrogate().add_to_model(&mut model).unwrap();
    (problem, model)
}

fn solved(model: &mut Model, values: Vec<f64>) {
    model.set_solution(values, 0.0).unwrap();
}

#[test]
fn test_category_from_one_hot() {
    let (problem, mut model) = encoded();
    let values = Assignment::zeros(&model)
        .feature(&model, 0, 3.7)
        .one_hot(&model, 1, &[0.0, 1.0, 0.0])
        .into_values();
    solved(&mut model, values);

    let solution = extract_solution(&problem, &model).unwrap();
    assert_eq!(
        solution,
        vec![FeatureValue::Real(3.7), FeatureValue::Category("b".to_string())]
    );
}

#[test]
fn test_continuous_value_is_not_rounded() {
    let (problem, mut model) = encoded();
    let values = Assignment::zeros(&model)
        .feature(&model, 0, 3.7)
        .one_hot(&model, 1, &[1.0, 0.0, 0.0])
        .into_values();
    solved(&mut model, values);

    let solution = extract_solution(&problem, &model).unwrap();
    assert_eq!(solution[0], FeatureValue::Real(3.7));
}

#[test]
fn test_indicators_are_rounded() {
    let (problem, mut model) = encoded();
    let values = Assignment::zeros(&model)
        .one_hot(&model, 1, &[1e-9, 2e-7, 0.9999998])
        .into_values();
    solved(&mut model, values);

    let solution = extract_solution(&problem, &model).unwrap();
    assert_eq!(solution[1], FeatureValue::Category("c".to_string()));
}

#[test]
fn test_no_active_category_is_an_error() {
    let (problem, mut model) = encoded();
    let values = Assignment::zeros(&model).into_values();
    solved(&mut model, values);

    match extract_solution(&problem, &model) {
        Err(OptimizerError::CategoryNotDetermined { feature, active }) => {
            assert_eq!(feature, "c");
            assert_eq!(active, 0);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_several_active_categories_is_an_error() {
    let (problem, mut model) = encoded();
    let values = Assignment::zeros(&model)
        .one_hot(&model, 1, &[1.0, 0.0, 1.0])
        .into_values();
    solved(&mut model, values);

    assert!(matches!(
        extract_solution(&problem, &model),
        Err(OptimizerError::CategoryNotDetermined { active: 2, .. })
    ));
}

#[test]
fn test_unsolved_model() {
    let (problem, model) = encoded();
    assert!(matches!(
        extract_solution(&problem, &model),
        Err(OptimizerError::Model(TreeOptError::Unsolved))
    ));
}

#[test]
fn test_model_from_other_problem() {
    let (_, mut model) = encoded();
    let values = vec![0.0; model.num_vars()];
    solved(&mut model, values);

    let mut other = ProblemConfig::new();
    other.add_categorical("x", ["u", "v"]).unwrap();
    assert!(matches!(
        extract_solution(&other, &model),
        Err(OptimizerError::Model(TreeOptError::ModelMismatch(_)))
    ));
}

#[test]
fn test_active_leaves_in_encoding_order() {
    let (problem, mut model) = encoded();
    let values = Assignment::zeros(&model)
        .leaf(&model, "cost", 1, "11")
        .leaf(&model, "cost", 0, "0")
        .into_values();
    solved(&mut model, values);

    let active = active_leaves(&problem, &cost_surrogate(), &model).unwrap();
    assert_eq!(
        active,
        vec![vec![(0, LeafId::from("0")), (1, LeafId::from("11"))]]
    );
}

#[test]
fn test_active_leaves_round_indicators() {
    let (problem, mut model) = encoded();
    let z = model.leaf_var("cost", 0, &LeafId::from("10")).unwrap();
    let half = model.leaf_var("cost", 1, &LeafId::from("0")).unwrap();
    let values = Assignment::zeros(&model)
        .set(z, 0.9999997)
        .set(half, 0.4)
        .into_values();
    solved(&mut model, values);

    let active = active_leaves(&problem, &cost_surrogate(), &model).unwrap();
    assert_eq!(active, vec![vec![(0, LeafId::from("10"))]]);
}

#[test]
fn test_output_values_in_problem_order() {
    let (problem, mut model) = encoded();
    let values = Assignment::zeros(&model)
        .output(&model, "cost", 2.5)
        .into_values();
    solved(&mut model, values);
    assert_eq!(output_values(&problem, &model).unwrap(), vec![2.5]);

    let mut bare = mixed_problem().model_core().unwrap();
    let values = vec![0.0; bare.num_vars()];
    solved(&mut bare, values);
    assert!(matches!(
        output_values(&problem, &bare),
        Err(OptimizerError::Model(TreeOptError::UnknownObjective(_)))
    ));
}

/// Reports the encoded leaves of each tree back to front, plus one leaf the
/// encoder never created when `phantom` is set.
struct Reordered {
    phantom: bool,
}

impl TreeModel for Reordered {
    fn add_to_model(&self, model: &mut Model) -> Result<(), TreeOptError> {
        cost_surrogate().add_to_model(model)
    }

    fn leaves(&self, model: &Model, objective: &str, tree: usize) -> Vec<LeafId> {
        let mut leaves: Vec<LeafId> = model.leaves(objective, tree).cloned().collect();
        leaves.reverse();
        if self.phantom {
            leaves.push(LeafId::from("111"));
        }
        leaves
    }
}

#[test]
fn test_active_leaves_follow_tree_model_order() {
    let problem = mixed_problem();
    let mut model = problem.model_core().unwrap();
    Reordered { phantom: false }.add_to_model(&mut model).unwrap();
    let values = Assignment::zeros(&model)
        .leaf(&model, "cost", 0, "10")
        .leaf(&model, "cost", 0, "0")
        .leaf(&model, "cost", 1, "11")
        .into_values();
    solved(&mut model, values);

    let active = active_leaves(&problem, &Reordered { phantom: false }, &model).unwrap();
    assert_eq!(
        active,
        vec![vec![
            (0, LeafId::from("10")),
            (0, LeafId::from("0")),
            (1, LeafId::from("11")),
        ]]
    );

    assert!(matches!(
        active_leaves(&problem, &Reordered { phantom: true }, &model),
        Err(OptimizerError::Model(TreeOptError::ModelMismatch(_)))
    ));
}
