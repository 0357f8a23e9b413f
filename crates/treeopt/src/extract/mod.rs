//! Reading decoded results back from a solved model.

use std::collections::HashMap;

use treeopt_core::{FeatureValue, FeatureVars, LeafId, Model, ProblemConfig, TreeOptError, VarId};
use treeopt_ensemble::TreeModel;

use crate::error::OptimizerError;

/// Active leaves per objective, as `(tree_index, leaf_id)` pairs.
pub type ActiveLeaves = Vec<Vec<(usize, LeafId)>>;

/// Decodes the solved feature variables of `model`.
///
/// Categorical features select the single one-hot indicator that rounds to
/// 1. Numeric features pass their solved value through unchanged; the final
/// [`ProblemConfig::decode`] call turns the raw vector into feature values.
///
/// # Errors
///
/// - [`OptimizerError::CategoryNotDetermined`] if zero or several indicators
///   of a categorical feature are active
/// - [`OptimizerError::Model`] if the model is unsolved or its feature
///   variables do not match `problem`
pub fn extract_solution(
    problem: &ProblemConfig,
    model: &Model,
) -> Result<Vec<FeatureValue>, OptimizerError> {
    let mut raw = Vec::with_capacity(problem.features().len());
    for (idx, feature) in problem.features().iter().enumerate() {
        let value = match (model.feature_var(idx), feature.is_categorical()) {
            (Some(FeatureVars::OneHot(vars)), true) => {
                let mut active = Vec::new();
                for (category, var) in vars.iter().enumerate() {
                    if model.value(*var)?.round() == 1.0 {
                        active.push(category);
                    }
                }
                match active.as_slice() {
                    [category] => *category as f64,
                    _ => {
                        return Err(OptimizerError::CategoryNotDetermined {
                            feature: feature.name().to_string(),
                            active: active.len(),
                        })
                    }
                }
            }
            (Some(FeatureVars::Single(var)), false) => model.value(*var)?,
            _ => {
                return Err(TreeOptError::ModelMismatch(format!(
                    "no matching variables for feature '{}'",
                    feature.name()
                ))
                .into())
            }
        };
        raw.push(value);
    }
    Ok(problem.decode(&raw)?)
}

/// Collects the leaves whose indicator rounds to 1, per objective.
///
/// Objectives follow the order of `problem`; within an objective, trees and
/// leaves follow the order the tree model encoded them in.
pub fn active_leaves<T>(
    problem: &ProblemConfig,
    tree_model: &T,
    model: &Model,
) -> Result<ActiveLeaves, OptimizerError>
where
    T: TreeModel + ?Sized,
{
    problem
        .objectives()
        .iter()
        .map(|objective| -> Result<_, OptimizerError> {
            let name = objective.name();
            let mut active = Vec::new();
            for tree in 0..tree_model.num_trees(model, name) {
                let indicators: HashMap<&LeafId, VarId> = model
                    .leaf_index()
                    .leaves(name, tree)
                    .iter()
                    .map(|(leaf, var)| (leaf, *var))
                    .collect();
                for leaf in tree_model.leaves(model, name, tree) {
                    let var = indicators.get(&leaf).copied().ok_or_else(|| {
                        TreeOptError::ModelMismatch(format!(
                            "leaf {leaf} of tree {tree} for '{name}' has no indicator"
                        ))
                    })?;
                    if model.value(var)?.round() == 1.0 {
                        active.push((tree, leaf));
                    }
                }
            }
            Ok(active)
        })
        .collect()
}

/// Solved output value of every objective, in problem order.
pub fn output_values(problem: &ProblemConfig, model: &Model) -> Result<Vec<f64>, OptimizerError> {
    problem
        .objectives()
        .iter()
        .map(|objective| -> Result<f64, OptimizerError> {
            let var = model
                .output_var(objective.name())
                .ok_or_else(|| TreeOptError::UnknownObjective(objective.name().to_string()))?;
            Ok(model.value(var)?)
        })
        .collect()
}

#[cfg(test)]
mod tests;
