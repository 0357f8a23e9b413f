//! Mixed-integer encoding of tree ensembles.
//!
//! Each tree gets one binary indicator per leaf, exactly one of which is
//! active. Every split bounds the indicators of its left subtree by the split
//! condition and those of its right subtree by its complement. Numeric
//! conditions are shared split variables; categorical
//! conditions are sums of one-hot indicators. The output variable of each
//! objective equals the aggregated value of the active leaves.

mod splits;

use tracing::debug;
use treeopt_core::{Constraint, LinearExpr, Model, TreeOptError, VarId};

use crate::ensemble::TreeEnsemble;
use crate::tree::{Node, Tree};

use splits::{category_vars, SplitVars};

/// Appends the encoding of `ensembles` to `model`.
///
/// The model must already carry one feature variable entry per feature the
/// trees split on. Leaf indicators are registered in the model's leaf index
/// and each objective's output variable is registered under its name.
///
/// # Errors
///
/// Returns [`TreeOptError::InvalidSurrogate`] if `epsilon` is not positive or
/// a tree is malformed (dangling or repeated child indices, non-finite
/// values). Returns an error if an objective is already encoded, a split
/// references a feature the model lacks or of the wrong kind, or a split
/// feature has infinite bounds.
pub fn encode_ensembles(
    model: &mut Model,
    ensembles: &[TreeEnsemble],
    epsilon: f64,
) -> Result<(), TreeOptError> {
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(TreeOptError::InvalidSurrogate(format!(
            "split epsilon must be positive, got {epsilon}"
        )));
    }
    for (i, ensemble) in ensembles.iter().enumerate() {
        ensemble
            .validate(None)
            .map_err(|e| TreeOptError::InvalidSurrogate(e.to_string()))?;
        let repeated = ensembles[..i].iter().any(|e| e.objective == ensemble.objective);
        if repeated || model.leaf_index().contains(&ensemble.objective) {
            return Err(TreeOptError::ModelMismatch(format!(
                "objective '{}' is already encoded",
                ensemble.objective
            )));
        }
    }

    let split_vars = SplitVars::build(
        model,
        ensembles.iter().flat_map(TreeEnsemble::split_nodes),
        epsilon,
    )?;
    debug!(event = "split_vars", count = split_vars.len());

    for ensemble in ensembles {
        encode_ensemble(model, ensemble, &split_vars)?;
    }
    Ok(())
}

fn encode_ensemble(
    model: &mut Model,
    ensemble: &TreeEnsemble,
    split_vars: &SplitVars,
) -> Result<(), TreeOptError> {
    let objective = ensemble.objective.as_str();
    let scale = ensemble.leaf_scale();

    model.leaf_index_mut().push_objective(objective);

    let mut output = LinearExpr::new();
    let mut num_leaves = 0;
    for (t, tree) in ensemble.trees.iter().enumerate() {
        let leaf_vars = encode_tree(model, objective, t, tree, split_vars)?;
        for (node, var) in leaf_vars.iter().enumerate() {
            if let (Some(var), Node::Leaf { value }) = (var, &tree.nodes()[node]) {
                output.add_term(*var, scale * value);
            }
        }
        num_leaves += tree.num_leaves();
    }

    let mu = model.add_free(format!("mu[{objective}]"));
    let mut definition = LinearExpr::from(mu);
    definition.add_scaled(&output, -1.0);
    model.add_constraint(
        Constraint::eq(definition, ensemble.base_score).with_name(format!("output[{objective}]")),
    )?;
    model.set_output(objective, mu);

    debug!(
        event = "encode_ensemble",
        objective = objective,
        trees = ensemble.num_trees(),
        leaves = num_leaves,
    );
    Ok(())
}

/// Encodes one tree; returns the indicator of every leaf node by node index.
fn encode_tree(
    model: &mut Model,
    objective: &str,
    t: usize,
    tree: &Tree,
    split_vars: &SplitVars,
) -> Result<Vec<Option<VarId>>, TreeOptError> {
    let mut leaf_vars = vec![None; tree.nodes().len()];
    let mut leaves = Vec::with_capacity(tree.num_leaves());
    for (leaf, node) in tree.leaves() {
        let z = model.add_binary(format!("z[{objective},{t},{}]", leaf.as_str()));
        leaf_vars[node] = Some(z);
        leaves.push((leaf, z));
    }

    model.add_constraint(
        Constraint::eq(LinearExpr::sum(leaves.iter().map(|&(_, z)| z)), 1.0)
            .with_name(format!("one_leaf[{objective},{t}]")),
    )?;

    let sum_below = |idx: usize| {
        LinearExpr::sum(tree.leaves_below(idx).into_iter().filter_map(|n| leaf_vars[n]))
    };

    for (idx, node) in tree.nodes().iter().enumerate() {
        let (condition, left, right) = match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let y = split_vars.var(*feature, *threshold).ok_or_else(|| {
                    TreeOptError::ModelMismatch(format!(
                        "no split variable for feature {feature} at {threshold}"
                    ))
                })?;
                (LinearExpr::from(y), *left, *right)
            }
            Node::CategorySplit {
                feature,
                categories,
                left,
                right,
            } => {
                let vars = category_vars(model, *feature, categories)?;
                (LinearExpr::sum(vars), *left, *right)
            }
            Node::Leaf { .. } => continue,
        };

        let mut left_row = sum_below(left);
        left_row.add_scaled(&condition, -1.0);
        model.add_constraint(
            Constraint::le(left_row, 0.0).with_name(format!("left[{objective},{t},{idx}]")),
        )?;

        let mut right_row = sum_below(right);
        right_row.add_scaled(&condition, 1.0);
        model.add_constraint(
            Constraint::le(right_row, 1.0).with_name(format!("right[{objective},{t},{idx}]")),
        )?;
    }

    model.leaf_index_mut().push_tree(objective, leaves);
    Ok(leaf_vars)
}
