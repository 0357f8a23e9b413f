//! Tree surrogate fixtures over the features of
//! [`mixed_problem`](crate::problems::mixed_problem).
//!
//! `cost` is the sum of two trees:
//!
//! ```text
//! tree 0:  x <= 5 ? 1.0 : (c in {a, c} ? 2.0 : 4.0)      leaves "0", "10", "11"
//! tree 1:  x <= 2 ? 3.0 : (x <= 5 ? 0.5 : -1.0)          leaves "0", "10", "11"
//! ```
//!
//! Its minimum, `1.0`, is reached for `x > 5` with category `a` or `c`.
//! `risk` is a single tree, `x <= 5 ? 0.0 : 2.0`, minimized for `x <= 5`.

use treeopt_ensemble::{EnsembleModel, Node, Tree, TreeEnsemble};

fn tree(nodes: Vec<Node>) -> Tree {
    match Tree::new(nodes) {
        Ok(tree) => tree,
        Err(e) => panic!("invalid fixture tree: {e}"),
    }
}

fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Node {
    Node::Split {
        feature,
        threshold,
        left,
        right,
    }
}

fn leaf(value: f64) -> Node {
    Node::Leaf { value }
}

/// Trees of the `cost` objective.
pub fn cost_ensemble() -> TreeEnsemble {
    let first = tree(vec![
        split(0, 5.0, 1, 2),
        leaf(1.0),
        Node::CategorySplit {
            feature: 1,
            categories: vec![0, 2],
            left: 3,
            right: 4,
        },
        leaf(2.0),
        leaf(4.0),
    ]);
    let second = tree(vec![
        split(0, 2.0, 1, 2),
        leaf(3.0),
        split(0, 5.0, 3, 4),
        leaf(0.5),
        leaf(-1.0),
    ]);
    TreeEnsemble::new("cost", vec![first, second])
}

/// Trees of the `risk` objective.
pub fn risk_ensemble() -> TreeEnsemble {
    TreeEnsemble::new("risk", vec![tree(vec![split(0, 5.0, 1, 2), leaf(0.0), leaf(2.0)])])
}

/// Surrogate for [`mixed_problem`](crate::problems::mixed_problem).
pub fn cost_surrogate() -> EnsembleModel {
    EnsembleModel {
        ensembles: vec![cost_ensemble()],
        split_epsilon: treeopt_ensemble::DEFAULT_SPLIT_EPSILON,
    }
}

/// Surrogate for [`two_objective_problem`](crate::problems::two_objective_problem).
pub fn two_objective_surrogate() -> EnsembleModel {
    EnsembleModel {
        ensembles: vec![cost_ensemble(), risk_ensemble()],
        split_epsilon: treeopt_ensemble::DEFAULT_SPLIT_EPSILON,
    }
}
