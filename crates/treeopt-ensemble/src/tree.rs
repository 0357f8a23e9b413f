//! Binary decision trees stored as node arenas.

use serde::{Deserialize, Serialize};
use treeopt_core::LeafId;

use crate::error::EnsembleError;

/// A node in a decision tree.
///
/// Children are indices into the owning [`Tree`]'s node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Numeric split: go left if `x[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Categorical split: go left if the category index of `x[feature]` is
    /// one of `categories`.
    CategorySplit {
        feature: usize,
        categories: Vec<usize>,
        left: usize,
        right: usize,
    },
    /// Leaf with its prediction value.
    Leaf { value: f64 },
}

impl Node {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Child indices, if this is a split node.
    #[inline]
    pub fn children(&self) -> Option<(usize, usize)> {
        match self {
            Node::Split { left, right, .. } | Node::CategorySplit { left, right, .. } => {
                Some((*left, *right))
            }
            Node::Leaf { .. } => None,
        }
    }

    /// Feature index tested by this node, if it is a split.
    #[inline]
    pub fn feature(&self) -> Option<usize> {
        match self {
            Node::Split { feature, .. } | Node::CategorySplit { feature, .. } => Some(*feature),
            Node::Leaf { .. } => None,
        }
    }

    /// Returns true if `x` is routed to the left child.
    ///
    /// Returns `None` for leaves.
    fn go_left(&self, x: &[f64]) -> Option<bool> {
        match self {
            Node::Split {
                feature, threshold, ..
            } => Some(x[*feature] <= *threshold),
            Node::CategorySplit {
                feature,
                categories,
                ..
            } => {
                let category = x[*feature].round();
                Some(categories.iter().any(|&c| c as f64 == category))
            }
            Node::Leaf { .. } => None,
        }
    }
}

/// A binary decision tree. Node `0` is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a tree from its node arena, validating the structure.
    ///
    /// # Errors
    ///
    /// Returns [`EnsembleError::Invalid`] if the tree is empty, a child index
    /// is out of range, or a node is unreachable or reachable twice.
    pub fn new(nodes: Vec<Node>) -> Result<Self, EnsembleError> {
        let tree = Self { nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Single-leaf tree.
    pub fn constant(value: f64) -> Self {
        Self {
            nodes: vec![Node::Leaf { value }],
        }
    }

    /// Checks that the nodes form one tree rooted at node 0.
    pub fn validate(&self) -> Result<(), EnsembleError> {
        if self.nodes.is_empty() {
            return Err(EnsembleError::Invalid("tree has no nodes".to_string()));
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else {
                return Err(EnsembleError::Invalid(format!(
                    "child index {idx} out of range ({} nodes)",
                    self.nodes.len()
                )));
            };
            if std::mem::replace(&mut seen[idx], true) {
                return Err(EnsembleError::Invalid(format!(
                    "node {idx} is reachable more than once"
                )));
            }
            match node {
                Node::Split { threshold, .. } if !threshold.is_finite() => {
                    return Err(EnsembleError::Invalid(format!(
                        "node {idx} has non-finite threshold {threshold}"
                    )));
                }
                Node::CategorySplit { categories, .. } if categories.is_empty() => {
                    return Err(EnsembleError::Invalid(format!(
                        "node {idx} splits on an empty category set"
                    )));
                }
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(EnsembleError::Invalid(format!(
                        "leaf {idx} has non-finite value {value}"
                    )));
                }
                _ => {}
            }
            if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
            }
        }
        if let Some(orphan) = seen.iter().position(|s| !s) {
            return Err(EnsembleError::Invalid(format!(
                "node {orphan} is not reachable from the root"
            )));
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Leaves in depth-first, left-first order with their node indices.
    pub fn leaves(&self) -> Vec<(LeafId, usize)> {
        let mut leaves = Vec::new();
        let mut stack = vec![(0, LeafId::root())];
        while let Some((idx, path)) = stack.pop() {
            match self.nodes[idx].children() {
                Some((left, right)) => {
                    stack.push((right, path.right()));
                    stack.push((left, path.left()));
                }
                None => leaves.push((path, idx)),
            }
        }
        leaves
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Node indices of the leaves below `idx`, left-first.
    pub fn leaves_below(&self, idx: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![idx];
        while let Some(idx) = stack.pop() {
            match self.nodes[idx].children() {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => leaves.push(idx),
            }
        }
        leaves
    }

    /// Routes a raw point to its leaf.
    ///
    /// `x` holds one value per feature, with category indices for
    /// categorical features.
    ///
    /// # Panics
    ///
    /// Panics if a split tests a feature index outside `x`.
    pub fn leaf_of(&self, x: &[f64]) -> (LeafId, f64) {
        let mut idx = 0;
        let mut path = LeafId::root();
        loop {
            let node = &self.nodes[idx];
            match (node.go_left(x), node.children()) {
                (Some(true), Some((left, _))) => {
                    idx = left;
                    path = path.left();
                }
                (Some(false), Some((_, right))) => {
                    idx = right;
                    path = path.right();
                }
                _ => {
                    let value = match node {
                        Node::Leaf { value } => *value,
                        _ => 0.0,
                    };
                    return (path, value);
                }
            }
        }
    }

    /// Prediction of this tree for a raw point.
    pub fn predict(&self, x: &[f64]) -> f64 {
        self.leaf_of(x).1
    }

    /// Largest feature index used by a split.
    pub fn max_feature(&self) -> Option<usize> {
        self.nodes.iter().filter_map(Node::feature).max()
    }

    pub fn depth(&self) -> usize {
        self.leaves()
            .iter()
            .map(|(leaf, _)| leaf.depth())
            .max()
            .unwrap_or(0)
    }
}
