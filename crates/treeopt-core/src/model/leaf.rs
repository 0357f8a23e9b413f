//! Leaf identifiers and the per-objective leaf indicator index.

use std::fmt;

use super::VarId;

/// Identifies a leaf by its path from the root.
///
/// Each character is `'0'` for a left branch and `'1'` for a right branch.
/// The root of a single-leaf tree has the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeafId(String);

impl LeafId {
    /// The root path.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Creates a leaf id from an explicit path string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Path of the left child.
    pub fn left(&self) -> Self {
        let mut path = self.0.clone();
        path.push('0');
        Self(path)
    }

    /// Path of the right child.
    pub fn right(&self) -> Self {
        let mut path = self.0.clone();
        path.push('1');
        Self(path)
    }

    /// Depth of the leaf (number of branches from the root).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for LeafId {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

/// Leaves of one encoded tree, in the order their indicators were created.
pub type TreeLeaves = Vec<(LeafId, VarId)>;

/// Leaf indicator variables per objective and tree.
///
/// Order is significant: trees are stored in encoding order and, within a
/// tree, leaves are stored in the order the encoder created their indicator
/// variables. Active-leaf extraction walks this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafIndex {
    objectives: Vec<(String, Vec<TreeLeaves>)>,
}

impl LeafIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `objective` without trees. Does nothing if it is known.
    pub fn push_objective(&mut self, objective: &str) {
        self.trees_mut(objective);
    }

    fn trees_mut(&mut self, objective: &str) -> &mut Vec<TreeLeaves> {
        let pos = match self.objectives.iter().position(|(name, _)| name == objective) {
            Some(pos) => pos,
            None => {
                self.objectives.push((objective.to_string(), Vec::new()));
                self.objectives.len() - 1
            }
        };
        &mut self.objectives[pos].1
    }

    /// Appends a tree for `objective` and returns its tree index.
    pub fn push_tree(&mut self, objective: &str, leaves: TreeLeaves) -> usize {
        let trees = self.trees_mut(objective);
        trees.push(leaves);
        trees.len() - 1
    }

    fn trees(&self, objective: &str) -> Option<&[TreeLeaves]> {
        self.objectives
            .iter()
            .find(|(name, _)| name == objective)
            .map(|(_, trees)| trees.as_slice())
    }

    /// Returns true if `objective` was registered.
    pub fn contains(&self, objective: &str) -> bool {
        self.trees(objective).is_some()
    }

    /// Number of trees encoded for `objective` (0 if none).
    pub fn num_trees(&self, objective: &str) -> usize {
        self.trees(objective).map_or(0, <[TreeLeaves]>::len)
    }

    /// Leaves of tree `tree` for `objective`, in creation order.
    pub fn leaves(&self, objective: &str, tree: usize) -> &[(LeafId, VarId)] {
        self.trees(objective)
            .and_then(|trees| trees.get(tree))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Indicator variable for one leaf.
    pub fn leaf_var(&self, objective: &str, tree: usize, leaf: &LeafId) -> Option<VarId> {
        self.leaves(objective, tree)
            .iter()
            .find(|(id, _)| id == leaf)
            .map(|&(_, var)| var)
    }

    /// Iterates `(tree, leaf, var)` for `objective` in encoding order.
    pub fn iter(&self, objective: &str) -> impl Iterator<Item = (usize, &LeafId, VarId)> + '_ {
        self.trees(objective)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .flat_map(|(tree, leaves)| leaves.iter().map(move |(leaf, var)| (tree, leaf, *var)))
    }

    /// Names of objectives with encoded trees.
    pub fn objectives(&self) -> impl Iterator<Item = &str> {
        self.objectives.iter().map(|(name, _)| name.as_str())
    }

    /// Total number of indicator variables.
    pub fn len(&self) -> usize {
        self.objectives
            .iter()
            .flat_map(|(_, trees)| trees.iter())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
