//! Tree ensembles per objective and the multi-objective surrogate.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use treeopt_core::LeafId;

use crate::error::EnsembleError;
use crate::tree::{Node, Tree};

/// Default gap between the two sides of a numeric split in the encoding.
pub const DEFAULT_SPLIT_EPSILON: f64 = 1e-6;

/// How tree predictions are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Boosting: predictions are summed.
    #[default]
    Sum,
    /// Random forest: predictions are averaged.
    Mean,
}

/// The trees fitted for one objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub objective: String,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Creates a summed ensemble with no base score.
    pub fn new(objective: impl Into<String>, trees: Vec<Tree>) -> Self {
        Self {
            objective: objective.into(),
            aggregation: Aggregation::Sum,
            base_score: 0.0,
            trees,
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_base_score(mut self, base_score: f64) -> Self {
        self.base_score = base_score;
        self
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Weight applied to every leaf value.
    pub fn leaf_scale(&self) -> f64 {
        match self.aggregation {
            Aggregation::Sum => 1.0,
            Aggregation::Mean if self.trees.is_empty() => 0.0,
            Aggregation::Mean => 1.0 / self.trees.len() as f64,
        }
    }

    /// Ensemble prediction for a raw point.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let scale = self.leaf_scale();
        self.base_score + scale * self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }

    /// The leaf every tree routes `x` to, as `(tree_index, leaf_id)`.
    pub fn active_leaves(&self, x: &[f64]) -> Vec<(usize, LeafId)> {
        self.trees
            .iter()
            .enumerate()
            .map(|(t, tree)| (t, tree.leaf_of(x).0))
            .collect()
    }

    /// Validates every tree and the feature indices they reference.
    pub fn validate(&self, num_features: Option<usize>) -> Result<(), EnsembleError> {
        if !self.base_score.is_finite() {
            return Err(EnsembleError::Invalid(format!(
                "objective '{}' has non-finite base score",
                self.objective
            )));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| {
                EnsembleError::Invalid(format!("objective '{}', tree {t}: {e}", self.objective))
            })?;
            if let (Some(n), Some(max)) = (num_features, tree.max_feature()) {
                if max >= n {
                    return Err(EnsembleError::Invalid(format!(
                        "objective '{}', tree {t} splits on feature {max} but there are {n} features",
                        self.objective
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn split_nodes(&self) -> impl Iterator<Item = &Node> {
        self.trees
            .iter()
            .flat_map(|t| t.nodes().iter())
            .filter(|n| !n.is_leaf())
    }
}

/// Tree-ensemble surrogate covering every objective.
///
/// # Example
///
/// ```
/// use treeopt_ensemble::EnsembleModel;
///
/// let yaml = r#"
/// ensembles:
///   - objective: cost
///     trees:
///       - nodes:
///           - { type: split, feature: 0, threshold: 0.5, left: 1, right: 2 }
///           - { type: leaf, value: 1.0 }
///           - { type: leaf, value: 3.0 }
/// "#;
/// let model = EnsembleModel::from_yaml_str(yaml).unwrap();
/// assert_eq!(model.predict("cost", &[0.2]), Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleModel {
    pub ensembles: Vec<TreeEnsemble>,
    #[serde(default = "default_split_epsilon")]
    pub split_epsilon: f64,
}

fn default_split_epsilon() -> f64 {
    DEFAULT_SPLIT_EPSILON
}

impl EnsembleModel {
    /// Creates a surrogate from validated ensembles.
    pub fn new(ensembles: Vec<TreeEnsemble>) -> Result<Self, EnsembleError> {
        let model = Self {
            ensembles,
            split_epsilon: DEFAULT_SPLIT_EPSILON,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn with_split_epsilon(mut self, epsilon: f64) -> Self {
        self.split_epsilon = epsilon;
        self
    }

    /// Loads a surrogate from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, EnsembleError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses a surrogate from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, EnsembleError> {
        let model: Self = serde_yaml::from_str(s)?;
        model.validate()?;
        Ok(model)
    }

    /// Checks the structure of every ensemble.
    pub fn validate(&self) -> Result<(), EnsembleError> {
        if !(self.split_epsilon.is_finite() && self.split_epsilon > 0.0) {
            return Err(EnsembleError::Invalid(format!(
                "split_epsilon must be positive, got {}",
                self.split_epsilon
            )));
        }
        for (i, ensemble) in self.ensembles.iter().enumerate() {
            if self.ensembles[..i]
                .iter()
                .any(|e| e.objective == ensemble.objective)
            {
                return Err(EnsembleError::Invalid(format!(
                    "duplicate ensemble for objective '{}'",
                    ensemble.objective
                )));
            }
            ensemble.validate(None)?;
        }
        Ok(())
    }

    pub fn ensembles(&self) -> &[TreeEnsemble] {
        &self.ensembles
    }

    pub fn ensemble(&self, objective: &str) -> Option<&TreeEnsemble> {
        self.ensembles.iter().find(|e| e.objective == objective)
    }

    /// Prediction of one objective for a raw point.
    pub fn predict(&self, objective: &str, x: &[f64]) -> Option<f64> {
        self.ensemble(objective).map(|e| e.predict(x))
    }
}
