//! The contract between a trained surrogate and the optimizer.

use treeopt_core::{LeafId, Model, TreeOptError};

use crate::encode::encode_ensembles;
use crate::ensemble::{EnsembleModel, TreeEnsemble, DEFAULT_SPLIT_EPSILON};

/// A trained tree surrogate that can embed itself into a model.
///
/// After [`add_to_model`](Self::add_to_model) the model carries, per
/// objective, an output variable and one indicator per tree leaf registered
/// in its leaf index. The structural queries read that index back.
pub trait TreeModel {
    /// Appends variables and constraints describing the surrogate.
    fn add_to_model(&self, model: &mut Model) -> Result<(), TreeOptError>;

    /// Number of trees encoded for `objective` in `model`.
    fn num_trees(&self, model: &Model, objective: &str) -> usize {
        model.num_trees(objective)
    }

    /// Leaves of one encoded tree, in encoding order.
    fn leaves(&self, model: &Model, objective: &str, tree: usize) -> Vec<LeafId> {
        model.leaves(objective, tree).cloned().collect()
    }
}

impl TreeModel for EnsembleModel {
    fn add_to_model(&self, model: &mut Model) -> Result<(), TreeOptError> {
        encode_ensembles(model, &self.ensembles, self.split_epsilon)
    }
}

impl TreeModel for TreeEnsemble {
    fn add_to_model(&self, model: &mut Model) -> Result<(), TreeOptError> {
        encode_ensembles(model, std::slice::from_ref(self), DEFAULT_SPLIT_EPSILON)
    }
}

impl<T: TreeModel + ?Sized> TreeModel for &T {
    fn add_to_model(&self, model: &mut Model) -> Result<(), TreeOptError> {
        (**self).add_to_model(model)
    }

    fn num_trees(&self, model: &Model, objective: &str) -> usize {
        (**self).num_trees(model, objective)
    }

    fn leaves(&self, model: &Model, objective: &str, tree: usize) -> Vec<LeafId> {
        (**self).leaves(model, objective, tree)
    }
}
