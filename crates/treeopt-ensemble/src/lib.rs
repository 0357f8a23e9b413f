//! treeopt Ensemble - tree-ensemble surrogates
//!
//! This crate provides:
//! - Decision trees stored as node arenas, with numeric and categorical splits
//! - Per-objective ensembles (boosted sums or forest means), loadable from YAML
//! - The [`TreeModel`] trait and a mixed-integer encoding of ensembles

pub mod encode;
pub mod ensemble;
pub mod error;
pub mod surrogate;
pub mod tree;

pub use encode::encode_ensembles;
pub use ensemble::{Aggregation, EnsembleModel, TreeEnsemble, DEFAULT_SPLIT_EPSILON};
pub use error::EnsembleError;
pub use surrogate::TreeModel;
pub use tree::{Node, Tree};
