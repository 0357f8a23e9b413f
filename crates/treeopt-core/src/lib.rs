//! treeopt Core - Core types for tree-ensemble optimization
//!
//! This crate provides the fundamental abstractions for treeopt:
//! - A mixed-integer linear model with feature, leaf and output bookkeeping
//! - Feature and objective definitions
//! - Problem configuration (model skeleton, decoding)

pub mod error;
pub mod feature;
pub mod model;
pub mod problem;

pub use error::TreeOptError;
pub use feature::{Feature, FeatureKind, FeatureValue, Objective};
pub use model::{
    Constraint, FeatureVars, LeafId, LeafIndex, LinearExpr, Model, Sense, VarId, VarKind, Variable,
};
pub use problem::ProblemConfig;
