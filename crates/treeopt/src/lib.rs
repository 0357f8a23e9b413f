//! treeopt - optimization over tree-ensemble surrogates
//!
//! Describe a mixed real/integer/categorical search space with
//! [`ProblemConfig`], fit a tree ensemble per objective, and let the
//! [`Optimizer`] find the point that minimizes the weighted surrogate.
//!
//! # Example
//!
//! ```
//! use treeopt::prelude::*;
//!
//! let mut problem = ProblemConfig::new();
//! problem.add_real("temperature", 20.0, 80.0).unwrap();
//! problem.add_categorical("catalyst", ["A", "B"]).unwrap();
//! problem.add_objective("cost").unwrap();
//!
//! let tree = Tree::new(vec![
//!     Node::CategorySplit { feature: 1, categories: vec![0], left: 1, right: 2 },
//!     Node::Leaf { value: 3.0 },
//!     Node::Split { feature: 0, threshold: 50.0, left: 3, right: 4 },
//!     Node::Leaf { value: 1.0 },
//!     Node::Leaf { value: 2.0 },
//! ])
//! .unwrap();
//! let surrogate = EnsembleModel::new(vec![TreeEnsemble::new("cost", vec![tree])]).unwrap();
//!
//! let mut optimizer = Optimizer::new(problem, OptimizerConfig::default());
//! let result = optimizer.solve(&surrogate, None, None).unwrap();
//!
//! assert_eq!(result.solution[1], FeatureValue::Category("B".to_string()));
//! assert!(result.solution[0].as_f64().unwrap() <= 50.0 + 1e-6);
//! ```
//!
//! # Crates
//!
//! - `treeopt-core`: problem description and the solver-neutral MIP model
//! - `treeopt-config`: solver selection and options, from TOML or YAML
//! - `treeopt-solver`: backend trait, registry and the branch-and-bound backend
//! - `treeopt-ensemble`: tree ensembles and their MIP encoding

pub mod error;
pub mod extract;
pub mod optimizer;

#[cfg(feature = "console")]
pub mod console;

pub use error::OptimizerError;
pub use extract::{active_leaves, extract_solution, output_values, ActiveLeaves};
pub use optimizer::{OptResult, Optimizer};

pub use treeopt_config::{ConfigError, OptionValue, OptimizerConfig, SolverOptions};
pub use treeopt_core::{
    Feature, FeatureKind, FeatureValue, LeafId, Model, Objective, ProblemConfig, TreeOptError,
};
pub use treeopt_ensemble::{
    Aggregation, EnsembleError, EnsembleModel, Node, Tree, TreeEnsemble, TreeModel,
};
pub use treeopt_solver::{
    BranchAndBound, SolveReport, SolveStatus, SolverBackend, SolverError, SolverRegistry,
};

pub mod prelude {
    pub use super::{
        EnsembleModel, FeatureValue, Node, OptResult, Optimizer, OptimizerConfig,
        OptimizerError, ProblemConfig, Tree, TreeEnsemble, TreeModel,
    };
    pub use super::{SolverBackend, SolverRegistry};
}
