//! treeopt Solver - backends for mixed-integer models
//!
//! This crate provides:
//! - The [`SolverBackend`] trait every backend implements
//! - [`SolverRegistry`] for looking backends up by name
//! - [`BranchAndBound`], the built-in deterministic MIP solver

pub mod backend;
pub mod bnb;
pub mod error;
pub mod registry;

pub use backend::{SolveReport, SolveStatus, SolverBackend};
pub use bnb::{BnbSettings, BranchAndBound, BranchingRule, NodeSelection};
pub use error::SolverError;
pub use registry::{BackendFactory, SolverRegistry};

#[cfg(test)]
mod tests;
