//! Shared test fixtures for treeopt crates.
//!
//! This crate provides problems, surrogates and backends for testing.
//! It does NOT depend on `treeopt` to avoid circular dependencies.
//!
//! - [`problems`] - problem configurations with mixed feature kinds
//! - [`ensembles`] - small hand-written tree surrogates
//! - [`backend`] - a backend that writes a scripted assignment
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! treeopt-test = { workspace = true }
//! ```

pub mod backend;
pub mod ensembles;
pub mod problems;

pub use backend::{Assignment, FailingBackend, ScriptedBackend};
pub use ensembles::{cost_surrogate, two_objective_surrogate};
pub use problems::{mixed_problem, two_objective_problem};
