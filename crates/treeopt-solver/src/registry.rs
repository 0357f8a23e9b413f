//! Backend lookup by name.

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::backend::SolverBackend;
use crate::bnb::BranchAndBound;
use crate::error::SolverError;

/// Creates a fresh backend instance.
pub type BackendFactory = Arc<dyn Fn() -> Box<dyn SolverBackend> + Send + Sync>;

/// Maps backend names to factories.
///
/// The default registry knows the built-in branch-and-bound backend under
/// `"bnb"` and `"branch_and_bound"`.
///
/// # Example
///
/// ```
/// use treeopt_solver::SolverRegistry;
///
/// let registry = SolverRegistry::default();
/// assert!(registry.contains("bnb"));
/// assert!(registry.create("cplex").is_err());
/// ```
#[derive(Clone)]
pub struct SolverRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl SolverRegistry {
    /// Creates a registry with no backends.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registers a backend factory, replacing any factory with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn SolverBackend> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Registers a backend factory, builder style.
    pub fn with_backend<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn SolverBackend> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Creates a fresh backend.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::UnknownBackend`] if `name` is not registered.
    pub fn create(&self, name: &str) -> Result<Box<dyn SolverBackend>, SolverError> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(SolverError::UnknownBackend {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            }),
        }
    }
}

impl Default for SolverRegistry {
    fn default() -> Self {
        Self::empty()
            .with_backend("bnb", || Box::new(BranchAndBound::new()))
            .with_backend("branch_and_bound", || Box::new(BranchAndBound::new()))
    }
}

impl Debug for SolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverRegistry")
            .field("backends", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
