//! Mixed-integer linear model.
//!
//! A [`Model`] holds variables, linear constraints and a linear objective
//! (always minimized), plus the bookkeeping the optimizer needs to read a
//! solved model back:
//!
//! - the variables backing each feature ([`FeatureVars`]), in feature order
//! - the leaf indicator variables per objective and tree ([`LeafIndex`])
//! - one output variable per objective
//!
//! Solver backends write their assignment into the model with
//! [`Model::set_solution`]; callers read it with [`Model::value`].

mod expr;
mod leaf;


pub use expr::{Constraint, LinearExpr, Sense};
pub use leaf::{LeafId, LeafIndex, TreeLeaves};

use std::fmt;

use crate::error::{Result, TreeOptError};

/// Index of a variable inside its [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    /// Creates a variable id from a raw index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Continuous,
    Integer,
    /// Integer in `[0, 1]`.
    Binary,
}

impl VarKind {
    /// Returns true for integer and binary variables.
    pub fn is_integral(self) -> bool {
        matches!(self, VarKind::Integer | VarKind::Binary)
    }
}

/// A decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    kind: VarKind,
    lb: f64,
    ub: f64,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VarKind {
        self.kind
    }

    /// Lower bound (may be `f64::NEG_INFINITY`).
    pub fn lb(&self) -> f64 {
        self.lb
    }

    /// Upper bound (may be `f64::INFINITY`).
    pub fn ub(&self) -> f64 {
        self.ub
    }
}

/// Variables backing one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureVars {
    /// Real, integer or binary feature.
    Single(VarId),
    /// Categorical feature: one binary indicator per category, in category order.
    OneHot(Vec<VarId>),
}

/// Values written by a solver backend.
#[derive(Debug, Clone, PartialEq)]
struct ModelSolution {
    values: Vec<f64>,
    objective_value: f64,
}

/// A mixed-integer linear model, minimized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    feature_vars: Vec<FeatureVars>,
    outputs: Vec<(String, VarId)>,
    leaf_index: LeafIndex,
    solution: Option<ModelSolution>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its id.
    ///
    /// Binary variables are always bounded to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeOptError::InvalidBounds`] if a bound is NaN or `lb > ub`.
    pub fn add_var(
        &mut self,
        name: impl Into<String>,
        kind: VarKind,
        lb: f64,
        ub: f64,
    ) -> Result<VarId> {
        let name = name.into();
        let (lb, ub) = match kind {
            VarKind::Binary => (0.0, 1.0),
            _ => (lb, ub),
        };
        if lb.is_nan() || ub.is_nan() || lb > ub {
            return Err(TreeOptError::InvalidBounds { name, lb, ub });
        }
        self.solution = None;
        self.variables.push(Variable { name, kind, lb, ub });
        Ok(VarId(self.variables.len() - 1))
    }

    /// Adds a binary variable.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.solution = None;
        self.variables.push(Variable {
            name: name.into(),
            kind: VarKind::Binary,
            lb: 0.0,
            ub: 1.0,
        });
        VarId(self.variables.len() - 1)
    }

    /// Adds an unbounded continuous variable.
    pub fn add_free(&mut self, name: impl Into<String>) -> VarId {
        self.solution = None;
        self.variables.push(Variable {
            name: name.into(),
            kind: VarKind::Continuous,
            lb: f64::NEG_INFINITY,
            ub: f64::INFINITY,
        });
        VarId(self.variables.len() - 1)
    }

    /// Returns a variable by id.
    pub fn var(&self, id: VarId) -> Result<&Variable> {
        self.variables
            .get(id.0)
            .ok_or(TreeOptError::UnknownVariable(id.0))
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// Adds a constraint and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`TreeOptError::UnknownVariable`] if the constraint references
    /// a variable that is not part of this model.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<usize> {
        self.check_expr(constraint.expr())?;
        self.solution = None;
        self.constraints.push(constraint);
        Ok(self.constraints.len() - 1)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Replaces the objective.
    pub fn set_objective(&mut self, objective: LinearExpr) -> Result<()> {
        self.check_expr(&objective)?;
        self.solution = None;
        self.objective = objective;
        Ok(())
    }

    /// Adds `factor · expr` to the objective.
    pub fn add_to_objective(&mut self, expr: &LinearExpr, factor: f64) -> Result<()> {
        self.check_expr(expr)?;
        self.solution = None;
        self.objective.add_scaled(expr, factor);
        Ok(())
    }

    fn check_expr(&self, expr: &LinearExpr) -> Result<()> {
        match expr.max_var() {
            Some(idx) if idx >= self.variables.len() => Err(TreeOptError::UnknownVariable(idx)),
            _ => Ok(()),
        }
    }

    /// Registers the variables of the next feature.
    pub fn push_feature_vars(&mut self, vars: FeatureVars) {
        self.feature_vars.push(vars);
    }

    /// Variables of every feature, in feature order.
    pub fn feature_vars(&self) -> &[FeatureVars] {
        &self.feature_vars
    }

    /// Variables of feature `idx`.
    pub fn feature_var(&self, idx: usize) -> Option<&FeatureVars> {
        self.feature_vars.get(idx)
    }

    /// Registers the output variable of an objective, replacing any earlier one.
    pub fn set_output(&mut self, objective: &str, var: VarId) {
        match self.outputs.iter_mut().find(|(name, _)| name.as_str() == objective) {
            Some(entry) => entry.1 = var,
            None => self.outputs.push((objective.to_string(), var)),
        }
    }

    /// Output variable of an objective.
    pub fn output_var(&self, objective: &str) -> Option<VarId> {
        self.outputs
            .iter()
            .find(|(name, _)| name == objective)
            .map(|&(_, var)| var)
    }

    pub fn outputs(&self) -> &[(String, VarId)] {
        &self.outputs
    }

    pub fn leaf_index(&self) -> &LeafIndex {
        &self.leaf_index
    }

    pub fn leaf_index_mut(&mut self) -> &mut LeafIndex {
        &mut self.leaf_index
    }

    /// Number of trees encoded for `objective`.
    pub fn num_trees(&self, objective: &str) -> usize {
        self.leaf_index.num_trees(objective)
    }

    /// Leaf identifiers of one tree, in encoding order.
    pub fn leaves(&self, objective: &str, tree: usize) -> impl Iterator<Item = &LeafId> {
        self.leaf_index.leaves(objective, tree).iter().map(|(leaf, _)| leaf)
    }

    /// Indicator variable of one leaf.
    pub fn leaf_var(&self, objective: &str, tree: usize, leaf: &LeafId) -> Option<VarId> {
        self.leaf_index.leaf_var(objective, tree, leaf)
    }

    /// Stores a solver assignment.
    ///
    /// # Errors
    ///
    /// Returns [`TreeOptError::ModelMismatch`] if `values` does not have one
    /// entry per variable.
    pub fn set_solution(&mut self, values: Vec<f64>, objective_value: f64) -> Result<()> {
        if values.len() != self.variables.len() {
            return Err(TreeOptError::ModelMismatch(format!(
                "solution has {} values, model has {} variables",
                values.len(),
                self.variables.len()
            )));
        }
        self.solution = Some(ModelSolution {
            values,
            objective_value,
        });
        Ok(())
    }

    /// Drops any stored assignment.
    pub fn clear_solution(&mut self) {
        self.solution = None;
    }

    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    /// Solved value of a variable.
    pub fn value(&self, id: VarId) -> Result<f64> {
        let solution = self.solution.as_ref().ok_or(TreeOptError::Unsolved)?;
        solution
            .values
            .get(id.0)
            .copied()
            .ok_or(TreeOptError::UnknownVariable(id.0))
    }

    /// All solved values, indexed by variable.
    pub fn values(&self) -> Option<&[f64]> {
        self.solution.as_ref().map(|s| s.values.as_slice())
    }

    /// Objective value reported by the solver.
    pub fn objective_value(&self) -> Result<f64> {
        self.solution
            .as_ref()
            .map(|s| s.objective_value)
            .ok_or(TreeOptError::Unsolved)
    }

    /// Evaluates an expression at the stored solution.
    pub fn evaluate(&self, expr: &LinearExpr) -> Result<f64> {
        let values = self.values().ok_or(TreeOptError::Unsolved)?;
        Ok(expr.evaluate(values))
    }
}
