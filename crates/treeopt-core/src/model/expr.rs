//! Linear expressions and constraints.

use std::fmt;

use super::VarId;

/// A linear expression `Σ coef·var + constant`.
///
/// Terms are kept in insertion order; repeated variables are allowed and
/// summed on evaluation.
///
/// # Example
///
/// ```
/// use treeopt_core::model::{LinearExpr, Model, VarKind};
///
/// let mut model = Model::new();
/// let x = model.add_var("x", VarKind::Continuous, 0.0, 10.0).unwrap();
/// let y = model.add_var("y", VarKind::Continuous, 0.0, 10.0).unwrap();
///
/// let expr = LinearExpr::new().with_term(x, 2.0).with_term(y, -1.0).with_constant(3.0);
/// assert_eq!(expr.evaluate(&[1.0, 4.0]), 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a constant expression.
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Creates `Σ vars` with unit coefficients.
    pub fn sum<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = VarId>,
    {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    /// Adds a term, builder style.
    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Sets the constant, builder style.
    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Adds a term.
    pub fn add_term(&mut self, var: VarId, coef: f64) {
        self.terms.push((var, coef));
    }

    /// Adds to the constant.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Appends every term of `other` scaled by `factor`.
    pub fn add_scaled(&mut self, other: &LinearExpr, factor: f64) {
        self.terms
            .extend(other.terms.iter().map(|&(v, c)| (v, c * factor)));
        self.constant += other.constant * factor;
    }

    /// Returns the terms.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Returns the constant part.
    pub fn constant_value(&self) -> f64 {
        self.constant
    }

    /// Returns true if the expression has neither terms nor a constant.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constant == 0.0
    }

    /// Evaluates the expression against a dense value vector indexed by `VarId`.
    ///
    /// Variables outside `values` contribute zero.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values.get(v.index()).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }

    /// Returns the largest variable index referenced, if any.
    pub(crate) fn max_var(&self) -> Option<usize> {
        self.terms.iter().map(|(v, _)| v.index()).max()
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        LinearExpr::new().with_term(var, 1.0)
    }
}

/// Constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
    /// `expr == rhs`
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
            Sense::Eq => write!(f, "=="),
        }
    }
}

/// A linear constraint `expr (<=|>=|==) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    name: Option<String>,
    expr: LinearExpr,
    sense: Sense,
    rhs: f64,
}

impl Constraint {
    /// Creates a constraint.
    pub fn new(expr: LinearExpr, sense: Sense, rhs: f64) -> Self {
        Self {
            name: None,
            expr,
            sense,
            rhs,
        }
    }

    /// Creates `expr <= rhs`.
    pub fn le(expr: LinearExpr, rhs: f64) -> Self {
        Self::new(expr, Sense::Le, rhs)
    }

    /// Creates `expr >= rhs`.
    pub fn ge(expr: LinearExpr, rhs: f64) -> Self {
        Self::new(expr, Sense::Ge, rhs)
    }

    /// Creates `expr == rhs`.
    pub fn eq(expr: LinearExpr, rhs: f64) -> Self {
        Self::new(expr, Sense::Eq, rhs)
    }

    /// Attaches a name used in log output.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Right-hand side with the expression constant moved across.
    pub fn normalized_rhs(&self) -> f64 {
        self.rhs - self.expr.constant_value()
    }

    /// Returns the amount by which `values` violate this constraint (0 if satisfied).
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
            Sense::Eq => (lhs - self.rhs).abs(),
        }
    }

    /// Checks satisfaction within an absolute tolerance.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        self.violation(values) <= tol
    }
}
