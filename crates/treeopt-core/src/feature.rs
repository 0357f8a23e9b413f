//! Feature and objective definitions.

use std::fmt;

/// Domain of a feature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum FeatureKind {
    /// Continuous value in `[lb, ub]`.
    Real { lb: f64, ub: f64 },
    /// Integer value in `[lb, ub]`.
    Integer { lb: i64, ub: i64 },
    /// 0 or 1.
    Binary,
    /// One of an ordered list of categories, one-hot encoded in the model.
    Categorical { categories: Vec<String> },
}

/// A named input dimension of the optimization problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    name: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    kind: FeatureKind,
}

impl Feature {
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FeatureKind {
        &self.kind
    }

    /// Returns true for categorical features.
    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FeatureKind::Categorical { .. })
    }

    /// Categories of a categorical feature, empty otherwise.
    pub fn categories(&self) -> &[String] {
        match &self.kind {
            FeatureKind::Categorical { categories } => categories,
            _ => &[],
        }
    }

    /// Bounds of the model variable backing a non-categorical feature.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self.kind {
            FeatureKind::Real { lb, ub } => Some((lb, ub)),
            FeatureKind::Integer { lb, ub } => Some((lb as f64, ub as f64)),
            FeatureKind::Binary => Some((0.0, 1.0)),
            FeatureKind::Categorical { .. } => None,
        }
    }
}

/// A decoded feature value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Real(f64),
    Integer(i64),
    Category(String),
}

impl FeatureValue {
    /// Numeric view of a real or integer value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Real(v) => Some(*v),
            FeatureValue::Integer(v) => Some(*v as f64),
            FeatureValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Real(v) => write!(f, "{v}"),
            FeatureValue::Integer(v) => write!(f, "{v}"),
            FeatureValue::Category(c) => write!(f, "{c}"),
        }
    }
}

/// A named optimization target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    name: String,
}

impl Objective {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
