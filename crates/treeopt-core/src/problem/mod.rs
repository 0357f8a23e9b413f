//! Problem configuration: features, objectives and the model skeleton.
//!
//! [`ProblemConfig`] owns the feature and objective lists and knows how to
//! build the base model (one variable per continuous feature, one binary
//! indicator per category of a categorical feature) and how to map raw
//! per-feature values back to domain values.
//!
//! # Example
//!
//! ```
//! use treeopt_core::problem::ProblemConfig;
//! use treeopt_core::feature::FeatureValue;
//!
//! let mut problem = ProblemConfig::new();
//! problem.add_real("temperature", 20.0, 80.0).unwrap();
//! problem.add_categorical("catalyst", ["a", "b", "c"]).unwrap();
//! problem.add_objective("yield").unwrap();
//!
//! let model = problem.model_core().unwrap();
//! assert_eq!(model.num_vars(), 4);
//!
//! let decoded = problem.decode(&[42.5, 2.0]).unwrap();
//! assert_eq!(decoded[1], FeatureValue::Category("c".to_string()));
//! ```


use crate::error::{Result, TreeOptError};
use crate::feature::{Feature, FeatureKind, FeatureValue, Objective};
use crate::model::{Constraint, FeatureVars, LinearExpr, Model, VarKind};

/// Feature and objective definitions of an optimization problem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemConfig {
    features: Vec<Feature>,
    objectives: Vec<Objective>,
}

impl ProblemConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from existing definitions, validating each one.
    pub fn from_parts(features: Vec<Feature>, objectives: Vec<Objective>) -> Result<Self> {
        let mut problem = Self::new();
        for feature in features {
            problem.add_feature(feature)?;
        }
        for objective in objectives {
            problem.add_objective(objective.name())?;
        }
        Ok(problem)
    }

    /// Adds a feature and returns its index.
    ///
    /// # Errors
    ///
    /// Fails on duplicate names, inverted or non-finite bounds, and
    /// categorical features without categories or with repeated categories.
    pub fn add_feature(&mut self, feature: Feature) -> Result<usize> {
        if self.feature_index(feature.name()).is_some() {
            return Err(TreeOptError::Problem(format!(
                "duplicate feature name '{}'",
                feature.name()
            )));
        }
        match feature.kind() {
            FeatureKind::Real { lb, ub } => {
                if !lb.is_finite() || !ub.is_finite() || lb > ub {
                    return Err(TreeOptError::InvalidBounds {
                        name: feature.name().to_string(),
                        lb: *lb,
                        ub: *ub,
                    });
                }
            }
            FeatureKind::Integer { lb, ub } => {
                if lb > ub {
                    return Err(TreeOptError::InvalidBounds {
                        name: feature.name().to_string(),
                        lb: *lb as f64,
                        ub: *ub as f64,
                    });
                }
            }
            FeatureKind::Binary => {}
            FeatureKind::Categorical { categories } => {
                if categories.is_empty() {
                    return Err(TreeOptError::Problem(format!(
                        "categorical feature '{}' has no categories",
                        feature.name()
                    )));
                }
                for (i, cat) in categories.iter().enumerate() {
                    if categories[..i].contains(cat) {
                        return Err(TreeOptError::Problem(format!(
                            "categorical feature '{}' repeats category '{}'",
                            feature.name(),
                            cat
                        )));
                    }
                }
            }
        }
        self.features.push(feature);
        Ok(self.features.len() - 1)
    }

    /// Adds a continuous feature.
    pub fn add_real(&mut self, name: impl Into<String>, lb: f64, ub: f64) -> Result<usize> {
        self.add_feature(Feature::new(name, FeatureKind::Real { lb, ub }))
    }

    /// Adds an integer feature.
    pub fn add_integer(&mut self, name: impl Into<String>, lb: i64, ub: i64) -> Result<usize> {
        self.add_feature(Feature::new(name, FeatureKind::Integer { lb, ub }))
    }

    /// Adds a binary feature.
    pub fn add_binary(&mut self, name: impl Into<String>) -> Result<usize> {
        self.add_feature(Feature::new(name, FeatureKind::Binary))
    }

    /// Adds a categorical feature.
    pub fn add_categorical<I, S>(&mut self, name: impl Into<String>, categories: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories = categories.into_iter().map(Into::into).collect();
        self.add_feature(Feature::new(name, FeatureKind::Categorical { categories }))
    }

    /// Adds an objective and returns its index.
    pub fn add_objective(&mut self, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        if self.objectives.iter().any(|o| o.name() == name) {
            return Err(TreeOptError::Problem(format!(
                "duplicate objective name '{name}'"
            )));
        }
        self.objectives.push(Objective::new(name));
        Ok(self.objectives.len() - 1)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Index of the feature called `name`.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name() == name)
    }

    /// Index of the objective called `name`.
    pub fn objective_index(&self, name: &str) -> Option<usize> {
        self.objectives.iter().position(|o| o.name() == name)
    }

    /// Builds a fresh model skeleton.
    ///
    /// Every call returns a new, independent model: one variable per
    /// non-categorical feature and one binary indicator per category, with
    /// a `Σ indicators = 1` constraint per categorical feature.
    pub fn model_core(&self) -> Result<Model> {
        let mut model = Model::new();
        for feature in &self.features {
            let vars = match feature.kind() {
                FeatureKind::Real { lb, ub } => FeatureVars::Single(model.add_var(
                    format!("x[{}]", feature.name()),
                    VarKind::Continuous,
                    *lb,
                    *ub,
                )?),
                FeatureKind::Integer { lb, ub } => FeatureVars::Single(model.add_var(
                    format!("x[{}]", feature.name()),
                    VarKind::Integer,
                    *lb as f64,
                    *ub as f64,
                )?),
                FeatureKind::Binary => {
                    FeatureVars::Single(model.add_binary(format!("x[{}]", feature.name())))
                }
                FeatureKind::Categorical { categories } => {
                    let indicators: Vec<_> = categories
                        .iter()
                        .map(|cat| model.add_binary(format!("x[{}={}]", feature.name(), cat)))
                        .collect();
                    model.add_constraint(
                        Constraint::eq(LinearExpr::sum(indicators.iter().copied()), 1.0)
                            .with_name(format!("one_hot[{}]", feature.name())),
                    )?;
                    FeatureVars::OneHot(indicators)
                }
            };
            model.push_feature_vars(vars);
        }
        Ok(model)
    }

    /// Copies a caller-supplied model after checking that it was built from
    /// this configuration.
    pub fn copy_model_core(&self, model: &Model) -> Result<Model> {
        let vars = model.feature_vars();
        if vars.len() != self.features.len() {
            return Err(TreeOptError::ModelMismatch(format!(
                "model has {} feature slots, problem has {} features",
                vars.len(),
                self.features.len()
            )));
        }
        for (feature, vars) in self.features.iter().zip(vars) {
            let matches = match (feature.kind(), vars) {
                (FeatureKind::Categorical { categories }, FeatureVars::OneHot(ind)) => {
                    categories.len() == ind.len()
                }
                (FeatureKind::Categorical { .. }, FeatureVars::Single(_)) => false,
                (_, FeatureVars::Single(_)) => true,
                (_, FeatureVars::OneHot(_)) => false,
            };
            if !matches {
                return Err(TreeOptError::ModelMismatch(format!(
                    "variables of feature '{}' do not match its kind",
                    feature.name()
                )));
            }
        }
        let mut copy = model.clone();
        copy.clear_solution();
        Ok(copy)
    }

    /// Maps a raw per-feature vector to domain values.
    ///
    /// Continuous entries are passed through, integer and binary entries are
    /// rounded, categorical entries are category indices.
    pub fn decode(&self, raw: &[f64]) -> Result<Vec<FeatureValue>> {
        if raw.len() != self.features.len() {
            return Err(TreeOptError::Decode(format!(
                "expected {} values, got {}",
                self.features.len(),
                raw.len()
            )));
        }
        self.features
            .iter()
            .zip(raw)
            .map(|(feature, &value)| {
                if !value.is_finite() {
                    return Err(TreeOptError::Decode(format!(
                        "non-finite value {value} for feature '{}'",
                        feature.name()
                    )));
                }
                match feature.kind() {
                    FeatureKind::Real { .. } => Ok(FeatureValue::Real(value)),
                    FeatureKind::Integer { .. } | FeatureKind::Binary => {
                        Ok(FeatureValue::Integer(value.round() as i64))
                    }
                    FeatureKind::Categorical { categories } => {
                        let idx = value.round();
                        if idx < 0.0 || idx as usize >= categories.len() {
                            return Err(TreeOptError::Decode(format!(
                                "category index {value} out of range for feature '{}'",
                                feature.name()
                            )));
                        }
                        Ok(FeatureValue::Category(categories[idx as usize].clone()))
                    }
                }
            })
            .collect()
    }

    /// Maps domain values back to a raw per-feature vector.
    pub fn encode(&self, values: &[FeatureValue]) -> Result<Vec<f64>> {
        if values.len() != self.features.len() {
            return Err(TreeOptError::Decode(format!(
                "expected {} values, got {}",
                self.features.len(),
                values.len()
            )));
        }
        self.features
            .iter()
            .zip(values)
            .map(|(feature, value)| match (feature.kind(), value) {
                (FeatureKind::Categorical { categories }, FeatureValue::Category(cat)) => categories
                    .iter()
                    .position(|c| c == cat)
                    .map(|idx| idx as f64)
                    .ok_or_else(|| {
                        TreeOptError::Decode(format!(
                            "unknown category '{cat}' for feature '{}'",
                            feature.name()
                        ))
                    }),
                (FeatureKind::Categorical { .. }, _) | (_, FeatureValue::Category(_)) => {
                    Err(TreeOptError::Decode(format!(
                        "value {value} does not fit feature '{}'",
                        feature.name()
                    )))
                }
                (_, value) => value.as_f64().ok_or_else(|| {
                    TreeOptError::Decode(format!("non-numeric value for '{}'", feature.name()))
                }),
            })
            .collect()
    }
}
