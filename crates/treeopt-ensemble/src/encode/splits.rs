//! Binary split variables for numeric thresholds.
//!
//! Every feature used by a numeric split gets one binary variable per unique
//! threshold `t_k` (sorted ascending), with `y_k = 1` meaning `x <= t_k`.
//! The variables are monotone (`y_k <= y_{k+1}`) and linked to the feature
//! variable by big-M rows derived from its bounds:
//!
//! ```text
//! x + (ub - t) y <= ub             y = 1  =>  x <= t
//! x + (t + eps - lb) y >= t + eps  y = 0  =>  x >= t + eps
//! ```

use std::collections::BTreeMap;

use treeopt_core::{Constraint, FeatureVars, LinearExpr, Model, TreeOptError, VarId};

use crate::tree::Node;

#[derive(Debug, Clone)]
struct FeatureSplits {
    thresholds: Vec<(f64, VarId)>,
}

/// Split variables of every numeric feature.
#[derive(Debug, Clone, Default)]
pub(crate) struct SplitVars {
    features: BTreeMap<usize, FeatureSplits>,
}

impl SplitVars {
    /// Creates split variables and linking rows for every numeric split in
    /// `nodes`.
    pub fn build<'a>(
        model: &mut Model,
        nodes: impl Iterator<Item = &'a Node>,
        epsilon: f64,
    ) -> Result<Self, TreeOptError> {
        let mut thresholds: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        for node in nodes {
            if let Node::Split {
                feature, threshold, ..
            } = node
            {
                thresholds.entry(*feature).or_default().push(*threshold);
            }
        }

        let mut features = BTreeMap::new();
        for (feature, mut values) in thresholds {
            values.sort_by(f64::total_cmp);
            values.dedup();

            let x = numeric_var(model, feature)?;
            let var = model.var(x)?;
            let (lb, ub) = (var.lb(), var.ub());
            if !(lb.is_finite() && ub.is_finite()) {
                return Err(TreeOptError::Problem(format!(
                    "feature {feature} ('{}') needs finite bounds to be split on",
                    var.name()
                )));
            }

            let mut splits = Vec::with_capacity(values.len());
            for (k, t) in values.into_iter().enumerate() {
                let y = model.add_binary(format!("y[{feature},{k}]"));
                model.add_constraint(
                    Constraint::le(LinearExpr::from(x).with_term(y, ub - t), ub)
                        .with_name(format!("split_le[{feature},{k}]")),
                )?;
                model.add_constraint(
                    Constraint::ge(
                        LinearExpr::from(x).with_term(y, t + epsilon - lb),
                        t + epsilon,
                    )
                    .with_name(format!("split_gt[{feature},{k}]")),
                )?;
                if let Some(&(_, prev)) = splits.last() {
                    model.add_constraint(
                        Constraint::le(LinearExpr::from(prev).with_term(y, -1.0), 0.0)
                            .with_name(format!("split_order[{feature},{k}]")),
                    )?;
                }
                splits.push((t, y));
            }
            features.insert(feature, FeatureSplits { thresholds: splits });
        }
        Ok(Self { features })
    }

    /// Variable for `x[feature] <= threshold`.
    pub fn var(&self, feature: usize, threshold: f64) -> Option<VarId> {
        let splits = &self.features.get(&feature)?.thresholds;
        splits
            .binary_search_by(|(t, _)| t.total_cmp(&threshold))
            .ok()
            .map(|i| splits[i].1)
    }

    pub fn len(&self) -> usize {
        self.features.values().map(|f| f.thresholds.len()).sum()
    }
}

fn numeric_var(model: &Model, feature: usize) -> Result<VarId, TreeOptError> {
    match model.feature_var(feature) {
        Some(FeatureVars::Single(var)) => Ok(*var),
        Some(FeatureVars::OneHot(_)) => Err(TreeOptError::ModelMismatch(format!(
            "numeric split on categorical feature {feature}"
        ))),
        None => Err(TreeOptError::ModelMismatch(format!(
            "split on feature {feature}, but the model has {} features",
            model.feature_vars().len()
        ))),
    }
}

/// One-hot indicators of the categories in `categories`.
pub(crate) fn category_vars(
    model: &Model,
    feature: usize,
    categories: &[usize],
) -> Result<Vec<VarId>, TreeOptError> {
    let indicators = match model.feature_var(feature) {
        Some(FeatureVars::OneHot(vars)) => vars,
        Some(FeatureVars::Single(_)) => {
            return Err(TreeOptError::ModelMismatch(format!(
                "categorical split on numeric feature {feature}"
            )))
        }
        None => {
            return Err(TreeOptError::ModelMismatch(format!(
                "split on feature {feature}, but the model has {} features",
                model.feature_vars().len()
            )))
        }
    };
    categories
        .iter()
        .map(|&c| {
            indicators.get(c).copied().ok_or_else(|| {
                TreeOptError::ModelMismatch(format!(
                    "feature {feature} has {} categories, split uses category {c}",
                    indicators.len()
                ))
            })
        })
        .collect()
}
