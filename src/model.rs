//! Pre-trained regression models.
//!
//! Training happens elsewhere; this module only evaluates exported
//! parameters. Two artifact kinds are understood: a random forest exported in
//! flat node-array form and a plain linear regression.

use serde::{Deserialize, Serialize};

use crate::errors::{EngageError, EngageResult};
use crate::scaler::check_feature_names;

/// Marks a leaf in the `children_left` / `children_right` arrays.
pub const LEAF: i64 = -1;

/// A regression function over a positional, already-scaled input row.
pub trait RegressionModel: Send + Sync {
    fn name(&self) -> &str;

    fn n_features(&self) -> usize;

    fn predict(&self, x: &[f64]) -> EngageResult<f64>;

    /// Static per-feature weights, same width as the input.
    fn feature_importances(&self) -> &[f64];
}

/// One regression tree stored as parallel arrays indexed by node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    fn node_count(&self) -> usize {
        self.value.len()
    }

    fn validate(&self, n_features: usize, tree: usize) -> EngageResult<()> {
        let n = self.node_count();
        if n == 0 {
            return Err(EngageError::config(format!("tree {tree} has no nodes")));
        }
        if [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(EngageError::config(format!(
                "tree {tree} node arrays have different lengths"
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                if !self.value[node].is_finite() {
                    return Err(EngageError::config(format!(
                        "tree {tree} leaf {node} has a non-finite value"
                    )));
                }
                continue;
            }
            // Children always come after their parent, so every walk terminates.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(EngageError::config(format!(
                        "tree {tree} node {node} has invalid child {child}"
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(EngageError::config(format!(
                    "tree {tree} node {node} splits on feature {feature}, model has {n_features}"
                )));
            }
            if self.threshold[node].is_nan() {
                return Err(EngageError::config(format!(
                    "tree {tree} node {node} has a NaN threshold"
                )));
            }
        }
        Ok(())
    }

    /// Walk from the root; a sample goes left when `x[feature] <= threshold`.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Averaging ensemble of regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRegressor {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
    pub feature_importances: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl ForestRegressor {
    fn validate(&self) -> EngageResult<()> {
        if self.trees.is_empty() {
            return Err(EngageError::config("random forest has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, i)?;
        }
        validate_importances(&self.feature_importances, self.n_features)?;
        if let Some(names) = &self.feature_names {
            check_feature_names("model", names)?;
        }
        Ok(())
    }
}

impl RegressionModel for ForestRegressor {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f64]) -> EngageResult<f64> {
        check_width(x, self.n_features)?;
        let total: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        finite(total / self.trees.len() as f64)
    }

    fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

/// `intercept + Σ coef_i * x_i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(skip)]
    importances: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        let importances = normalized_magnitudes(&coefficients);
        Self {
            intercept,
            coefficients,
            feature_names: None,
            importances,
        }
    }

    fn validate(&mut self) -> EngageResult<()> {
        if self.coefficients.is_empty() {
            return Err(EngageError::config("linear model has no coefficients"));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(EngageError::config("linear model parameters must be finite"));
        }
        if let Some(names) = &self.feature_names {
            check_feature_names("model", names)?;
        }
        self.importances = normalized_magnitudes(&self.coefficients);
        Ok(())
    }
}

impl RegressionModel for LinearRegressor {
    fn name(&self) -> &str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, x: &[f64]) -> EngageResult<f64> {
        check_width(x, self.coefficients.len())?;
        let score = self.intercept
            + x.iter()
                .zip(self.coefficients.iter())
                .map(|(f, w)| f * w)
                .sum::<f64>();
        finite(score)
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

/// Serialized model document, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(ForestRegressor),
    Linear(LinearRegressor),
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> EngageResult<Self> {
        let mut artifact: ModelArtifact = serde_json::from_str(json)
            .map_err(|e| EngageError::config(format!("invalid model artifact: {e}")))?;
        match &mut artifact {
            ModelArtifact::RandomForest(forest) => forest.validate()?,
            ModelArtifact::Linear(linear) => linear.validate()?,
        }
        Ok(artifact)
    }

    pub fn into_model(self) -> Box<dyn RegressionModel> {
        match self {
            ModelArtifact::RandomForest(forest) => Box::new(forest),
            ModelArtifact::Linear(linear) => Box::new(linear),
        }
    }
}

fn check_width(x: &[f64], expected: usize) -> EngageResult<()> {
    if x.len() != expected {
        return Err(EngageError::inference(format!(
            "model expects {expected} features, got {}",
            x.len()
        )));
    }
    Ok(())
}

fn finite(score: f64) -> EngageResult<f64> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(EngageError::inference(format!("model produced non-finite score {score}")))
    }
}

fn validate_importances(importances: &[f64], n_features: usize) -> EngageResult<()> {
    if importances.len() != n_features {
        return Err(EngageError::config(format!(
            "model has {} importances for {n_features} features",
            importances.len()
        )));
    }
    if importances.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(EngageError::config(
            "feature importances must be finite and non-negative",
        ));
    }
    Ok(())
}

fn normalized_magnitudes(coefficients: &[f64]) -> Vec<f64> {
    let total: f64 = coefficients.iter().map(|c| c.abs()).sum();
    if total == 0.0 {
        let n = coefficients.len().max(1) as f64;
        return vec![1.0 / n; coefficients.len()];
    }
    coefficients.iter().map(|c| c.abs() / total).collect()
}
