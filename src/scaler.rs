//! Pre-fitted standardization applied before inference.

use serde::{Deserialize, Serialize};

use crate::errors::{EngageError, EngageResult};
use crate::features::Feature;

/// Parameters of a fitted standard scaler: `(x - mean) / scale` per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    /// Column names recorded at fit time, when the exporter kept them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn from_json(json: &str) -> EngageResult<Self> {
        let scaler: StandardScaler = serde_json::from_str(json)
            .map_err(|e| EngageError::config(format!("invalid scaler artifact: {e}")))?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Structural checks that do not depend on the request.
    pub fn validate(&self) -> EngageResult<()> {
        if self.mean.len() != self.scale.len() {
            return Err(EngageError::config(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(self.scale.iter()).any(|v| !v.is_finite()) {
            return Err(EngageError::config("scaler parameters must be finite"));
        }
        if let Some(names) = &self.feature_names {
            check_feature_names("scaler", names)?;
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &[f64]) -> EngageResult<Vec<f64>> {
        if x.len() != self.n_features() {
            return Err(EngageError::inference(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                x.len()
            )));
        }

        Ok(x.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(v, (m, s))| {
                // sklearn stores 1.0 for constant columns; treat a raw zero the same way
                let s = if *s == 0.0 { 1.0 } else { *s };
                (v - m) / s
            })
            .collect())
    }
}

/// Names recorded in an artifact must match the canonical order exactly.
pub(crate) fn check_feature_names(artifact: &str, names: &[String]) -> EngageResult<()> {
    let expected = Feature::names();
    if names.len() != expected.len() || names.iter().zip(expected.iter()).any(|(a, b)| a != b) {
        return Err(EngageError::config(format!(
            "{artifact} feature order {names:?} does not match expected {expected:?}"
        )));
    }
    Ok(())
}
