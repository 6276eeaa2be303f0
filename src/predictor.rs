//! Engagement prediction: completion, scaling, inference.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::artifacts::{ArtifactSet, DimensionReport};
use crate::errors::{EngageError, EngageResult};
use crate::explainer::{local_contributions, Contribution};
use crate::features::{complete, CompletedFeatures, Feature, FeatureSource, FeatureVector, UserInput};

/// A score together with the exact vector that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub score: f64,
    pub completed: CompletedFeatures,
}

impl PredictionResult {
    pub fn features(&self) -> &FeatureVector {
        &self.completed.vector
    }
}

/// Flattened row used by the HTTP and CLI surfaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub feature: Feature,
    pub value: f64,
    pub source: FeatureSource,
}

pub fn feature_rows(completed: &CompletedFeatures) -> Vec<FeatureRow> {
    completed
        .vector
        .iter()
        .map(|(feature, value)| FeatureRow {
            feature,
            value,
            source: completed.source(feature),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Importance {
    pub feature: Feature,
    pub importance: f64,
}

/// Holds the read-only artifacts; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EngagementPredictor {
    artifacts: Arc<ArtifactSet>,
}

impl EngagementPredictor {
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
        }
    }

    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    pub fn model_name(&self) -> &str {
        self.artifacts.model.name()
    }

    pub fn dimension_report(&self) -> DimensionReport {
        self.artifacts.dimension_report()
    }

    pub fn complete(&self, input: &UserInput) -> CompletedFeatures {
        complete(&self.artifacts.means, input)
    }

    /// Scale then evaluate the model. Deterministic for a given vector.
    pub fn infer(&self, features: &FeatureVector) -> EngageResult<f64> {
        let scaled = self.artifacts.scaler.transform(features.as_slice())?;
        self.artifacts.model.predict(&scaled)
    }

    pub fn predict(&self, input: &UserInput) -> EngageResult<PredictionResult> {
        let completed = self.complete(input);
        let score = self.infer(&completed.vector)?;
        debug!(
            score,
            supplied = input.supplied().count(),
            "engagement prediction"
        );
        Ok(PredictionResult { score, completed })
    }

    fn checked_importances(&self) -> EngageResult<&[f64]> {
        let weights = self.artifacts.model.feature_importances();
        if weights.len() != Feature::COUNT {
            return Err(EngageError::inference(format!(
                "model has {} importances, expected {}",
                weights.len(),
                Feature::COUNT
            )));
        }
        Ok(weights)
    }

    /// Global importance chart data, canonical order.
    pub fn importances(&self) -> EngageResult<Vec<Importance>> {
        let weights = self.checked_importances()?;
        Ok(Feature::ALL
            .iter()
            .zip(weights.iter())
            .map(|(feature, importance)| Importance {
                feature: *feature,
                importance: *importance,
            })
            .collect())
    }

    /// Sum of the importance weights; fixed by the model artifact.
    pub fn importance_total(&self) -> f64 {
        self.artifacts.model.feature_importances().iter().sum()
    }

    pub fn explain(&self, result: &PredictionResult) -> EngageResult<Vec<Contribution>> {
        local_contributions(result.features(), self.checked_importances()?)
    }
}
