//! One-time loading of the model, scaler and feature-means artifacts.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::ArtifactConfig;
use crate::errors::{EngageError, EngageResult};
use crate::features::{Feature, FeatureMeans};
use crate::model::{ModelArtifact, RegressionModel};
use crate::scaler::StandardScaler;

/// SHA-256 of each artifact file, as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactFingerprints {
    pub model: String,
    pub scaler: String,
    pub feature_means: String,
}

/// The immutable inputs of the prediction service.
pub struct ArtifactSet {
    pub means: FeatureMeans,
    pub scaler: StandardScaler,
    pub model: Box<dyn RegressionModel>,
    pub fingerprints: ArtifactFingerprints,
}

impl std::fmt::Debug for ArtifactSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactSet")
            .field("model", &self.model.name())
            .field("scaler_width", &self.scaler.n_features())
            .field("model_width", &self.model.n_features())
            .field("fingerprints", &self.fingerprints)
            .finish()
    }
}

/// Widths of each artifact compared with the canonical feature count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionReport {
    pub expected: usize,
    pub scaler: usize,
    pub model: usize,
    pub importances: usize,
}

impl DimensionReport {
    pub fn is_consistent(&self) -> bool {
        self.scaler == self.expected
            && self.model == self.expected
            && self.importances == self.expected
    }
}

impl ArtifactSet {
    pub fn new(means: FeatureMeans, scaler: StandardScaler, model: Box<dyn RegressionModel>) -> Self {
        Self {
            means,
            scaler,
            model,
            fingerprints: ArtifactFingerprints::default(),
        }
    }

    pub fn load(config: &ArtifactConfig) -> EngageResult<Self> {
        let (means_json, means_sha) = read_artifact("feature means", &config.feature_means_path)?;
        let (scaler_json, scaler_sha) = read_artifact("scaler", &config.scaler_path)?;
        let (model_json, model_sha) = read_artifact("model", &config.model_path)?;

        let means = FeatureMeans::from_json(&means_json).map_err(|e| with_path(e, &config.feature_means_path))?;
        let scaler = StandardScaler::from_json(&scaler_json).map_err(|e| with_path(e, &config.scaler_path))?;
        let model = ModelArtifact::from_json(&model_json)
            .map_err(|e| with_path(e, &config.model_path))?
            .into_model();

        let set = Self {
            means,
            scaler,
            model,
            fingerprints: ArtifactFingerprints {
                model: model_sha,
                scaler: scaler_sha,
                feature_means: means_sha,
            },
        };

        let dims = set.dimension_report();
        if dims.is_consistent() {
            info!(
                "Loaded {} model, scaler and means for {} features",
                set.model.name(),
                dims.expected
            );
        } else {
            warn!(
                "Artifact widths disagree (expected {}, scaler {}, model {}, importances {}); predictions will fail",
                dims.expected, dims.scaler, dims.model, dims.importances
            );
        }

        Ok(set)
    }

    pub fn dimension_report(&self) -> DimensionReport {
        DimensionReport {
            expected: Feature::COUNT,
            scaler: self.scaler.n_features(),
            model: self.model.n_features(),
            importances: self.model.feature_importances().len(),
        }
    }
}

fn read_artifact(kind: &str, path: &Path) -> EngageResult<(String, String)> {
    let bytes = fs::read(path).map_err(|e| {
        EngageError::config(format!("cannot read {kind} artifact {}: {e}", path.display()))
    })?;
    let fingerprint = format!("{:x}", Sha256::digest(&bytes));
    let text = String::from_utf8(bytes).map_err(|_| {
        EngageError::config(format!("{kind} artifact {} is not UTF-8", path.display()))
    })?;
    Ok((text, fingerprint))
}

fn with_path(err: EngageError, path: &Path) -> EngageError {
    match err {
        EngageError::Config { message } => {
            EngageError::config(format!("{}: {message}", path.display()))
        }
        other => other,
    }
}
