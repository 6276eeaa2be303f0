//! Canonical feature set and feature-vector completion.
//!
//! The scaler and the model are positional: column `i` of every artifact
//! means `Feature::ALL[i]`. Keeping the order in one enum makes a key mismatch
//! between the means document and the model a load-time error instead of a
//! silently shifted column.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{EngageError, EngageResult};

/// One named numeric input of the regression model, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    MessageCountSum,
    MeetingCountSum,
    ReactionCountSum,
    ScreenShareCountSum,
    FileUploadCountSum,
    ErrorCountSum,
    SessionCount,
    SessionDurationSecMean,
    LatencyMsMean,
}

impl Feature {
    pub const COUNT: usize = 9;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::MessageCountSum,
        Feature::MeetingCountSum,
        Feature::ReactionCountSum,
        Feature::ScreenShareCountSum,
        Feature::FileUploadCountSum,
        Feature::ErrorCountSum,
        Feature::SessionCount,
        Feature::SessionDurationSecMean,
        Feature::LatencyMsMean,
    ];

    /// The four features a caller may supply.
    pub const USER_INPUTS: [Feature; 4] = [
        Feature::MessageCountSum,
        Feature::MeetingCountSum,
        Feature::SessionCount,
        Feature::SessionDurationSecMean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::MessageCountSum => "message_count_sum",
            Feature::MeetingCountSum => "meeting_count_sum",
            Feature::ReactionCountSum => "reaction_count_sum",
            Feature::ScreenShareCountSum => "screen_share_count_sum",
            Feature::FileUploadCountSum => "file_upload_count_sum",
            Feature::ErrorCountSum => "error_count_sum",
            Feature::SessionCount => "session_count",
            Feature::SessionDurationSecMean => "session_duration_sec_mean",
            Feature::LatencyMsMean => "latency_ms_mean",
        }
    }

    /// Position of this feature in every scaler/model column layout.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_user_input(self) -> bool {
        Self::USER_INPUTS.contains(&self)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.name()).collect()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = EngageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| EngageError::validation("feature", format!("unknown feature '{s}'")))
    }
}

/// Fixed-size vector holding one value per `Feature`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; Feature::COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; Feature::COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0[feature.index()] = value;
    }

    /// `(feature, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |f| (*f, self.0[f.index()]))
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &f64 {
        &self.0[feature.index()]
    }
}

impl IndexMut<Feature> for FeatureVector {
    fn index_mut(&mut self, feature: Feature) -> &mut f64 {
        &mut self.0[feature.index()]
    }
}

/// Training-set means used to impute every feature the caller leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMeans(FeatureVector);

impl FeatureMeans {
    pub fn new(values: FeatureVector) -> Self {
        Self(values)
    }

    /// Build from the means document. Every canonical feature must be present
    /// with a finite value; keys the model does not know are skipped.
    pub fn from_map(map: &BTreeMap<String, f64>) -> EngageResult<Self> {
        for key in map.keys() {
            if key.parse::<Feature>().is_err() {
                warn!("Ignoring unknown feature '{key}' in feature means document");
            }
        }

        let mut values = [0.0; Feature::COUNT];
        for feature in Feature::ALL {
            let value = map.get(feature.name()).copied().ok_or_else(|| {
                EngageError::config(format!(
                    "feature means document is missing '{}'",
                    feature.name()
                ))
            })?;
            if !value.is_finite() {
                return Err(EngageError::config(format!(
                    "feature mean for '{}' is not finite",
                    feature.name()
                )));
            }
            values[feature.index()] = value;
        }

        Ok(Self(FeatureVector::new(values)))
    }

    pub fn from_json(json: &str) -> EngageResult<Self> {
        let map: BTreeMap<String, f64> = serde_json::from_str(json)
            .map_err(|e| EngageError::config(format!("invalid feature means document: {e}")))?;
        Self::from_map(&map)
    }

    pub fn vector(&self) -> &FeatureVector {
        &self.0
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0.get(feature)
    }
}

/// The caller-supplied metrics. Any subset may be present; unknown keys in a
/// request body are dropped by serde.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count_sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_count_sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration_sec_mean: Option<f64>,
}

impl UserInput {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::MessageCountSum => self.message_count_sum,
            Feature::MeetingCountSum => self.meeting_count_sum,
            Feature::SessionCount => self.session_count,
            Feature::SessionDurationSecMean => self.session_duration_sec_mean,
            _ => None,
        }
    }

    /// The populated `(feature, value)` pairs.
    pub fn supplied(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::USER_INPUTS
            .iter()
            .filter_map(move |f| self.get(*f).map(|v| (*f, v)))
    }
}

/// Where a completed slot got its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    Input,
    Mean,
}

/// A full feature vector plus the provenance of each slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedFeatures {
    pub vector: FeatureVector,
    pub sources: [FeatureSource; Feature::COUNT],
}

impl CompletedFeatures {
    pub fn source(&self, feature: Feature) -> FeatureSource {
        self.sources[feature.index()]
    }
}

/// Overlay the caller's values on a copy of the means.
pub fn complete(means: &FeatureMeans, input: &UserInput) -> CompletedFeatures {
    let mut vector = *means.vector();
    let mut sources = [FeatureSource::Mean; Feature::COUNT];

    for (feature, value) in input.supplied() {
        vector.set(feature, value);
        sources[feature.index()] = FeatureSource::Input;
    }

    CompletedFeatures { vector, sources }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_indices() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
            assert_eq!(feature.name().parse::<Feature>().unwrap(), *feature);
        }
    }

    #[test]
    fn unknown_feature_name_is_rejected() {
        assert!("crash_rate".parse::<Feature>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&Feature::SessionDurationSecMean).unwrap();
        assert_eq!(json, "\"session_duration_sec_mean\"");
    }

    #[test]
    fn user_input_ignores_unknown_keys() {
        let input: UserInput =
            serde_json::from_str(r#"{"session_count": 4, "latency_ms_mean": 900}"#).unwrap();
        assert_eq!(input.session_count, Some(4.0));
        assert_eq!(input.supplied().count(), 1);
    }
}
