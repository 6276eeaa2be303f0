//! Local explanation of a single prediction.
//!
//! `contribution = raw feature value * global importance`. This is a rough
//! approximation, not an attribution method: there is no baseline subtraction
//! and no normalization, so large-magnitude features dominate regardless of
//! what the trees actually did with them.

use serde::Serialize;

use crate::errors::{EngageError, EngageResult};
use crate::features::{Feature, FeatureVector};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: Feature,
    pub value: f64,
    pub importance: f64,
    pub contribution: f64,
}

pub fn local_contributions(
    features: &FeatureVector,
    importances: &[f64],
) -> EngageResult<Vec<Contribution>> {
    if importances.len() != Feature::COUNT {
        return Err(EngageError::inference(format!(
            "expected {} importances, got {}",
            Feature::COUNT,
            importances.len()
        )));
    }

    Ok(features
        .iter()
        .zip(importances.iter())
        .map(|((feature, value), importance)| Contribution {
            feature,
            value,
            importance: *importance,
            contribution: value * importance,
        })
        .collect())
}

/// Contributions sorted by absolute size, largest first.
pub fn ranked(contributions: &[Contribution]) -> Vec<Contribution> {
    let mut sorted = contributions.to_vec();
    sorted.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    sorted
}
