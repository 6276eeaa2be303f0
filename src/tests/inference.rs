use crate::artifacts::ArtifactSet;
use crate::config::ArtifactConfig;
use crate::errors::EngageError;
use crate::features::{Feature, FeatureMeans, FeatureVector, UserInput};
use crate::model::LinearRegressor;
use crate::predictor::EngagementPredictor;
use crate::scaler::StandardScaler;
use crate::tests::test_utils::{bundled_predictor, example_input, linear_predictor, MEANS};

#[test]
fn bundled_artifacts_are_consistent() {
    let predictor = bundled_predictor();
    assert!(predictor.dimension_report().is_consistent());
    assert_eq!(predictor.model_name(), "random_forest");
    assert_eq!(predictor.artifacts().fingerprints.model.len(), 64);
}

#[test]
fn example_prediction_is_a_single_finite_score() {
    let predictor = bundled_predictor();
    let result = predictor.predict(&example_input()).unwrap();

    assert!(result.score.is_finite());
    assert_eq!(result.features().as_slice().len(), Feature::COUNT);
    // (32.4 + 29.8 + 35.5) / 3 for the bundled forest
    assert!((result.score - 32.566_666).abs() < 1e-4);
}

#[test]
fn inference_is_bit_identical_across_calls() {
    let predictor = bundled_predictor();
    let completed = predictor.complete(&example_input());

    let first = predictor.infer(&completed.vector).unwrap();
    let second = predictor.infer(&completed.vector).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn linear_score_matches_hand_computation() {
    let predictor = linear_predictor();
    let result = predictor.predict(&UserInput::default()).unwrap();
    let expected = 1.0 + MEANS.iter().sum::<f64>();
    assert!((result.score - expected).abs() < 1e-9);
}

#[test]
fn importance_total_does_not_depend_on_input() {
    let predictor = bundled_predictor();
    let before = predictor.importance_total();
    predictor.predict(&example_input()).unwrap();
    predictor.predict(&UserInput::default()).unwrap();
    assert_eq!(before.to_bits(), predictor.importance_total().to_bits());
    assert!((before - 1.0).abs() < 1e-9);
}

#[test]
fn narrow_scaler_surfaces_an_inference_error() {
    let means = FeatureMeans::new(FeatureVector::new(MEANS));
    let scaler = StandardScaler {
        mean: vec![0.0; Feature::COUNT - 1],
        scale: vec![1.0; Feature::COUNT - 1],
        feature_names: None,
    };
    let model = LinearRegressor::new(0.0, vec![1.0; Feature::COUNT]);
    let predictor = EngagementPredictor::new(ArtifactSet::new(means, scaler, Box::new(model)));

    assert!(!predictor.dimension_report().is_consistent());
    let err = predictor.predict(&example_input()).unwrap_err();
    assert!(matches!(err, EngageError::Inference { .. }));
}

#[test]
fn narrow_model_surfaces_an_inference_error() {
    let means = FeatureMeans::new(FeatureVector::new(MEANS));
    let scaler = StandardScaler {
        mean: vec![0.0; Feature::COUNT],
        scale: vec![1.0; Feature::COUNT],
        feature_names: None,
    };
    let model = LinearRegressor::new(0.0, vec![1.0; 4]);
    let predictor = EngagementPredictor::new(ArtifactSet::new(means, scaler, Box::new(model)));

    assert!(matches!(
        predictor.predict(&example_input()),
        Err(EngageError::Inference { .. })
    ));
    assert!(matches!(predictor.importances(), Err(EngageError::Inference { .. })));
}

#[test]
fn missing_artifact_is_a_configuration_error() {
    let config = ArtifactConfig::in_dir("/nonexistent/engagement/models");
    let err = ArtifactSet::load(&config).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("feature_means.json"));
}
