use std::collections::BTreeMap;

use crate::errors::EngageError;
use crate::features::{complete, Feature, FeatureMeans, FeatureSource, FeatureVector, UserInput};
use crate::tests::test_utils::{all_input_subsets, example_input, MEANS};

fn means() -> FeatureMeans {
    FeatureMeans::new(FeatureVector::new(MEANS))
}

#[test]
fn every_subset_yields_a_full_vector_with_means_for_gaps() {
    let means = means();
    for input in all_input_subsets() {
        let completed = complete(&means, &input);
        let values: Vec<(Feature, f64)> = completed.vector.iter().collect();

        assert_eq!(values.len(), Feature::COUNT);
        for (i, (feature, value)) in values.into_iter().enumerate() {
            assert_eq!(feature, Feature::ALL[i]);
            match input.get(feature) {
                Some(supplied) => {
                    assert_eq!(value, supplied);
                    assert_eq!(completed.source(feature), FeatureSource::Input);
                }
                None => {
                    assert_eq!(value, means.get(feature));
                    assert_eq!(completed.source(feature), FeatureSource::Mean);
                }
            }
        }
    }
}

#[test]
fn example_input_overrides_exactly_four_positions() {
    let completed = complete(&means(), &example_input());
    let v = &completed.vector;

    assert_eq!(v[Feature::MessageCountSum], 120.0);
    assert_eq!(v[Feature::MeetingCountSum], 3.0);
    assert_eq!(v[Feature::SessionCount], 5.0);
    assert_eq!(v[Feature::SessionDurationSecMean], 900.0);
    for feature in Feature::ALL.iter().filter(|f| !f.is_user_input()) {
        assert_eq!(v[*feature], MEANS[feature.index()]);
    }
}

#[test]
fn empty_input_is_the_means_vector() {
    let means = means();
    let completed = complete(&means, &UserInput::default());
    assert_eq!(&completed.vector, means.vector());
}

#[test]
fn means_document_missing_a_feature_is_a_configuration_error() {
    let mut map: BTreeMap<String, f64> = Feature::ALL
        .iter()
        .map(|f| (f.name().to_string(), 1.0))
        .collect();
    map.remove("latency_ms_mean");

    let err = FeatureMeans::from_map(&map).unwrap_err();
    assert!(matches!(err, EngageError::Config { .. }));
    assert!(err.to_string().contains("latency_ms_mean"));
}

#[test]
fn means_document_with_extra_keys_still_loads() {
    let mut map: BTreeMap<String, f64> = Feature::ALL
        .iter()
        .map(|f| (f.name().to_string(), f.index() as f64))
        .collect();
    map.insert("crash_sum".to_string(), 99.0);

    let means = FeatureMeans::from_map(&map).unwrap();
    assert_eq!(means.get(Feature::LatencyMsMean), 8.0);
}

#[test]
fn non_numeric_means_document_is_rejected() {
    let err = FeatureMeans::from_json(r#"{"message_count_sum": "lots"}"#).unwrap_err();
    assert!(err.is_fatal());
}
