use crate::errors::EngageError;
use crate::features::{Feature, UserInput};
use crate::session_context::{SessionContext, SessionState};
use crate::tests::test_utils::{bundled_predictor, example_input, linear_predictor};

#[test]
fn explanation_and_report_need_a_prediction() {
    let predictor = bundled_predictor();
    let session = SessionContext::new();

    assert!(matches!(
        session.explanation(&predictor),
        Err(EngageError::Precondition { .. })
    ));
    assert!(matches!(session.report(), Err(EngageError::Precondition { .. })));
}

#[test]
fn successful_prediction_makes_explanation_available() {
    let predictor = bundled_predictor();
    let mut session = SessionContext::new();

    let score = session.predict(&predictor, &example_input()).unwrap().score;
    assert_eq!(session.state(), SessionState::PredictionAvailable);

    let contributions = session.explanation(&predictor).unwrap();
    let weights = predictor.importances().unwrap();
    let features = *session.last_prediction().unwrap().features();
    assert_eq!(contributions.len(), Feature::COUNT);
    for (c, w) in contributions.iter().zip(weights.iter()) {
        assert_eq!(c.feature, w.feature);
        assert_eq!(c.contribution, features[c.feature] * w.importance);
    }

    assert!(session.report().unwrap().contains(&format!("{score:.2}")));
}

#[test]
fn failed_prediction_keeps_previous_state() {
    let good = linear_predictor();
    let mut session = SessionContext::new();
    let first = session.predict(&good, &example_input()).unwrap().clone();

    let broken = {
        use crate::artifacts::ArtifactSet;
        use crate::model::LinearRegressor;
        let set = good.artifacts();
        let model = LinearRegressor::new(0.0, vec![1.0; 2]);
        crate::predictor::EngagementPredictor::new(ArtifactSet::new(
            set.means.clone(),
            set.scaler.clone(),
            Box::new(model),
        ))
    };
    assert!(session.predict(&broken, &UserInput::default()).is_err());

    assert_eq!(session.last_prediction().unwrap(), &first);
}

#[test]
fn new_prediction_replaces_the_old_one() {
    let predictor = linear_predictor();
    let mut session = SessionContext::new();
    session.predict(&predictor, &example_input()).unwrap();
    let second = session.predict(&predictor, &UserInput::default()).unwrap().clone();

    assert_eq!(session.last_prediction().unwrap(), &second);
    assert_eq!(
        session.last_prediction().unwrap().features()[Feature::MessageCountSum],
        180.4
    );
}
