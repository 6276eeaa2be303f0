use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::features::Feature;
use crate::report::{render_report, report_data_url, REPORT_FILENAME, REPORT_TITLE};
use crate::tests::test_utils::{example_input, linear_predictor};

#[test]
fn report_lists_each_feature_once_then_the_score() {
    let predictor = linear_predictor();
    let result = predictor.predict(&example_input()).unwrap();
    let text = render_report(&result);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], REPORT_TITLE);
    assert_eq!(lines[1], "");
    for (i, feature) in Feature::ALL.iter().enumerate() {
        let prefix = format!("{}: ", feature.name());
        assert_eq!(text.matches(&prefix).count(), 1);
        assert!(lines[2 + i].starts_with(&prefix));
    }
    assert_eq!(lines[2 + Feature::COUNT], "");
    assert_eq!(
        lines[3 + Feature::COUNT],
        format!("Predicted Score: {:.2}", result.score)
    );
}

#[test]
fn report_values_use_round_trip_float_form() {
    let predictor = linear_predictor();
    let result = predictor.predict(&example_input()).unwrap();
    let text = render_report(&result);

    assert!(text.contains("message_count_sum: 120.0\n"));
    assert!(text.contains("latency_ms_mean: 120.1\n"));
    assert!(text.ends_with("Predicted Score: 1257.20\n"));
}

#[test]
fn report_is_deterministic() {
    let predictor = linear_predictor();
    let result = predictor.predict(&example_input()).unwrap();
    assert_eq!(render_report(&result), render_report(&result));
}

#[test]
fn data_url_decodes_to_the_report() {
    let predictor = linear_predictor();
    let result = predictor.predict(&example_input()).unwrap();
    let link = report_data_url(&result);

    assert_eq!(link.filename, REPORT_FILENAME);
    let payload = link.href.strip_prefix("data:text/plain;base64,").unwrap();
    let decoded = STANDARD.decode(payload).unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), render_report(&result));
}

#[test]
fn huge_values_use_rust_exponent_form() {
    let predictor = linear_predictor();
    let input = crate::features::UserInput {
        message_count_sum: Some(1e16),
        ..Default::default()
    };
    let result = predictor.predict(&input).unwrap();
    assert!(render_report(&result).contains("message_count_sum: 1e16\n"));
}
