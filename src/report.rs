//! Plain-text prediction report.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::fmt::Write;

use crate::predictor::PredictionResult;

pub const REPORT_TITLE: &str = "Engagement Prediction Report";
pub const REPORT_FILENAME: &str = "report.txt";

/// One `name: value` line per feature in canonical order, then the score
/// with two decimals. Values use the shortest round-trip form (`120.0`).
pub fn render_report(result: &PredictionResult) -> String {
    let mut out = String::new();
    out.push_str(REPORT_TITLE);
    out.push_str("\n\n");
    for (feature, value) in result.features().iter() {
        // writing into a String cannot fail
        let _ = writeln!(out, "{}: {:?}", feature.name(), value);
    }
    let _ = writeln!(out, "\nPredicted Score: {:.2}", result.score);
    out
}

pub fn report_bytes(result: &PredictionResult) -> Vec<u8> {
    render_report(result).into_bytes()
}

/// A downloadable link carrying the report inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLink {
    pub filename: String,
    pub href: String,
}

pub fn report_data_url(result: &PredictionResult) -> ReportLink {
    let encoded = STANDARD.encode(report_bytes(result));
    ReportLink {
        filename: REPORT_FILENAME.to_string(),
        href: format!("data:text/plain;base64,{encoded}"),
    }
}
