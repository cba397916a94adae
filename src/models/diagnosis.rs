use chrono::{DateTime, Utc};
use serde::Serialize;

use super::enums::{Disease, ReportStyle};

/// Binary outcome of a single prediction.
///
/// `label` is normalised so that 1 always means the disease-present class,
/// whatever integer the artifact uses for it; `raw_class` keeps the value
/// the model actually emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: u8,
    pub probability: f64,
    pub raw_class: i64,
}

impl PredictionResult {
    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// Display payload for a successful report.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayReport {
    pub disease: Disease,
    pub diagnosis: &'static str,
    pub style: ReportStyle,
    pub probability: f64,
    pub probability_display: String,
    pub generated_at: DateTime<Utc>,
}
