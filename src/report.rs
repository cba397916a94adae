//! Report renderer: turns a prediction into display data.

use serde::Serialize;

use crate::inference::{InferenceError, PipelineError, Stage};
use crate::models::{Disease, DisplayReport, PredictionResult, ReportStyle};

/// Diagnosis wording for a disease and normalised label.
pub fn diagnosis_for(disease: Disease, label: u8) -> &'static str {
    let positive = label == 1;
    match (disease, positive) {
        (Disease::Diabetes, true) => "Diabetes",
        (Disease::Diabetes, false) => "No Diabetes",
        (Disease::Heart, true) => "Heart Disease",
        (Disease::Heart, false) => "Healthy",
        (Disease::Cancer, true) => "Malignant Cancer",
        (Disease::Cancer, false) => "Benign",
    }
}

pub fn render(disease: Disease, result: &PredictionResult) -> DisplayReport {
    let style = if result.is_positive() {
        ReportStyle::Positive
    } else {
        ReportStyle::Negative
    };
    DisplayReport {
        disease,
        diagnosis: diagnosis_for(disease, result.label),
        style,
        probability: result.probability,
        probability_display: format!("{:.2}", result.probability),
        generated_at: chrono::Utc::now(),
    }
}

/// Error state shown instead of a diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub stage: Stage,
    pub code: &'static str,
    pub message: String,
}

impl ErrorReport {
    pub fn from_pipeline(err: &PipelineError) -> Self {
        Self {
            stage: err.stage,
            code: err.source.code(),
            message: user_message(&err.source),
        }
    }
}

/// Patient-facing text. Deployment problems are summarised; the full
/// error (with paths) goes to the log.
fn user_message(err: &InferenceError) -> String {
    match err {
        InferenceError::MissingFeature(name) => format!("Please provide a value for \"{name}\"."),
        InferenceError::InvalidFeature { name, reason } => {
            format!("The value for \"{name}\" is not valid: {reason}.")
        }
        InferenceError::UnknownDisease(key) => format!("\"{key}\" is not a supported report."),
        InferenceError::Inference(detail) => {
            format!("The prediction could not be computed ({detail}).")
        }
        InferenceError::ArtifactNotFound(_)
        | InferenceError::ArtifactCorrupt { .. }
        | InferenceError::ShapeMismatch { .. } => {
            "The prediction model is unavailable. No result was produced.".to_string()
        }
    }
}

/// Either a diagnosis or an explicit error state; never both.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Diagnosis(DisplayReport),
    Error(ErrorReport),
}

impl From<Result<DisplayReport, PipelineError>> for ReportOutcome {
    fn from(result: Result<DisplayReport, PipelineError>) -> Self {
        match result {
            Ok(report) => Self::Diagnosis(report),
            Err(err) => Self::Error(ErrorReport::from_pipeline(&err)),
        }
    }
}
