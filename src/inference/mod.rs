//! Single-record inference: vectorize patient inputs, load the fitted
//! scaler/classifier pair for a disease, and score the vector.
//!
//! Flow: `PatientInputs` → `vectorizer::to_vector` → `predictor::predict`
//! (via `ModelRepository`) → `PredictionResult`.

pub mod artifacts;
pub mod pipeline;
pub mod predictor;
pub mod repository;
pub mod vectorizer;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use thiserror::Error;

pub use pipeline::{generate_report, PipelineError, ReportRequest, Stage};
pub use predictor::predict;
pub use repository::{ArtifactFormat, ArtifactPair, CachePolicy, ModelRepository, RepositoryConfig};
pub use vectorizer::{to_vector, FeatureVector, PatientInputs};

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Unknown disease: {0}")]
    UnknownDisease(String),

    #[error("Missing feature: {0}")]
    MissingFeature(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidFeature { name: String, reason: String },

    #[error("Model artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    #[error("Model artifact corrupt: {path}: {reason}")]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl InferenceError {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownDisease(_) => "UNKNOWN_DISEASE",
            Self::MissingFeature(_) => "MISSING_FEATURE",
            Self::InvalidFeature { .. } => "INVALID_FEATURE",
            Self::ArtifactNotFound(_) => "ARTIFACT_NOT_FOUND",
            Self::ArtifactCorrupt { .. } => "ARTIFACT_CORRUPT",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::Inference(_) => "INFERENCE_FAILED",
        }
    }

    pub(crate) fn length_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            expected: format!("{expected} {what}"),
            actual: format!("{actual} {what}"),
        }
    }
}
