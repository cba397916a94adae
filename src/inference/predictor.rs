//! Scale a feature vector and score it with the disease's classifier.

use crate::inference::repository::{ArtifactPair, ModelRepository};
use crate::inference::{FeatureVector, InferenceError};
use crate::models::{Disease, PredictionResult};

/// Load the pair for `disease` and score `vector` with it.
pub fn predict(
    repo: &ModelRepository,
    disease: Disease,
    vector: &FeatureVector,
) -> Result<PredictionResult, InferenceError> {
    let pair = repo.load(disease)?;
    score(&pair, vector)
}

/// Score one row against an already-loaded pair.
///
/// The positive-class probability is read from the column whose class
/// label equals the artifact's `positive_class`, not from a fixed index.
pub fn score(pair: &ArtifactPair, vector: &FeatureVector) -> Result<PredictionResult, InferenceError> {
    let expected = pair.scaler.n_features();
    if vector.len() != expected {
        return Err(InferenceError::length_mismatch("features", expected, vector.len()));
    }
    if let Some(pos) = vector.values().iter().position(|v| !v.is_finite()) {
        return Err(InferenceError::Inference(format!(
            "input at column {pos} is not a finite number"
        )));
    }

    let scaled = pair.scaler.transform(vector.values())?;
    if scaled.len() != vector.len() {
        return Err(InferenceError::length_mismatch(
            "scaled features",
            vector.len(),
            scaled.len(),
        ));
    }

    let raw_class = pair.model.predict(&scaled)?;
    let proba = pair.model.predict_proba(&scaled)?;

    let classes = pair.model.classes();
    if proba.len() != classes.len() {
        return Err(InferenceError::length_mismatch(
            "class probabilities",
            classes.len(),
            proba.len(),
        ));
    }
    if !classes.contains(&raw_class) {
        return Err(InferenceError::Inference(format!(
            "model predicted unknown class {raw_class}"
        )));
    }

    let positive = pair.model.positive_class();
    let positive_idx = classes.iter().position(|&c| c == positive).ok_or_else(|| {
        InferenceError::Inference(format!("positive class {positive} missing from {classes:?}"))
    })?;
    let probability = proba[positive_idx];
    if !(0.0..=1.0).contains(&probability) {
        return Err(InferenceError::Inference(format!(
            "probability {probability} outside [0, 1]"
        )));
    }

    let result = PredictionResult {
        label: u8::from(raw_class == positive),
        probability,
        raw_class,
    };
    tracing::debug!(
        disease = %pair.info.disease,
        label = result.label,
        probability = result.probability,
        "Prediction complete"
    );
    Ok(result)
}
