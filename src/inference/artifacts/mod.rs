//! Fitted scaler and classifier artifacts.
//!
//! Two on-disk formats share the `Scaler`/`Classifier` traits:
//! - JSON exports of fitted parameters (default, pure Rust)
//! - ONNX graphs run through ONNX Runtime (`onnx-models` feature)
//!
//! Every artifact carries the schema version tag it was fitted against;
//! `check_schema` refuses pairs whose tag or column list drifted from
//! `crate::schema`.

pub mod classifier;
pub mod scaler;

#[cfg(feature = "onnx-models")]
pub mod onnx;

use std::path::Path;

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::inference::InferenceError;
use crate::models::Disease;
use crate::schema;

pub use classifier::{JsonClassifier, ModelArtifact};
pub use scaler::{JsonScaler, ScalerArtifact};

/// Fitted feature transform (StandardScaler and friends).
pub trait Scaler: Send + Sync {
    /// Number of columns the transform was fitted on.
    fn n_features(&self) -> usize;

    /// Transform a single row. Output has the same length as the input.
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Fitted binary classifier.
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    /// Class labels in the order `predict_proba` reports them.
    fn classes(&self) -> &[i64];

    /// Label of the disease-present class.
    fn positive_class(&self) -> i64;

    /// Per-class probabilities for a single scaled row, aligned to `classes()`.
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Predicted label for a single scaled row.
    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError> {
        let proba = self.predict_proba(row)?;
        let best = argmax(&proba)
            .ok_or_else(|| InferenceError::Inference("empty probability output".into()))?;
        self.classes().get(best).copied().ok_or_else(|| {
            InferenceError::length_mismatch("classes", self.classes().len(), proba.len())
        })
    }
}

/// Index of the largest value; the first one wins on ties.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Raw artifact bytes plus their SHA-256 fingerprint.
pub struct RawArtifact {
    pub bytes: Vec<u8>,
    pub sha256: String,
}

/// Read an artifact file, distinguishing "absent" from "unreadable".
pub fn read_artifact(path: &Path) -> Result<RawArtifact, InferenceError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InferenceError::ArtifactNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(InferenceError::ArtifactCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };
    let sha256 = format!("sha256:{:x}", Sha256::digest(&bytes));
    Ok(RawArtifact { bytes, sha256 })
}

pub(crate) fn parse_json<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, InferenceError> {
    serde_json::from_slice(bytes).map_err(|e| InferenceError::ArtifactCorrupt {
        path: path.to_path_buf(),
        reason: format!("JSON parse failed: {e}"),
    })
}

pub(crate) fn corrupt(path: &Path, reason: impl Into<String>) -> InferenceError {
    InferenceError::ArtifactCorrupt {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Verify an artifact was fitted against the current schema for `disease`.
pub fn check_schema(
    disease: Disease,
    schema_version: &str,
    feature_names: Option<&[String]>,
    n_features: usize,
) -> Result<(), InferenceError> {
    let expected_version = schema::schema_version(disease);
    if schema_version != expected_version {
        return Err(InferenceError::ShapeMismatch {
            expected: format!("schema {expected_version}"),
            actual: format!("schema {schema_version}"),
        });
    }

    let expected_names = schema::feature_names(disease);
    if let Some(names) = feature_names {
        if names.len() != expected_names.len()
            || names.iter().zip(&expected_names).any(|(a, b)| a != b)
        {
            return Err(InferenceError::ShapeMismatch {
                expected: format!("columns {expected_names:?}"),
                actual: format!("columns {names:?}"),
            });
        }
    }

    if n_features != expected_names.len() {
        return Err(InferenceError::length_mismatch(
            "features",
            expected_names.len(),
            n_features,
        ));
    }
    Ok(())
}

/// Validate the class list of a binary classifier.
pub(crate) fn check_classes(path: &Path, classes: &[i64], positive_class: i64) -> Result<(), InferenceError> {
    if classes.len() != 2 {
        return Err(corrupt(
            path,
            format!("expected 2 classes, found {}", classes.len()),
        ));
    }
    if classes[0] == classes[1] {
        return Err(corrupt(path, format!("duplicate class label {}", classes[0])));
    }
    if !classes.contains(&positive_class) {
        return Err(corrupt(
            path,
            format!("positive class {positive_class} not in {classes:?}"),
        ));
    }
    Ok(())
}

pub(crate) fn default_positive_class() -> i64 {
    1
}
