//! ONNX Runtime backend for exported scaler/classifier graphs.
//!
//! Requires, per disease:
//! - `<disease>_scaler.onnx`: float input `[1, n]`, float output `[1, n]`
//! - `<disease>_model.onnx`: outputs `label` (int64 `[1]`) then
//!   `probabilities` (float `[1, n_classes]`, ZipMap disabled)
//! - `<disease>_manifest.json`: schema tag and class order, since the
//!   graphs carry no column names

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;
use serde::Deserialize;

use super::{check_classes, check_schema, parse_json, read_artifact, Classifier, Scaler};
use crate::inference::InferenceError;
use crate::models::Disease;

#[derive(Debug, Deserialize)]
struct Manifest {
    schema_version: String,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    n_features: usize,
    classes: Vec<i64>,
    #[serde(default = "super::default_positive_class")]
    positive_class: i64,
}

pub struct OnnxPair {
    pub model: OnnxClassifier,
    pub scaler: OnnxScaler,
    pub model_sha256: String,
    pub scaler_sha256: String,
}

/// Load and validate an ONNX scaler/classifier pair.
pub fn load_pair(
    model_path: &Path,
    scaler_path: &Path,
    manifest_path: &Path,
    disease: Disease,
) -> Result<OnnxPair, InferenceError> {
    let manifest_raw = read_artifact(manifest_path)?;
    let manifest: Manifest = parse_json(manifest_path, &manifest_raw.bytes)?;
    check_classes(manifest_path, &manifest.classes, manifest.positive_class)?;
    check_schema(
        disease,
        &manifest.schema_version,
        manifest.feature_names.as_deref(),
        manifest.n_features,
    )?;

    let model_raw = read_artifact(model_path)?;
    let scaler_raw = read_artifact(scaler_path)?;

    let model = OnnxClassifier {
        session: Mutex::new(build_session(model_path, &model_raw.bytes)?),
        n_features: manifest.n_features,
        classes: manifest.classes,
        positive_class: manifest.positive_class,
    };
    let scaler = OnnxScaler {
        session: Mutex::new(build_session(scaler_path, &scaler_raw.bytes)?),
        n_features: manifest.n_features,
    };

    tracing::info!(%disease, "ONNX artifacts loaded");

    Ok(OnnxPair {
        model,
        scaler,
        model_sha256: model_raw.sha256,
        scaler_sha256: scaler_raw.sha256,
    })
}

fn build_session(path: &Path, bytes: &[u8]) -> Result<Session, InferenceError> {
    let corrupt = |e: ort::Error| InferenceError::ArtifactCorrupt {
        path: path.to_path_buf(),
        reason: format!("ONNX load failed: {e}"),
    };
    Session::builder()
        .map_err(corrupt)?
        .with_intra_threads(1)
        .map_err(corrupt)?
        .commit_from_memory(bytes)
        .map_err(corrupt)
}

fn row_tensor(row: &[f64]) -> Result<ndarray::Array2<f32>, InferenceError> {
    let values: Vec<f32> = row.iter().map(|&v| v as f32).collect();
    ndarray::Array2::from_shape_vec((1, values.len()), values)
        .map_err(|e| InferenceError::Inference(e.to_string()))
}

fn run_error(e: ort::Error) -> InferenceError {
    InferenceError::Inference(format!("ONNX inference failed: {e}"))
}

/// Scaler graph run through ONNX Runtime.
///
/// `Session::run` needs `&mut self`; the Mutex gives `&self` access for
/// the shared, read-only artifact pair.
pub struct OnnxScaler {
    session: Mutex<Session>,
    n_features: usize,
}

impl Scaler for OnnxScaler {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if row.len() != self.n_features {
            return Err(InferenceError::length_mismatch(
                "features",
                self.n_features,
                row.len(),
            ));
        }
        let input = row_tensor(row)?;
        let tensor = TensorRef::from_array_view(&input).map_err(run_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Inference("Session lock poisoned".into()))?;
        let outputs = session.run(ort::inputs![tensor]).map_err(run_error)?;
        let (_shape, data) = outputs[0].try_extract_tensor::<f32>().map_err(run_error)?;

        if data.len() != self.n_features {
            return Err(InferenceError::length_mismatch(
                "scaled features",
                self.n_features,
                data.len(),
            ));
        }
        let scaled: Vec<f64> = data.iter().map(|&v| v as f64).collect();
        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::Inference(
                "scaled value is not finite".into(),
            ));
        }
        Ok(scaled)
    }
}

/// Classifier graph run through ONNX Runtime.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    n_features: usize,
    classes: Vec<i64>,
    positive_class: i64,
}

impl OnnxClassifier {
    /// Run the graph once, returning `(label, probabilities)`.
    fn run(&self, row: &[f64]) -> Result<(i64, Vec<f64>), InferenceError> {
        if row.len() != self.n_features {
            return Err(InferenceError::length_mismatch(
                "features",
                self.n_features,
                row.len(),
            ));
        }
        let input = row_tensor(row)?;
        let tensor = TensorRef::from_array_view(&input).map_err(run_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Inference("Session lock poisoned".into()))?;
        let outputs = session.run(ort::inputs![tensor]).map_err(run_error)?;

        let (_shape, labels) = outputs[0].try_extract_tensor::<i64>().map_err(run_error)?;
        let label = labels
            .first()
            .copied()
            .ok_or_else(|| InferenceError::Inference("empty label output".into()))?;

        let (shape, proba) = outputs[1].try_extract_tensor::<f32>().map_err(run_error)?;
        if proba.len() != self.classes.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: format!("[1, {}] probabilities", self.classes.len()),
                actual: format!("{shape:?}"),
            });
        }
        Ok((label, proba.iter().map(|&p| p as f64).collect()))
    }
}

impl Classifier for OnnxClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn positive_class(&self) -> i64 {
        self.positive_class
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        self.run(row).map(|(_, proba)| proba)
    }

    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError> {
        self.run(row).map(|(label, _)| label)
    }
}

#[cfg(all(test, feature = "onnx-models"))]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::inference::testing::write_json;
    use crate::schema;

    struct Paths {
        dir: tempfile::TempDir,
    }

    impl Paths {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn model(&self) -> std::path::PathBuf {
            self.dir.path().join("heart_model.onnx")
        }

        fn scaler(&self) -> std::path::PathBuf {
            self.dir.path().join("heart_scaler.onnx")
        }

        fn manifest(&self) -> std::path::PathBuf {
            self.dir.path().join("heart_manifest.json")
        }

        fn load_err(&self) -> InferenceError {
            match load_pair(&self.model(), &self.scaler(), &self.manifest(), Disease::Heart) {
                Ok(_) => panic!("load should fail"),
                Err(e) => e,
            }
        }
    }

    fn heart_manifest() -> serde_json::Value {
        json!({
            "schema_version": schema::schema_version(Disease::Heart),
            "feature_names": schema::feature_names(Disease::Heart),
            "n_features": 13,
            "classes": [0, 1],
        })
    }

    #[test]
    fn missing_manifest_is_not_found() {
        let paths = Paths::new();
        let err = paths.load_err();
        assert!(matches!(err, InferenceError::ArtifactNotFound(ref p) if p == &paths.manifest()));
    }

    #[test]
    fn unparseable_manifest_is_corrupt() {
        let paths = Paths::new();
        std::fs::write(paths.manifest(), b"not json").unwrap();
        let err = paths.load_err();
        assert!(matches!(err, InferenceError::ArtifactCorrupt { ref path, .. } if path == &paths.manifest()));
    }

    #[test]
    fn manifest_for_other_schema_is_shape_mismatch() {
        let paths = Paths::new();
        let mut manifest = heart_manifest();
        manifest["schema_version"] = json!("heart/v0");
        write_json(&paths.manifest(), &manifest);
        let err = paths.load_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { ref actual, .. } if actual == "schema heart/v0"));
    }

    #[test]
    fn manifest_with_reordered_columns_is_shape_mismatch() {
        let paths = Paths::new();
        let mut names = schema::feature_names(Disease::Heart);
        names.swap(0, 1);
        let mut manifest = heart_manifest();
        manifest["feature_names"] = json!(names);
        write_json(&paths.manifest(), &manifest);
        assert!(matches!(paths.load_err(), InferenceError::ShapeMismatch { .. }));
    }

    #[test]
    fn manifest_with_bad_classes_is_corrupt() {
        let paths = Paths::new();
        let mut manifest = heart_manifest();
        manifest["classes"] = json!([1, 1]);
        write_json(&paths.manifest(), &manifest);
        let err = paths.load_err();
        assert!(matches!(
            err,
            InferenceError::ArtifactCorrupt { ref path, ref reason }
                if path == &paths.manifest() && reason.contains("duplicate")
        ));
    }

    #[test]
    fn valid_manifest_then_requires_model_graph() {
        let paths = Paths::new();
        write_json(&paths.manifest(), &heart_manifest());
        let err = paths.load_err();
        assert!(matches!(err, InferenceError::ArtifactNotFound(ref p) if p == &paths.model()));
    }
}
