//! JSON-exported feature scalers.

use std::path::Path;

use serde::Deserialize;

use super::{check_schema, corrupt, parse_json, Scaler};
use crate::inference::InferenceError;
use crate::models::Disease;

/// On-disk scaler document: schema tag plus fitted parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerArtifact {
    pub schema_version: String,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub params: ScalerParams,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `(x - data_min) / (data_max - data_min)`, mapped into `feature_range`.
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "unit_range")]
        feature_range: (f64, f64),
    },
}

fn unit_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl ScalerParams {
    fn n_features(&self) -> usize {
        match self {
            Self::Standard { mean, .. } => mean.len(),
            Self::MinMax { data_min, .. } => data_min.len(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let (a, b, what) = match self {
            Self::Standard { mean, scale } => (mean, scale, "mean/scale"),
            Self::MinMax {
                data_min, data_max, ..
            } => (data_min, data_max, "data_min/data_max"),
        };
        if a.len() != b.len() {
            return Err(format!("{what} lengths differ: {} vs {}", a.len(), b.len()));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(format!("{what} contains non-finite values"));
        }
        if let Self::MinMax { feature_range, .. } = self {
            if !(feature_range.0 < feature_range.1) {
                return Err(format!("invalid feature_range {feature_range:?}"));
            }
        }
        Ok(())
    }
}

/// Scaler backed by a JSON parameter export.
#[derive(Debug, Clone)]
pub struct JsonScaler {
    params: ScalerParams,
}

impl JsonScaler {
    /// Parse and validate a scaler artifact for `disease`.
    pub fn from_bytes(path: &Path, bytes: &[u8], disease: Disease) -> Result<Self, InferenceError> {
        let artifact: ScalerArtifact = parse_json(path, bytes)?;
        artifact.params.validate().map_err(|r| corrupt(path, r))?;
        check_schema(
            disease,
            &artifact.schema_version,
            artifact.feature_names.as_deref(),
            artifact.params.n_features(),
        )?;
        Ok(Self {
            params: artifact.params,
        })
    }
}

impl Scaler for JsonScaler {
    fn n_features(&self) -> usize {
        self.params.n_features()
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if row.len() != self.n_features() {
            return Err(InferenceError::length_mismatch(
                "features",
                self.n_features(),
                row.len(),
            ));
        }

        let scaled: Vec<f64> = match &self.params {
            ScalerParams::Standard { mean, scale } => row
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| {
                    // Constant columns were fitted with scale 0; leave them centred.
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (x - m) / s
                })
                .collect(),
            ScalerParams::MinMax {
                data_min,
                data_max,
                feature_range: (lo, hi),
            } => row
                .iter()
                .zip(data_min.iter().zip(data_max))
                .map(|(x, (min, max))| {
                    let range = if max - min == 0.0 { 1.0 } else { max - min };
                    (x - min) / range * (hi - lo) + lo
                })
                .collect(),
        };

        if let Some(pos) = scaled.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::Inference(format!(
                "scaled value at column {pos} is not finite"
            )));
        }
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(doc: serde_json::Value, disease: Disease) -> Result<JsonScaler, InferenceError> {
        let bytes = serde_json::to_vec(&doc).unwrap();
        JsonScaler::from_bytes(Path::new("test_scaler.json"), &bytes, disease)
    }

    fn diabetes_standard() -> serde_json::Value {
        json!({
            "schema_version": "diabetes/v1",
            "kind": "standard",
            "mean": [1.0, 100.0, 70.0, 20.0, 80.0, 30.0, 0.5, 30.0],
            "scale": [2.0, 20.0, 10.0, 0.0, 40.0, 5.0, 0.25, 10.0]
        })
    }

    #[test]
    fn standard_scaler_centres_and_scales() {
        let scaler = build(diabetes_standard(), Disease::Diabetes).unwrap();
        let out = scaler
            .transform(&[3.0, 120.0, 60.0, 25.0, 0.0, 35.0, 0.75, 30.0])
            .unwrap();
        assert_eq!(out, vec![1.0, 1.0, -1.0, 5.0, -2.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn min_max_scaler_maps_into_range() {
        let doc = json!({
            "schema_version": "diabetes/v1",
            "kind": "min_max",
            "data_min": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "data_max": [10.0, 200.0, 100.0, 50.0, 0.0, 50.0, 2.0, 80.0],
            "feature_range": [-1.0, 1.0]
        });
        let scaler = build(doc, Disease::Diabetes).unwrap();
        let out = scaler
            .transform(&[5.0, 200.0, 0.0, 25.0, 3.0, 25.0, 1.0, 40.0])
            .unwrap();
        assert_eq!(out, vec![0.0, 1.0, -1.0, 0.0, 5.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn wrong_row_length_is_shape_mismatch() {
        let scaler = build(diabetes_standard(), Disease::Diabetes).unwrap();
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { .. }));
    }

    #[test]
    fn nan_input_is_inference_error() {
        let scaler = build(diabetes_standard(), Disease::Diabetes).unwrap();
        let err = scaler
            .transform(&[f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, InferenceError::Inference(_)));
    }

    #[test]
    fn mismatched_parameter_lengths_are_corrupt() {
        let doc = json!({
            "schema_version": "diabetes/v1",
            "kind": "standard",
            "mean": [0.0, 0.0],
            "scale": [1.0]
        });
        let err = build(doc, Disease::Diabetes).unwrap_err();
        assert!(matches!(err, InferenceError::ArtifactCorrupt { .. }));
    }

    #[test]
    fn scaler_for_other_disease_is_rejected() {
        let err = build(diabetes_standard(), Disease::Heart).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { .. }));
    }

    #[test]
    fn unknown_kind_is_corrupt() {
        let doc = json!({
            "schema_version": "diabetes/v1",
            "kind": "robust",
            "center": [0.0]
        });
        let err = build(doc, Disease::Diabetes).unwrap_err();
        assert!(matches!(err, InferenceError::ArtifactCorrupt { .. }));
    }
}
