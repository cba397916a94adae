//! Reorders a name-keyed input mapping into the positional vector a model
//! was fitted on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::inference::InferenceError;
use crate::models::Disease;
use crate::schema;

/// User-entered values for one submission, keyed by feature name.
///
/// Built fresh for every report and dropped once it is rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientInputs(HashMap<String, f64>);

impl PatientInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PatientInputs {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Positional feature values; `values()[i]` belongs to schema column `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Build the feature vector for `disease` in schema order.
///
/// Fails on the first schema column (in order) that has no entry. Keys
/// that are not part of the schema are ignored.
pub fn to_vector(disease: Disease, inputs: &PatientInputs) -> Result<FeatureVector, InferenceError> {
    schema::features(disease)
        .iter()
        .map(|spec| {
            inputs
                .get(spec.name)
                .ok_or_else(|| InferenceError::MissingFeature(spec.name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(FeatureVector)
}

/// Check every supplied schema value against its column contract.
pub fn validate(disease: Disease, inputs: &PatientInputs) -> Result<(), InferenceError> {
    for spec in schema::features(disease) {
        if let Some(value) = inputs.get(spec.name) {
            spec.check(value)?;
        }
    }
    Ok(())
}
