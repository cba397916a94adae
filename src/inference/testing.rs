//! Shared fixtures: small hand-fitted artifacts and reference patients.

use std::path::Path;

use serde_json::{json, Value};

use crate::inference::PatientInputs;
use crate::models::Disease;
use crate::schema;

pub fn diabetes_low_risk() -> PatientInputs {
    [
        ("Pregnancies", 1.0),
        ("Glucose", 85.0),
        ("BloodPressure", 66.0),
        ("SkinThickness", 29.0),
        ("Insulin", 0.0),
        ("BMI", 26.6),
        ("DiabetesPedigreeFunction", 0.351),
        ("Age", 31.0),
    ]
    .into_iter()
    .collect()
}

pub fn diabetes_high_risk() -> PatientInputs {
    [
        ("Pregnancies", 8.0),
        ("Glucose", 183.0),
        ("BloodPressure", 64.0),
        ("SkinThickness", 0.0),
        ("Insulin", 0.0),
        ("BMI", 43.1),
        ("DiabetesPedigreeFunction", 2.288),
        ("Age", 52.0),
    ]
    .into_iter()
    .collect()
}

pub fn heart_example() -> PatientInputs {
    [
        ("age", 63.0),
        ("sex", 1.0),
        ("cp", 3.0),
        ("trtbps", 145.0),
        ("chol", 233.0),
        ("fbs", 1.0),
        ("restecg", 0.0),
        ("thalachh", 150.0),
        ("exng", 0.0),
        ("oldpeak", 2.3),
        ("slp", 0.0),
        ("caa", 0.0),
        ("thall", 1.0),
    ]
    .into_iter()
    .collect()
}

/// Every cancer column at its form default (1.0).
pub fn cancer_defaults() -> PatientInputs {
    schema::features(Disease::Cancer)
        .iter()
        .map(|f| (f.name, f.default_value()))
        .collect()
}

pub fn cancer_suspicious() -> PatientInputs {
    let mut inputs = cancer_defaults();
    inputs.insert("worst radius", 25.0);
    inputs.insert("mean concave points", 0.15);
    inputs
}

pub fn diabetes_scaler() -> Value {
    json!({
        "schema_version": "diabetes/v1",
        "feature_names": schema::feature_names(Disease::Diabetes),
        "kind": "standard",
        "mean": [3.8, 120.9, 69.1, 20.5, 79.8, 32.0, 0.47, 33.2],
        "scale": [3.37, 31.95, 19.34, 15.94, 115.2, 7.88, 0.33, 11.76]
    })
}

pub fn diabetes_model() -> Value {
    json!({
        "schema_version": "diabetes/v1",
        "feature_names": schema::feature_names(Disease::Diabetes),
        "classes": [0, 1],
        "positive_class": 1,
        "kind": "logistic_regression",
        "coef": [0.4, 1.1, -0.2, 0.05, -0.1, 0.7, 0.3, 0.2],
        "intercept": -0.85
    })
}

pub fn heart_scaler() -> Value {
    json!({
        "schema_version": "heart/v1",
        "kind": "standard",
        "mean": [54.4, 0.68, 0.97, 131.6, 246.3, 0.15, 0.53, 149.6, 0.33, 1.04, 1.40, 0.73, 2.31],
        "scale": [9.07, 0.47, 1.03, 17.5, 51.7, 0.36, 0.53, 22.9, 0.47, 1.16, 0.62, 1.02, 0.61]
    })
}

pub fn heart_model() -> Value {
    json!({
        "schema_version": "heart/v1",
        "classes": [0, 1],
        "kind": "logistic_regression",
        "coef": [-0.1, -0.8, 0.9, -0.3, -0.2, 0.1, 0.3, 0.5, -0.6, -0.7, 0.4, -0.8, -0.6],
        "intercept": 0.2
    })
}

pub fn cancer_scaler() -> Value {
    let mut mean = vec![0.0; 30];
    let mut scale = vec![1.0; 30];
    mean[7] = 0.05;
    scale[7] = 0.04;
    mean[20] = 16.0;
    scale[20] = 5.0;
    json!({
        "schema_version": "cancer/v1",
        "feature_names": schema::feature_names(Disease::Cancer),
        "kind": "standard",
        "mean": mean,
        "scale": scale
    })
}

/// Two stumps: one on "worst radius" (column 20), one on
/// "mean concave points" (column 7).
pub fn cancer_model() -> Value {
    json!({
        "schema_version": "cancer/v1",
        "classes": [0, 1],
        "kind": "random_forest",
        "n_features": 30,
        "trees": [
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [20, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[11.0, 9.0], [9.0, 1.0], [2.0, 8.0]]
            },
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [7, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[8.0, 7.0], [7.0, 3.0], [1.0, 4.0]]
            }
        ]
    })
}

pub fn model_for(disease: Disease) -> Value {
    match disease {
        Disease::Diabetes => diabetes_model(),
        Disease::Heart => heart_model(),
        Disease::Cancer => cancer_model(),
    }
}

pub fn scaler_for(disease: Disease) -> Value {
    match disease {
        Disease::Diabetes => diabetes_scaler(),
        Disease::Heart => heart_scaler(),
        Disease::Cancer => cancer_scaler(),
    }
}

pub fn write_json(path: &Path, doc: &Value) {
    std::fs::write(path, serde_json::to_vec_pretty(doc).unwrap()).unwrap();
}

/// Write the model/scaler pair for every disease into `dir`.
pub fn write_all_artifacts(dir: &Path) {
    for disease in Disease::ALL {
        write_json(
            &dir.join(format!("{disease}_model.json")),
            &model_for(disease),
        );
        write_json(
            &dir.join(format!("{disease}_scaler.json")),
            &scaler_for(disease),
        );
    }
}
