//! Feature schema: the ordered column list each classifier was fitted on.
//!
//! The order and spelling of every name here is the contract between the
//! form and the trained artifacts. Names are whitespace-sensitive
//! (`"mean radius"`), and any change to a model's training columns must be
//! mirrored here and in `schema_version`.

use serde::Serialize;

use crate::inference::InferenceError;
use crate::models::Disease;

/// Widget/value contract for one input column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureKind {
    /// Non-negative integer, step 1.
    Count { max: Option<f64> },
    /// Decimal value entered with the given step.
    Measure {
        min: Option<f64>,
        step: f64,
        default: f64,
    },
    /// One of a fixed set of category codes.
    Choice { options: &'static [i64] },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    const fn count(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FeatureKind::Count { max: None },
        }
    }

    const fn bounded_count(name: &'static str, label: &'static str, max: f64) -> Self {
        Self {
            name,
            label,
            kind: FeatureKind::Count { max: Some(max) },
        }
    }

    const fn measure(name: &'static str, label: &'static str, min: Option<f64>, step: f64) -> Self {
        Self {
            name,
            label,
            kind: FeatureKind::Measure {
                min,
                step,
                default: 0.0,
            },
        }
    }

    const fn choice(name: &'static str, label: &'static str, options: &'static [i64]) -> Self {
        Self {
            name,
            label,
            kind: FeatureKind::Choice { options },
        }
    }

    /// Breast cancer columns: free decimals prefilled with 1.0.
    const fn cell(name: &'static str) -> Self {
        Self {
            name,
            label: name,
            kind: FeatureKind::Measure {
                min: None,
                step: 0.1,
                default: 1.0,
            },
        }
    }

    /// Value the form shows before the user edits the field.
    pub fn default_value(&self) -> f64 {
        match self.kind {
            FeatureKind::Measure { default, .. } => default,
            FeatureKind::Count { .. } => 0.0,
            FeatureKind::Choice { options } => options.first().copied().unwrap_or(0) as f64,
        }
    }

    /// Check a submitted value against this column's contract.
    pub fn check(&self, value: f64) -> Result<(), InferenceError> {
        let invalid = |reason: String| InferenceError::InvalidFeature {
            name: self.name.to_string(),
            reason,
        };

        if !value.is_finite() {
            return Err(invalid("value must be a finite number".into()));
        }

        match self.kind {
            FeatureKind::Count { max } => {
                if value < 0.0 {
                    return Err(invalid(format!("{value} is negative")));
                }
                if value.fract() != 0.0 {
                    return Err(invalid(format!("{value} is not a whole number")));
                }
                if let Some(max) = max {
                    if value > max {
                        return Err(invalid(format!("{value} exceeds maximum {max}")));
                    }
                }
            }
            FeatureKind::Measure { min, .. } => {
                if let Some(min) = min {
                    if value < min {
                        return Err(invalid(format!("{value} is below minimum {min}")));
                    }
                }
            }
            FeatureKind::Choice { options } => {
                let allowed = value.fract() == 0.0 && options.iter().any(|&o| o as f64 == value);
                if !allowed {
                    return Err(invalid(format!("{value} is not one of {options:?}")));
                }
            }
        }
        Ok(())
    }
}

const DIABETES: [FeatureSpec; 8] = [
    FeatureSpec::count("Pregnancies", "Pregnancies"),
    FeatureSpec::count("Glucose", "Glucose"),
    FeatureSpec::count("BloodPressure", "Blood Pressure"),
    FeatureSpec::count("SkinThickness", "Skin Thickness"),
    FeatureSpec::count("Insulin", "Insulin"),
    FeatureSpec::measure("BMI", "BMI", Some(0.0), 0.1),
    FeatureSpec::measure(
        "DiabetesPedigreeFunction",
        "Diabetes Pedigree Function",
        Some(0.0),
        0.01,
    ),
    FeatureSpec::count("Age", "Age"),
];

const HEART: [FeatureSpec; 13] = [
    FeatureSpec::count("age", "Age"),
    FeatureSpec::choice("sex", "Sex (0=female,1=male)", &[0, 1]),
    FeatureSpec::choice("cp", "Chest Pain Type (cp)", &[0, 1, 2, 3]),
    FeatureSpec::count("trtbps", "Resting Blood Pressure"),
    FeatureSpec::count("chol", "Cholesterol"),
    FeatureSpec::choice("fbs", "Fasting Blood Sugar >120 (1=yes,0=no)", &[0, 1]),
    FeatureSpec::choice("restecg", "Resting ECG", &[0, 1, 2]),
    FeatureSpec::count("thalachh", "Max Heart Rate Achieved"),
    FeatureSpec::choice("exng", "Exercise Induced Angina (1=yes,0=no)", &[0, 1]),
    FeatureSpec::measure("oldpeak", "Oldpeak", None, 0.1),
    FeatureSpec::choice("slp", "Slope (slp)", &[0, 1, 2]),
    FeatureSpec::bounded_count("caa", "Number of Major Vessels (caa)", 4.0),
    FeatureSpec::choice("thall", "Thalassemia (thall)", &[0, 1, 2, 3]),
];

const CANCER: [FeatureSpec; 30] = [
    FeatureSpec::cell("mean radius"),
    FeatureSpec::cell("mean texture"),
    FeatureSpec::cell("mean perimeter"),
    FeatureSpec::cell("mean area"),
    FeatureSpec::cell("mean smoothness"),
    FeatureSpec::cell("mean compactness"),
    FeatureSpec::cell("mean concavity"),
    FeatureSpec::cell("mean concave points"),
    FeatureSpec::cell("mean symmetry"),
    FeatureSpec::cell("mean fractal dimension"),
    FeatureSpec::cell("radius error"),
    FeatureSpec::cell("texture error"),
    FeatureSpec::cell("perimeter error"),
    FeatureSpec::cell("area error"),
    FeatureSpec::cell("smoothness error"),
    FeatureSpec::cell("compactness error"),
    FeatureSpec::cell("concavity error"),
    FeatureSpec::cell("concave points error"),
    FeatureSpec::cell("symmetry error"),
    FeatureSpec::cell("fractal dimension error"),
    FeatureSpec::cell("worst radius"),
    FeatureSpec::cell("worst texture"),
    FeatureSpec::cell("worst perimeter"),
    FeatureSpec::cell("worst area"),
    FeatureSpec::cell("worst smoothness"),
    FeatureSpec::cell("worst compactness"),
    FeatureSpec::cell("worst concavity"),
    FeatureSpec::cell("worst concave points"),
    FeatureSpec::cell("worst symmetry"),
    FeatureSpec::cell("worst fractal dimension"),
];

/// Ordered feature table for a disease.
pub fn features(disease: Disease) -> &'static [FeatureSpec] {
    match disease {
        Disease::Diabetes => &DIABETES,
        Disease::Heart => &HEART,
        Disease::Cancer => &CANCER,
    }
}

/// Ordered feature names for a disease key.
pub fn order_for(key: &str) -> Result<Vec<&'static str>, InferenceError> {
    let disease: Disease = key.parse()?;
    Ok(feature_names(disease))
}

pub fn feature_names(disease: Disease) -> Vec<&'static str> {
    features(disease).iter().map(|f| f.name).collect()
}

/// Tag stored alongside each artifact pair; bumped whenever the column
/// list above changes.
pub fn schema_version(disease: Disease) -> &'static str {
    match disease {
        Disease::Diabetes => "diabetes/v1",
        Disease::Heart => "heart/v1",
        Disease::Cancer => "cancer/v1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lengths() {
        assert_eq!(features(Disease::Diabetes).len(), 8);
        assert_eq!(features(Disease::Heart).len(), 13);
        assert_eq!(features(Disease::Cancer).len(), 30);
    }

    #[test]
    fn diabetes_order_matches_training_columns() {
        assert_eq!(
            order_for("diabetes").unwrap(),
            vec![
                "Pregnancies",
                "Glucose",
                "BloodPressure",
                "SkinThickness",
                "Insulin",
                "BMI",
                "DiabetesPedigreeFunction",
                "Age",
            ]
        );
    }

    #[test]
    fn heart_order_matches_training_columns() {
        assert_eq!(
            order_for("heart").unwrap(),
            vec![
                "age", "sex", "cp", "trtbps", "chol", "fbs", "restecg", "thalachh", "exng",
                "oldpeak", "slp", "caa", "thall",
            ]
        );
    }

    #[test]
    fn cancer_names_keep_spaces() {
        let names = order_for("cancer").unwrap();
        assert_eq!(names[0], "mean radius");
        assert_eq!(names[7], "mean concave points");
        assert_eq!(names[19], "fractal dimension error");
        assert_eq!(names[29], "worst fractal dimension");
    }

    #[test]
    fn unknown_disease_is_rejected() {
        let err = order_for("unknown").unwrap_err();
        assert!(matches!(err, InferenceError::UnknownDisease(ref k) if k == "unknown"));
    }

    #[test]
    fn names_are_unique_per_disease() {
        for disease in Disease::ALL {
            let mut names = feature_names(disease);
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate column in {disease}");
        }
    }

    #[test]
    fn count_rejects_negative_and_fractional() {
        let glucose = &features(Disease::Diabetes)[1];
        assert!(glucose.check(85.0).is_ok());
        assert!(glucose.check(-1.0).is_err());
        assert!(glucose.check(85.5).is_err());
    }

    #[test]
    fn bounded_count_enforces_max() {
        let caa = features(Disease::Heart)
            .iter()
            .find(|f| f.name == "caa")
            .unwrap();
        assert!(caa.check(4.0).is_ok());
        let err = caa.check(5.0).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidFeature { ref name, .. } if name == "caa"));
    }

    #[test]
    fn choice_accepts_only_listed_codes() {
        let cp = features(Disease::Heart)
            .iter()
            .find(|f| f.name == "cp")
            .unwrap();
        assert!(cp.check(3.0).is_ok());
        assert!(cp.check(4.0).is_err());
        assert!(cp.check(1.5).is_err());
    }

    #[test]
    fn measure_enforces_minimum_only_when_set() {
        let bmi = &features(Disease::Diabetes)[5];
        assert!(bmi.check(26.6).is_ok());
        assert!(bmi.check(-0.1).is_err());

        let oldpeak = features(Disease::Heart)
            .iter()
            .find(|f| f.name == "oldpeak")
            .unwrap();
        assert!(oldpeak.check(-2.6).is_ok());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let radius = &features(Disease::Cancer)[0];
        assert!(radius.check(f64::NAN).is_err());
        assert!(radius.check(f64::INFINITY).is_err());
    }

    #[test]
    fn cancer_fields_default_to_one() {
        assert!(features(Disease::Cancer)
            .iter()
            .all(|f| f.default_value() == 1.0));
    }
}
