//! Request lifecycle: collect → vectorize → predict → render.
//!
//! Linear, no retries. Each stage either hands its output to the next or
//! stops the request with a `PipelineError` naming where it failed.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::inference::repository::ModelRepository;
use crate::inference::{predictor, vectorizer, InferenceError, PatientInputs};
use crate::models::{Disease, DisplayReport};
use crate::report;
use crate::schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Collect,
    Vectorize,
    Predict,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collect => write!(f, "collect"),
            Self::Vectorize => write!(f, "vectorize"),
            Self::Predict => write!(f, "predict"),
        }
    }
}

#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: InferenceError,
}

impl PipelineError {
    fn at(stage: Stage) -> impl FnOnce(InferenceError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Request-scoped context for one report. Owns the submission's inputs;
/// nothing outlives the call to `generate_report`.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub request_id: Uuid,
    pub disease: Disease,
    pub inputs: PatientInputs,
}

impl ReportRequest {
    pub fn new(disease: Disease, inputs: PatientInputs) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            disease,
            inputs,
        }
    }

    /// Build a request from raw form fields.
    ///
    /// Only schema columns are read; each must parse as a number and may be
    /// given at most once (blank repeats are ignored). Absent columns are
    /// left for the vectorize stage to report.
    pub fn from_form<I, K, V>(disease: Disease, fields: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut inputs = PatientInputs::new();
        for (key, raw) in fields {
            let key = key.as_ref();
            let Some(spec) = schema::features(disease).iter().find(|f| f.name == key) else {
                continue;
            };
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let invalid = |reason: String| PipelineError {
                stage: Stage::Collect,
                source: InferenceError::InvalidFeature {
                    name: spec.name.to_string(),
                    reason,
                },
            };
            if inputs.get(spec.name).is_some() {
                return Err(invalid("submitted more than once".to_string()));
            }
            let value: f64 = raw
                .parse()
                .map_err(|_| invalid(format!("\"{raw}\" is not a number")))?;
            inputs.insert(spec.name, value);
        }
        Ok(Self::new(disease, inputs))
    }
}

/// Run one submission through the full pipeline.
pub fn generate_report(
    repo: &ModelRepository,
    request: ReportRequest,
) -> Result<DisplayReport, PipelineError> {
    let ReportRequest {
        request_id,
        disease,
        inputs,
    } = request;

    let span = tracing::info_span!("report", %request_id, %disease);
    let _guard = span.enter();

    let vector = vectorizer::validate(disease, &inputs)
        .and_then(|()| vectorizer::to_vector(disease, &inputs))
        .map_err(PipelineError::at(Stage::Vectorize))?;
    drop(inputs);

    let prediction =
        predictor::predict(repo, disease, &vector).map_err(PipelineError::at(Stage::Predict))?;

    let report = report::render(disease, &prediction);
    tracing::info!(
        diagnosis = report.diagnosis,
        probability = %report.probability_display,
        "Report generated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::repository::RepositoryConfig;
    use crate::inference::testing;
    use crate::models::ReportStyle;

    fn repo() -> (ModelRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        testing::write_all_artifacts(dir.path());
        (ModelRepository::new(RepositoryConfig::new(dir.path())), dir)
    }

    #[test]
    fn diabetes_low_risk_reports_no_diabetes() {
        let (repo, _dir) = repo();
        let request = ReportRequest::new(Disease::Diabetes, testing::diabetes_low_risk());
        let report = generate_report(&repo, request).unwrap();
        assert_eq!(report.diagnosis, "No Diabetes");
        assert_eq!(report.style, ReportStyle::Negative);
    }

    #[test]
    fn heart_example_diagnosis_tracks_label() {
        let (repo, _dir) = repo();
        let vector = vectorizer::to_vector(Disease::Heart, &testing::heart_example()).unwrap();
        let prediction = predictor::predict(&repo, Disease::Heart, &vector).unwrap();

        let report =
            generate_report(&repo, ReportRequest::new(Disease::Heart, testing::heart_example()))
                .unwrap();
        assert_eq!(report.diagnosis == "Heart Disease", prediction.label == 1);
        // The fixture places this patient on the disease side of the boundary.
        assert_eq!(report.diagnosis, "Heart Disease");
    }

    #[test]
    fn cancer_suspicious_reports_malignant() {
        let (repo, _dir) = repo();
        let report = generate_report(
            &repo,
            ReportRequest::new(Disease::Cancer, testing::cancer_suspicious()),
        )
        .unwrap();
        assert_eq!(report.diagnosis, "Malignant Cancer");
        assert_eq!(report.probability_display, "0.80");
    }

    #[test]
    fn missing_feature_stops_at_vectorize() {
        let (repo, _dir) = repo();
        let err = generate_report(&repo, ReportRequest::new(Disease::Diabetes, PatientInputs::new()))
            .unwrap_err();
        assert_eq!(err.stage, Stage::Vectorize);
        assert!(matches!(err.source, InferenceError::MissingFeature(ref k) if k == "Pregnancies"));
    }

    #[test]
    fn invalid_value_stops_before_prediction() {
        let (repo, _dir) = repo();
        let mut inputs = testing::heart_example();
        inputs.insert("sex", 2.0);
        let err = generate_report(&repo, ReportRequest::new(Disease::Heart, inputs)).unwrap_err();
        assert_eq!(err.stage, Stage::Vectorize);
        assert!(matches!(err.source, InferenceError::InvalidFeature { .. }));
        // Nothing was loaded because prediction never ran.
        assert!(repo.loaded().is_empty());
    }

    #[test]
    fn missing_artifacts_fail_at_predict() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ModelRepository::new(RepositoryConfig::new(dir.path()));
        let err = generate_report(
            &repo,
            ReportRequest::new(Disease::Diabetes, testing::diabetes_low_risk()),
        )
        .unwrap_err();
        assert_eq!(err.stage, Stage::Predict);
        assert!(matches!(err.source, InferenceError::ArtifactNotFound(_)));
    }

    #[test]
    fn form_fields_are_parsed_by_schema_name() {
        let request = ReportRequest::from_form(
            Disease::Cancer,
            [("mean radius", " 14.2 "), ("csrf", "abc"), ("worst area", "")],
        )
        .unwrap();
        assert_eq!(request.inputs.get("mean radius"), Some(14.2));
        assert_eq!(request.inputs.get("worst area"), None);
        assert_eq!(request.inputs.len(), 1);
    }

    #[test]
    fn unparseable_form_value_fails_at_collect() {
        let err = ReportRequest::from_form(Disease::Diabetes, [("Glucose", "high")]).unwrap_err();
        assert_eq!(err.stage, Stage::Collect);
        assert!(matches!(err.source, InferenceError::InvalidFeature { ref name, .. } if name == "Glucose"));
    }

    #[test]
    fn repeated_form_field_fails_at_collect() {
        let err = ReportRequest::from_form(
            Disease::Diabetes,
            [("Glucose", "85"), ("Age", "30"), ("Glucose", "190")],
        )
        .unwrap_err();
        assert_eq!(err.stage, Stage::Collect);
        assert!(matches!(
            err.source,
            InferenceError::InvalidFeature { ref name, ref reason }
                if name == "Glucose" && reason.contains("more than once")
        ));
    }

    #[test]
    fn blank_repeat_of_a_field_is_ignored() {
        let request =
            ReportRequest::from_form(Disease::Diabetes, [("Glucose", ""), ("Glucose", "85"), ("Glucose", " ")])
                .unwrap();
        assert_eq!(request.inputs.get("Glucose"), Some(85.0));
    }

    #[test]
    fn each_request_gets_its_own_id() {
        let a = ReportRequest::new(Disease::Heart, PatientInputs::new());
        let b = ReportRequest::new(Disease::Heart, PatientInputs::new());
        assert_ne!(a.request_id, b.request_id);
    }
}
