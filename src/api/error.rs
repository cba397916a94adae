//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::inference::{InferenceError, PipelineError, Stage};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// HTTP status for an inference failure.
///
/// Deployment problems (missing or mismatched artifacts) are server-side;
/// everything else is about the submitted record.
pub fn status_for(err: &InferenceError) -> StatusCode {
    match err {
        InferenceError::UnknownDisease(_) => StatusCode::NOT_FOUND,
        InferenceError::MissingFeature(_)
        | InferenceError::InvalidFeature { .. }
        | InferenceError::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        InferenceError::ArtifactNotFound(_)
        | InferenceError::ArtifactCorrupt { .. }
        | InferenceError::ShapeMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn inference_parts(err: &InferenceError) -> (StatusCode, &'static str, String) {
    let status = status_for(err);
    let message = if status.is_server_error() {
        tracing::error!(error = %err, "Model artifacts unavailable");
        "Model artifacts are unavailable".to_string()
    } else {
        err.to_string()
    };
    (status, err.code(), message)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, stage) = match &self {
            ApiError::Inference(err) => {
                let (status, code, message) = inference_parts(err);
                (status, code, message, None)
            }
            ApiError::Pipeline(err) => {
                let (status, code, message) = inference_parts(&err.source);
                (status, code, message, Some(err.stage))
            }
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
                None,
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                stage,
            },
        };

        (status, Json(body)).into_response()
    }
}
