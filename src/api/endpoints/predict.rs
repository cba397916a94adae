//! JSON prediction endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, PredictBody};
use crate::inference::{generate_report, ReportRequest};
use crate::models::{Disease, DisplayReport};

/// `POST /api/predict/:disease`: run one record through the pipeline.
pub async fn predict(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
    body: Result<Json<PredictBody>, JsonRejection>,
) -> Result<Json<DisplayReport>, ApiError> {
    let disease: Disease = key.parse()?;
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let request = ReportRequest::new(disease, body.inputs);
    let report = ctx
        .run_blocking(move |repo| generate_report(repo, request))
        .await??;
    Ok(Json(report))
}
