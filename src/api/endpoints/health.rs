//! Health check endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::types::{ApiContext, HealthResponse};

/// `GET /api/health`: liveness plus repository configuration.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let config = ctx.repository.config();
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        models_dir: config.models_dir.clone(),
        format: config.format,
        cache: config.cache,
        loaded: ctx.repository.loaded().len(),
    })
}
