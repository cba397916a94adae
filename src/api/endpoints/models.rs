//! Loaded-artifact status and reload endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ModelsResponse};
use crate::inference::repository::LoadedArtifactInfo;
use crate::models::Disease;

/// `GET /api/models`: artifact pairs currently held in the cache.
pub async fn list(State(ctx): State<ApiContext>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models_dir: ctx.repository.models_dir().to_path_buf(),
        loaded: ctx.repository.loaded(),
    })
}

/// `POST /api/models/:disease/reload`: drop the cached pair and load it again
/// from disk.
pub async fn reload(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
) -> Result<Json<LoadedArtifactInfo>, ApiError> {
    let disease: Disease = key.parse()?;
    let pair = ctx.run_blocking(move |repo| repo.reload(disease)).await??;
    tracing::info!(%disease, model_sha256 = %pair.info.model_sha256, "Artifacts reloaded");
    Ok(Json(pair.info.clone()))
}
