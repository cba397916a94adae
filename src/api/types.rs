//! Shared handler state and JSON request/response bodies.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::inference::repository::LoadedArtifactInfo;
use crate::inference::{ArtifactFormat, CachePolicy, ModelRepository, PatientInputs};
use crate::models::Disease;
use crate::schema::FeatureSpec;

// ═══════════════════════════════════════════════════════════
// ApiContext: shared state for all handlers
// ═══════════════════════════════════════════════════════════

/// Shared state passed to every handler via `State<ApiContext>`.
///
/// The repository is the only state that outlives a request.
#[derive(Clone)]
pub struct ApiContext {
    pub repository: Arc<ModelRepository>,
}

impl ApiContext {
    pub fn new(repository: Arc<ModelRepository>) -> Self {
        Self { repository }
    }

    /// Run synchronous load/inference work on the blocking pool.
    pub async fn run_blocking<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&ModelRepository) -> T + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        tokio::task::spawn_blocking(move || work(&repository))
            .await
            .map_err(|e| ApiError::Internal(format!("Blocking task failed: {e}")))
    }
}

// ═══════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════

/// `POST /api/predict/:disease` body.
#[derive(Debug, Deserialize)]
pub struct PredictBody {
    pub inputs: PatientInputs,
}

// ═══════════════════════════════════════════════════════════
// Response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub models_dir: PathBuf,
    pub format: ArtifactFormat,
    pub cache: CachePolicy,
    pub loaded: usize,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub disease: Disease,
    pub display_name: &'static str,
    pub schema_version: &'static str,
    pub features: &'static [FeatureSpec],
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models_dir: PathBuf,
    pub loaded: Vec<LoadedArtifactInfo>,
}
