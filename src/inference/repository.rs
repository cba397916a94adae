//! Model repository: resolves, loads and caches scaler/classifier pairs.
//!
//! Artifacts live in one directory, named by convention:
//! `<models_dir>/<disease>_model.<ext>` and `<models_dir>/<disease>_scaler.<ext>`.
//!
//! With `CachePolicy::Cached` a loaded pair is kept for the process
//! lifetime (or until `reload`/`clear`). Pairs are immutable after load
//! and shared as `Arc`, so concurrent requests read them without locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::inference::artifacts::{self, Classifier, JsonClassifier, JsonScaler, Scaler};
use crate::inference::InferenceError;
use crate::models::Disease;

// ═══════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════

/// Serialization format of the artifact files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    Json,
    #[cfg(feature = "onnx-models")]
    Onnx,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            #[cfg(feature = "onnx-models")]
            Self::Onnx => "onnx",
        }
    }
}

impl std::str::FromStr for ArtifactFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            #[cfg(feature = "onnx-models")]
            "onnx" => Ok(Self::Onnx),
            #[cfg(not(feature = "onnx-models"))]
            "onnx" => Err("ONNX artifacts require the `onnx-models` feature".into()),
            other => Err(format!("Invalid artifact format: {other}")),
        }
    }
}

/// Whether loaded pairs are kept between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    Cached,
    PerRequest,
}

impl std::str::FromStr for CachePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cached" => Ok(Self::Cached),
            "per_request" => Ok(Self::PerRequest),
            other => Err(format!("Invalid cache policy: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub models_dir: PathBuf,
    pub format: ArtifactFormat,
    pub cache: CachePolicy,
}

impl RepositoryConfig {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            format: ArtifactFormat::Json,
            cache: CachePolicy::Cached,
        }
    }

    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_format(mut self, format: ArtifactFormat) -> Self {
        self.format = format;
        self
    }
}

// ═══════════════════════════════════════════════════════════
// Loaded artifacts
// ═══════════════════════════════════════════════════════════

/// Provenance of a loaded pair, exposed on the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedArtifactInfo {
    pub disease: Disease,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub model_sha256: String,
    pub scaler_sha256: String,
    pub loaded_at: DateTime<Utc>,
}

/// A fitted scaler and the classifier trained on its output.
pub struct ArtifactPair {
    pub model: Box<dyn Classifier>,
    pub scaler: Box<dyn Scaler>,
    pub info: LoadedArtifactInfo,
}

impl std::fmt::Debug for ArtifactPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactPair")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════
// Repository
// ═══════════════════════════════════════════════════════════

pub struct ModelRepository {
    config: RepositoryConfig,
    cache: RwLock<HashMap<Disease, Arc<ArtifactPair>>>,
}

impl ModelRepository {
    pub fn new(config: RepositoryConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn models_dir(&self) -> &Path {
        &self.config.models_dir
    }

    /// `(model_path, scaler_path)` for a disease.
    pub fn artifact_paths(&self, disease: Disease) -> (PathBuf, PathBuf) {
        let ext = self.config.format.extension();
        let dir = &self.config.models_dir;
        (
            dir.join(format!("{disease}_model.{ext}")),
            dir.join(format!("{disease}_scaler.{ext}")),
        )
    }

    /// Get the pair for `disease`, from cache when allowed.
    pub fn load(&self, disease: Disease) -> Result<Arc<ArtifactPair>, InferenceError> {
        if self.config.cache == CachePolicy::PerRequest {
            return self.load_from_disk(disease).map(Arc::new);
        }

        if let Some(pair) = self.read_cache().get(&disease) {
            return Ok(Arc::clone(pair));
        }

        let pair = Arc::new(self.load_from_disk(disease)?);
        // Another request may have loaded the same pair meanwhile; keep the first.
        let mut cache = self.write_cache();
        Ok(Arc::clone(cache.entry(disease).or_insert(pair)))
    }

    /// Re-read the pair from disk, replacing any cached entry.
    ///
    /// On failure the previous entry is dropped as well, so a broken
    /// deployment surfaces on the next request instead of serving stale
    /// artifacts.
    pub fn reload(&self, disease: Disease) -> Result<Arc<ArtifactPair>, InferenceError> {
        self.write_cache().remove(&disease);
        tracing::info!(%disease, "Reloading model artifacts");
        self.load(disease)
    }

    /// Drop every cached pair.
    pub fn clear(&self) {
        self.write_cache().clear();
    }

    /// Provenance of every cached pair, in sidebar order.
    pub fn loaded(&self) -> Vec<LoadedArtifactInfo> {
        let cache = self.read_cache();
        Disease::ALL
            .iter()
            .filter_map(|d| cache.get(d).map(|pair| pair.info.clone()))
            .collect()
    }

    // Entries are immutable `Arc`s, so a poisoned lock still guards a
    // consistent map.
    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Disease, Arc<ArtifactPair>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Disease, Arc<ArtifactPair>>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_from_disk(&self, disease: Disease) -> Result<ArtifactPair, InferenceError> {
        let (model_path, scaler_path) = self.artifact_paths(disease);

        let (model, scaler, model_sha256, scaler_sha256): (
            Box<dyn Classifier>,
            Box<dyn Scaler>,
            String,
            String,
        ) = match self.config.format {
            ArtifactFormat::Json => {
                let model_raw = artifacts::read_artifact(&model_path)?;
                let scaler_raw = artifacts::read_artifact(&scaler_path)?;
                let model = JsonClassifier::from_bytes(&model_path, &model_raw.bytes, disease)?;
                let scaler = JsonScaler::from_bytes(&scaler_path, &scaler_raw.bytes, disease)?;
                (
                    Box::new(model),
                    Box::new(scaler),
                    model_raw.sha256,
                    scaler_raw.sha256,
                )
            }
            #[cfg(feature = "onnx-models")]
            ArtifactFormat::Onnx => {
                let manifest_path = self
                    .config
                    .models_dir
                    .join(format!("{disease}_manifest.json"));
                let loaded = artifacts::onnx::load_pair(
                    &model_path,
                    &scaler_path,
                    &manifest_path,
                    disease,
                )?;
                (
                    Box::new(loaded.model),
                    Box::new(loaded.scaler),
                    loaded.model_sha256,
                    loaded.scaler_sha256,
                )
            }
        };

        if model.n_features() != scaler.n_features() {
            return Err(InferenceError::length_mismatch(
                "features",
                scaler.n_features(),
                model.n_features(),
            ));
        }

        tracing::info!(
            %disease,
            model = %model_path.display(),
            model_sha256 = %model_sha256,
            scaler_sha256 = %scaler_sha256,
            "Model artifacts loaded"
        );

        Ok(ArtifactPair {
            model,
            scaler,
            info: LoadedArtifactInfo {
                disease,
                model_path,
                scaler_path,
                model_sha256,
                scaler_sha256,
                loaded_at: Utc::now(),
            },
        })
    }
}
