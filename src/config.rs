use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::inference::{ArtifactFormat, CachePolicy, RepositoryConfig};

/// Application-level constants
pub const APP_NAME: &str = "HealthReport";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address (local machine only).
pub const DEFAULT_ADDR: &str = "127.0.0.1:8501";

pub const ENV_MODELS_DIR: &str = "HEALTH_REPORT_MODELS_DIR";
pub const ENV_ADDR: &str = "HEALTH_REPORT_ADDR";
pub const ENV_CACHE: &str = "HEALTH_REPORT_CACHE";
pub const ENV_FORMAT: &str = "HEALTH_REPORT_FORMAT";

/// Whether this is a debug build.
pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if is_dev() {
        "health_report_lib=debug,tower_http=debug,info"
    } else {
        "info"
    }
}

/// Get the application data directory
/// ~/HealthReport/ on all platforms
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the models directory (scaler + classifier artifacts)
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub repository: RepositoryConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr_raw = lookup(ENV_ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw.parse().map_err(|e| ConfigError::Invalid {
            var: ENV_ADDR,
            reason: format!("{addr_raw}: {e}"),
        })?;

        let dir = lookup(ENV_MODELS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(models_dir);

        let cache = match lookup(ENV_CACHE) {
            Some(raw) => raw
                .parse::<CachePolicy>()
                .map_err(|reason| ConfigError::Invalid { var: ENV_CACHE, reason })?,
            None => CachePolicy::Cached,
        };

        let format = match lookup(ENV_FORMAT) {
            Some(raw) => raw
                .parse::<ArtifactFormat>()
                .map_err(|reason| ConfigError::Invalid { var: ENV_FORMAT, reason })?,
            None => ArtifactFormat::Json,
        };

        Ok(Self {
            addr,
            repository: RepositoryConfig::new(dir)
                .with_cache(cache)
                .with_format(format),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn models_dir_under_app_data() {
        let models = models_dir();
        assert!(models.starts_with(app_data_dir()));
        assert!(models.ends_with("models"));
    }

    #[test]
    fn app_name_is_health_report() {
        assert_eq!(APP_NAME, "HealthReport");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.repository.models_dir, models_dir());
        assert_eq!(config.repository.cache, CachePolicy::Cached);
        assert_eq!(config.repository.format, ArtifactFormat::Json);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_ADDR, "0.0.0.0:9000"),
            (ENV_MODELS_DIR, "/opt/models"),
            (ENV_CACHE, "per_request"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.repository.models_dir, PathBuf::from("/opt/models"));
        assert_eq!(config.repository.cache, CachePolicy::PerRequest);
    }

    #[test]
    fn bad_address_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_ADDR, "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == ENV_ADDR));
    }

    #[test]
    fn bad_cache_policy_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_CACHE, "forever")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == ENV_CACHE));
    }
}
