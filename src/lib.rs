pub mod api;
pub mod config;
pub mod inference;
pub mod models;
pub mod report;
pub mod schema;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api::{start_report_server_on, ApiContext};
use crate::config::AppConfig;
use crate::inference::ModelRepository;

/// Start the report server and serve until Ctrl-C.
pub async fn run() -> Result<(), String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env().map_err(|e| e.to_string())?;
    tracing::info!(
        models_dir = %config.repository.models_dir.display(),
        format = ?config.repository.format,
        cache = ?config.repository.cache,
        "Model repository configured"
    );

    let repository = Arc::new(ModelRepository::new(config.repository));
    let server = start_report_server_on(ApiContext::new(repository), config.addr).await?;
    tracing::info!(
        session_id = %server.session.session_id,
        "Open http://{}/ in a browser",
        server.session.server_addr
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl-C: {e}"))?;
    tracing::info!("Ctrl-C received, shutting down");

    server.stop().await;
    Ok(())
}
