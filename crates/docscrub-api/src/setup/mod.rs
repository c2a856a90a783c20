//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use docscrub_core::Config;
use docscrub_processing::{DocumentSanitizer, QpdfService, ScratchArea};
use std::sync::Arc;

/// Initialize the entire application: state, tool diagnostics and routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let state = build_state(&config).await?;
    log_tool_diagnostics(&state).await;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Build shared state, creating the scratch directory if needed.
pub async fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let scratch = ScratchArea::new(config.scratch_dir());
    scratch
        .ensure_exists()
        .await
        .with_context(|| format!("Failed to create scratch dir {}", scratch.dir().display()))?;

    let qpdf = QpdfService::new(config.qpdf_path(), config.tool_timeout());
    let sanitizer = DocumentSanitizer::new(qpdf, scratch, config.max_concurrent_jobs());

    Ok(Arc::new(AppState {
        config: config.clone(),
        sanitizer,
    }))
}

/// Log which tool binary will be used and its version. A missing tool is not
/// fatal at startup; requests will fail with a tool error and `/health`
/// reports it.
async fn log_tool_diagnostics(state: &AppState) {
    let qpdf = state.sanitizer.qpdf();
    match qpdf.version().await {
        Ok(version) => {
            tracing::info!(binary = %qpdf.binary(), version = %version, "qpdf available");
        }
        Err(e) => {
            tracing::warn!(binary = %qpdf.binary(), error = %e, "qpdf diagnostics failed");
        }
    }
}
