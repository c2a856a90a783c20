//! Health check handlers and response types.

use crate::constants::HEALTH_PROBE_TIMEOUT;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_error: Option<String>,
}

/// Plain-text banner.
pub async fn root() -> &'static str {
    "docscrub is running"
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Health check - the external tool can be started and answers `--version`.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let qpdf = state.sanitizer.qpdf();

    let (status, tool_version, tool_error) =
        match tokio::time::timeout(HEALTH_PROBE_TIMEOUT, qpdf.version()).await {
            Ok(Ok(version)) => (StatusCode::OK, Some(version), None),
            Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, None, Some(e.to_string())),
            Err(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                None,
                Some("timeout".to_string()),
            ),
        };

    let body = HealthCheckResponse {
        status: if status == StatusCode::OK {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        tool: qpdf.binary().to_string(),
        tool_version,
        tool_error,
    };

    (status, Json(body))
}
