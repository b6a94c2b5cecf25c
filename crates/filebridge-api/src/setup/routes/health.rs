//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
    pub files: usize,
    pub total_bytes: u64,
    pub max_files: usize,
    pub max_total_bytes: u64,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Storage reachability plus registry usage against its limits.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = state.registry.storage().clone();
    let storage_status = run_check(
        TIMEOUT,
        async move {
            storage
                .exists("health-check-non-existent-key")
                .await
                .map(drop)
        },
        "unhealthy",
    )
    .await;

    let usage = state.registry.usage();
    let limits = state.registry.limits();
    let healthy = storage_status == "healthy";

    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        storage: storage_status,
        files: usage.files,
        total_bytes: usage.total_bytes,
        max_files: limits.max_files,
        max_total_bytes: limits.max_total_bytes,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
