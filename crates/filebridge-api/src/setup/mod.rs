//! Application setup and initialization
//!
//! `initialize_app` is what the binary runs. Tests call [`build_app`] directly with their own
//! storage and clock.

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use filebridge_core::Config;
use filebridge_services::{create_storage, Clock, Storage, SystemClock};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format(), config.environment());
    tracing::info!("Configuration loaded and validated successfully");

    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;
    tracing::info!(backend = %config.storage_backend(), "Storage initialized");

    build_app(config, storage, Arc::new(SystemClock))
}

/// Wire services and routes on top of an already constructed storage backend.
pub fn build_app(
    config: Config,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
) -> Result<(Arc<AppState>, axum::Router)> {
    let state = services::initialize_services(config, storage, clock)?;
    let router = routes::setup_routes(&state.config, state.clone())?;
    Ok((state, router))
}
