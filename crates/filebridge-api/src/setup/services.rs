//! Service construction

use crate::state::{AppState, ConcurrencyGates};
use anyhow::{Context, Result};
use filebridge_core::Config;
use filebridge_services::{
    BridgeTokenManager, Clock, DownloadTokenManager, FileRegistry, PngQrRenderer, PublicLinks,
    RegistryLimits, Storage, TokenCleanupService,
};
use std::sync::Arc;

fn ttl(value: std::time::Duration, name: &str) -> Result<chrono::Duration> {
    chrono::Duration::from_std(value).with_context(|| format!("{} is out of range", name))
}

pub fn initialize_services(
    config: Config,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
) -> Result<Arc<AppState>> {
    let limits = RegistryLimits::from_config(&config);
    let registry = Arc::new(FileRegistry::new(storage, limits, clock.clone()));
    tracing::info!(
        max_file_size = limits.max_file_size,
        max_files = limits.max_files,
        max_total_bytes = limits.max_total_bytes,
        evict_oldest = limits.evict_oldest,
        "File registry initialized"
    );

    let retention = ttl(config.token_retention(), "TOKEN_RETENTION_SECONDS")?;

    let downloads = Arc::new(DownloadTokenManager::new(
        registry.clone(),
        ttl(config.download_ttl(), "DOWNLOAD_TTL_SECONDS")?,
        retention,
        clock.clone(),
    ));

    let bridge = Arc::new(BridgeTokenManager::new(
        registry.clone(),
        downloads.clone(),
        ttl(config.bridge_ttl(), "BRIDGE_TTL_SECONDS")?,
        retention,
        clock,
    ));

    let cleanup = Arc::new(TokenCleanupService::new(
        bridge.clone(),
        downloads.clone(),
        config.token_cleanup_interval(),
    ));

    let gates = ConcurrencyGates::new(config.upload_concurrency(), config.transcode_concurrency());
    let links = PublicLinks::new(config.base_url());
    tracing::info!(base_url = %links.base_url(), "Public links configured");

    Ok(Arc::new(AppState {
        config,
        registry,
        bridge,
        downloads,
        links,
        qr: Arc::new(PngQrRenderer::default()),
        gates,
        cleanup,
    }))
}
