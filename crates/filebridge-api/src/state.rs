//! Application state shared by every handler.

use filebridge_core::{AppError, Config};
use filebridge_services::{
    BridgeTokenManager, DownloadTokenManager, FileRegistry, PublicLinks, QrRenderer,
    TokenCleanupService,
};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Bounds on concurrent uploads and transcodes.
///
/// Gates never queue: a request that finds its gate full fails fast with `Busy`.
pub struct ConcurrencyGates {
    uploads: Semaphore,
    transcodes: Semaphore,
}

impl ConcurrencyGates {
    pub fn new(uploads: usize, transcodes: usize) -> Self {
        Self {
            uploads: Semaphore::new(uploads),
            transcodes: Semaphore::new(transcodes),
        }
    }

    pub fn upload(&self) -> Result<SemaphorePermit<'_>, AppError> {
        self.uploads
            .try_acquire()
            .map_err(|_| AppError::Busy("Too many uploads in progress".to_string()))
    }

    pub fn transcode(&self) -> Result<SemaphorePermit<'_>, AppError> {
        self.transcodes
            .try_acquire()
            .map_err(|_| AppError::Busy("Too many transcodes in progress".to_string()))
    }
}

pub struct AppState {
    pub config: Config,
    pub registry: Arc<FileRegistry>,
    pub bridge: Arc<BridgeTokenManager>,
    pub downloads: Arc<DownloadTokenManager>,
    pub links: PublicLinks,
    pub qr: Arc<dyn QrRenderer>,
    pub gates: ConcurrencyGates,
    /// Started by the binary; integration tests drive purges directly.
    pub cleanup: Arc<TokenCleanupService>,
}
