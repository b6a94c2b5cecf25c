use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::bridge::BridgeTokenManager;
use crate::download::DownloadTokenManager;

/// Periodically drops bridge sessions and download grants past their retention window.
#[derive(Clone)]
pub struct TokenCleanupService {
    bridge: Arc<BridgeTokenManager>,
    downloads: Arc<DownloadTokenManager>,
    every: Duration,
}

impl TokenCleanupService {
    pub fn new(
        bridge: Arc<BridgeTokenManager>,
        downloads: Arc<DownloadTokenManager>,
        every: Duration,
    ) -> Self {
        Self {
            bridge,
            downloads,
            every,
        }
    }

    /// Start the background cleanup task
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut cleanup_interval = interval(self.every);

            loop {
                cleanup_interval.tick().await;
                self.run_once();
            }
        })
    }

    /// Purges both token stores once, returning `(sessions, grants)` removed.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "purge_tokens"))]
    pub fn run_once(&self) -> (usize, usize) {
        let sessions = self.bridge.purge_expired();
        let grants = self.downloads.purge_expired();

        if sessions + grants > 0 {
            tracing::info!(sessions, grants, "Purged expired tokens");
        } else {
            tracing::trace!("No expired tokens to purge");
        }
        (sessions, grants)
    }
}
