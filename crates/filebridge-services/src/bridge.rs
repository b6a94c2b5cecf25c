//! Bridge sessions: hand an upload or a download off to a second device.
//!
//! The initiating device issues a session and shows its link as a QR code. The second device
//! only knows the token. An upload session is consumed by the upload it authorizes; a download
//! session can be inspected any number of times and is consumed when it is exchanged for a
//! download grant.

use bytes::Bytes;
use chrono::Duration;
use filebridge_core::models::{BridgeKind, BridgeSession, DownloadGrant, FileRecord};
use filebridge_core::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::download::DownloadTokenManager;
use crate::registry::FileRegistry;
use crate::tokens::{TokenSnapshot, TokenStore};

/// What a session authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeTarget {
    Upload,
    /// Download of one file. The file may be deleted independently of the session.
    Download(Uuid),
}

impl BridgeTarget {
    pub fn kind(&self) -> BridgeKind {
        match self {
            BridgeTarget::Upload => BridgeKind::Upload,
            BridgeTarget::Download(_) => BridgeKind::Download,
        }
    }

    fn file_id(&self) -> Option<Uuid> {
        match self {
            BridgeTarget::Upload => None,
            BridgeTarget::Download(file_id) => Some(*file_id),
        }
    }
}

pub struct BridgeTokenManager {
    sessions: TokenStore<BridgeTarget>,
    registry: Arc<FileRegistry>,
    downloads: Arc<DownloadTokenManager>,
}

impl BridgeTokenManager {
    pub fn new(
        registry: Arc<FileRegistry>,
        downloads: Arc<DownloadTokenManager>,
        ttl: Duration,
        retention: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions: TokenStore::new(ttl, retention, clock),
            registry,
            downloads,
        }
    }

    pub fn issue_upload(&self) -> BridgeSession {
        let session = to_session(self.sessions.issue(BridgeTarget::Upload));
        tracing::info!(kind = "upload", expires_at = %session.expires_at, "Bridge session issued");
        session
    }

    /// Fails with `NotFound` if the file does not exist right now.
    pub fn issue_download(&self, file_id: Uuid) -> AppResult<BridgeSession> {
        self.registry.get(file_id)?;
        let session = to_session(self.sessions.issue(BridgeTarget::Download(file_id)));
        tracing::info!(
            kind = "download",
            file_id = %file_id,
            expires_at = %session.expires_at,
            "Bridge session issued"
        );
        Ok(session)
    }

    /// Looks up a live session of either kind without consuming it.
    pub fn session(&self, token: &str) -> AppResult<BridgeSession> {
        self.sessions.peek(token, |_| true).map(to_session)
    }

    /// Metadata of the file behind a download session. Repeatable; never consumes.
    pub fn download_info(&self, token: &str) -> AppResult<FileRecord> {
        let session = self.sessions.peek(token, is_download)?;
        match session.payload {
            BridgeTarget::Download(file_id) => self.registry.get(file_id),
            BridgeTarget::Upload => Err(AppError::TokenNotFound),
        }
    }

    /// Stores an upload made through an upload session.
    ///
    /// The session is marked consumed in the same step that makes the file visible; a failed
    /// create leaves it usable for a retry. Concurrent uploads with the same token create at
    /// most one file, and so does a caller that gives up after the file was stored.
    pub async fn consume_upload(
        &self,
        token: &str,
        name: &str,
        data: Bytes,
    ) -> AppResult<FileRecord> {
        let reservation = self.sessions.reserve(token, is_upload)?;
        let record = self
            .registry
            .create_and_then(name, data, move |_| {
                reservation.commit();
            })
            .await?;

        tracing::info!(file_id = %record.id, "Bridge upload completed");
        Ok(record)
    }

    /// Exchanges a download session for a single-use download grant, consuming the session.
    pub async fn exchange_download(&self, token: &str) -> AppResult<DownloadGrant> {
        let reservation = self.sessions.reserve(token, is_download)?;
        let file_id = match reservation.payload() {
            BridgeTarget::Download(file_id) => *file_id,
            BridgeTarget::Upload => return Err(AppError::TokenNotFound),
        };

        let grant = self.downloads.issue_for_file(file_id)?;
        reservation.commit();

        tracing::info!(file_id = %file_id, "Bridge download exchanged for grant");
        Ok(grant)
    }

    pub fn purge_expired(&self) -> usize {
        self.sessions.purge_expired()
    }
}

fn is_upload(target: &BridgeTarget) -> bool {
    matches!(target, BridgeTarget::Upload)
}

fn is_download(target: &BridgeTarget) -> bool {
    matches!(target, BridgeTarget::Download(_))
}

fn to_session(snapshot: TokenSnapshot<BridgeTarget>) -> BridgeSession {
    BridgeSession {
        token: snapshot.token,
        kind: snapshot.payload.kind(),
        target_file_id: snapshot.payload.file_id(),
        created_at: snapshot.created_at,
        expires_at: snapshot.expires_at,
        consumed: snapshot.consumed,
    }
}
