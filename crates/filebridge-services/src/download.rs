//! Download grants: short-lived single-use links that stream one file.

use chrono::Duration;
use filebridge_core::models::{DownloadGrant, FileRecord};
use filebridge_core::AppResult;
use filebridge_storage::ByteStream;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::registry::FileRegistry;
use crate::tokens::{TokenSnapshot, TokenStore};

/// A redeemed grant: the file's metadata and its bytes.
pub struct DownloadHandle {
    pub record: FileRecord,
    pub stream: ByteStream,
}

pub struct DownloadTokenManager {
    grants: TokenStore<Uuid>,
    registry: Arc<FileRegistry>,
}

impl DownloadTokenManager {
    pub fn new(
        registry: Arc<FileRegistry>,
        ttl: Duration,
        retention: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            grants: TokenStore::new(ttl, retention, clock),
            registry,
        }
    }

    /// Issues a grant for an existing file.
    pub fn issue_for_file(&self, file_id: Uuid) -> AppResult<DownloadGrant> {
        self.registry.get(file_id)?;
        let grant = to_grant(self.grants.issue(file_id));
        tracing::info!(file_id = %file_id, expires_at = %grant.expires_at, "Download grant issued");
        Ok(grant)
    }

    /// Consumes a grant and opens the file it points at.
    ///
    /// The grant is only marked consumed once the stream is open. If the file has been
    /// deleted in the meantime the result is `NotFound`.
    pub async fn redeem(&self, token: &str) -> AppResult<DownloadHandle> {
        let reservation = self.grants.reserve(token, |_| true)?;
        let file_id = *reservation.payload();

        let (record, stream) = self.registry.open(file_id).await?;
        reservation.commit();

        tracing::info!(file_id = %file_id, size_bytes = record.size_bytes, "Download grant redeemed");
        Ok(DownloadHandle { record, stream })
    }

    pub fn purge_expired(&self) -> usize {
        self.grants.purge_expired()
    }
}

fn to_grant(snapshot: TokenSnapshot<Uuid>) -> DownloadGrant {
    DownloadGrant {
        token: snapshot.token,
        file_id: snapshot.payload,
        created_at: snapshot.created_at,
        expires_at: snapshot.expires_at,
        consumed: snapshot.consumed,
    }
}
