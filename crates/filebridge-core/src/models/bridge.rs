//! Bridge sessions and download grants.
//!
//! Both are single-use bearer tokens. A bridge session links an intent started on one device
//! to a request made by a second device that only knows the token. A download grant authorizes
//! exactly one direct download without exposing the file id in the link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// What a bridge session hands off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BridgeKind {
    /// A second device uploads a new file into the collection
    Upload,
    /// A second device downloads one existing file
    Download,
}

impl BridgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeKind::Upload => "upload",
            BridgeKind::Download => "download",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSession {
    pub token: String,
    pub kind: BridgeKind,
    /// Only set for download sessions. Lookup only; the file may be deleted independently.
    pub target_file_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadGrant {
    pub token: String,
    pub file_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

/// Request to hand a file off to a second device
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BridgeDownloadRequest {
    pub file_id: Uuid,
}

/// An issued bridge session, as shown to the initiating device
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BridgeSessionResponse {
    pub token: String,
    pub kind: BridgeKind,
    /// Absolute URL the second device opens (encoded in the QR code)
    pub display_url: String,
    /// URL of the PNG QR code for `display_url`
    pub qr_url: String,
    pub expires_at: DateTime<Utc>,
}

/// An issued download grant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadTokenResponse {
    pub token: String,
    /// Absolute single-use URL that streams the file
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
}
