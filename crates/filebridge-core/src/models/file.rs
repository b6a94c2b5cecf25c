use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::encoding::AUTO_ENCODING;

/// Metadata for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub size_bytes: u64,
    /// Set at creation by content sniffing
    pub is_text: bool,
    /// Canonical encoding name, or "Unknown"
    pub encoding: String,
    pub created_at: DateTime<Utc>,
}

/// Request to rename a file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct RenameFileRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,
}

/// Request to rewrite a text file into another encoding
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct TranscodeRequest {
    /// "auto" or one of the supported encodings
    #[serde(default = "default_source_encoding")]
    #[validate(length(min = 1, max = 32))]
    pub source_encoding: String,
    #[validate(length(min = 1, max = 32))]
    pub target_encoding: String,
    /// When false, unrepresentable characters fail the request instead of becoming `?`
    #[serde(default = "default_allow_lossy")]
    pub allow_lossy: bool,
}

fn default_source_encoding() -> String {
    AUTO_ENCODING.to_string()
}

fn default_allow_lossy() -> bool {
    true
}

/// Result of a transcode: the updated record plus how lossy the conversion was.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranscodeResponse {
    #[serde(flatten)]
    pub file: FileRecord,
    /// Characters replaced with `?` because the target encoding cannot hold them
    pub replaced_characters: usize,
}
