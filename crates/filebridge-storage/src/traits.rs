//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use filebridge_core::AppError;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked byte stream returned by [`Storage::download_stream`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// The registry owns key assignment; backends only move bytes. Writing to an existing key
/// replaces it. Deleting a missing key succeeds.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `storage_key`
    async fn upload_with_key(&self, storage_key: &str, data: Bytes) -> StorageResult<()>;

    /// Read the whole object
    async fn download(&self, storage_key: &str) -> StorageResult<Bytes>;

    /// Read the object as a stream of chunks
    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Delete an object
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Size of an object in bytes
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                AppError::Storage(format!("stored bytes missing for key {}", key))
            }
            StorageError::InvalidKey(msg) => AppError::Internal(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_map_to_storage_kind() {
        let err: AppError = StorageError::DeleteFailed("disk gone".to_string()).into();
        assert!(matches!(err, AppError::Storage(msg) if msg.contains("disk gone")));
    }

    #[test]
    fn io_errors_map_to_storage_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = StorageError::IoError(io_err).into();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn invalid_key_is_internal() {
        let err: AppError = StorageError::InvalidKey("../x".to_string()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
