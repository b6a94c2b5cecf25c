//! Storage wrapper for exercising slow and failing backends.

use async_trait::async_trait;
use bytes::Bytes;
use filebridge_storage::{
    ByteStream, MemoryStorage, Storage, StorageBackend, StorageError, StorageResult,
};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct ScriptedStorage {
    inner: MemoryStorage,
    download_delay: Option<Duration>,
    delete_delay: Option<Duration>,
    fail_deletes: bool,
}

impl ScriptedStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reads sleep before touching the stored bytes.
    pub(crate) fn slow_downloads(mut self, delay: Duration) -> Self {
        self.download_delay = Some(delay);
        self
    }

    pub(crate) fn slow_deletes(mut self, delay: Duration) -> Self {
        self.delete_delay = Some(delay);
        self
    }

    pub(crate) fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    async fn upload_with_key(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.inner.upload_with_key(key, data).await
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        Self::pause(self.download_delay).await;
        self.inner.download(key).await
    }

    async fn download_stream(&self, key: &str) -> StorageResult<ByteStream> {
        Self::pause(self.download_delay).await;
        self.inner.download_stream(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        Self::pause(self.delete_delay).await;
        if self.fail_deletes {
            return Err(StorageError::DeleteFailed(format!("refusing to delete {}", key)));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn content_length(&self, key: &str) -> StorageResult<u64> {
        self.inner.content_length(key).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
