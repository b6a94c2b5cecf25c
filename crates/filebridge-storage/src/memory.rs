use crate::keys::is_valid_key;
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Chunk size used when streaming an in-memory object.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Process-local storage backed by a map of immutable buffers.
///
/// Contents are lost on restart. Cloning a stored `Bytes` is cheap, so readers never hold the
/// lock while data is being sent.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_key(storage_key: &str) -> StorageResult<()> {
        if is_valid_key(storage_key) {
            Ok(())
        } else {
            Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ))
        }
    }

    async fn get(&self, storage_key: &str) -> StorageResult<Bytes> {
        Self::check_key(storage_key)?;
        self.objects
            .read()
            .await
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_with_key(&self, storage_key: &str, data: Bytes) -> StorageResult<()> {
        Self::check_key(storage_key)?;
        let size = data.len();
        self.objects
            .write()
            .await
            .insert(storage_key.to_string(), data);
        tracing::debug!(key = %storage_key, size_bytes = size, "Memory storage upload");
        Ok(())
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        self.get(storage_key).await
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let data = self.get(storage_key).await?;
        let chunks: Vec<Result<Bytes, StorageError>> = (0..data.len())
            .step_by(STREAM_CHUNK_SIZE)
            .map(|start| {
                let end = (start + STREAM_CHUNK_SIZE).min(data.len());
                Ok(data.slice(start..end))
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        Self::check_key(storage_key)?;
        self.objects.write().await.remove(storage_key);
        tracing::debug!(key = %storage_key, "Memory storage delete");
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Self::check_key(storage_key)?;
        Ok(self.objects.read().await.contains_key(storage_key))
    }

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        Ok(self.get(storage_key).await?.len() as u64)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
