//! File registry.
//!
//! The registry owns file metadata and decides where each file's bytes live. Metadata sits in
//! memory behind a single lock; bytes go through the [`Storage`] backend. The lock only ever
//! covers metadata transitions, and no storage call is made while it is held.
//!
//! Each stored version of a file gets its own key (`files/{id}/r{revision}`). A transcode
//! writes the converted bytes under a new revision, swaps the entry over in one locked step and
//! only then deletes the previous revision, so readers never see a half-written file.
//!
//! A delete first marks the entry as deleting, which hides it from every lookup, then removes
//! the bytes and finally the entry. A failed byte delete clears the mark again.

use bytes::Bytes;
use filebridge_core::models::{FileRecord, SourceEncoding, TextEncoding};
use filebridge_core::{AppError, AppResult, Config};
use filebridge_processing::{sniff, transcode, UploadValidator};
use filebridge_storage::keys::file_key;
use filebridge_storage::{ByteStream, Storage, StorageError};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::clock::Clock;

/// Capacity limits enforced on create and transcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryLimits {
    pub max_file_size: u64,
    pub max_files: usize,
    pub max_total_bytes: u64,
    /// Make room by evicting the oldest files instead of rejecting new ones
    pub evict_oldest: bool,
}

impl RegistryLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes(),
            max_files: config.max_files(),
            max_total_bytes: config.max_total_size_bytes(),
            evict_oldest: config.evict_oldest(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryUsage {
    pub files: usize,
    pub total_bytes: u64,
}

/// Result of a successful transcode
#[derive(Debug, Clone)]
pub struct TranscodeOutcome {
    pub record: FileRecord,
    /// Characters replaced with `?` because the target encoding cannot represent them
    pub replaced: usize,
}

struct Entry {
    record: FileRecord,
    storage_key: String,
    deleting: bool,
}

#[derive(Default)]
struct Index {
    entries: HashMap<Uuid, Entry>,
    /// Insertion order, oldest first
    order: VecDeque<Uuid>,
    total_bytes: u64,
}

impl Index {
    fn live(&self, id: Uuid) -> Option<&Entry> {
        self.entries.get(&id).filter(|entry| !entry.deleting)
    }

    fn live_mut(&mut self, id: Uuid) -> Option<&mut Entry> {
        self.entries.get_mut(&id).filter(|entry| !entry.deleting)
    }

    fn insert(&mut self, entry: Entry) {
        self.total_bytes += entry.record.size_bytes;
        self.order.push_back(entry.record.id);
        self.entries.insert(entry.record.id, entry);
    }

    fn remove(&mut self, id: Uuid) -> Option<Entry> {
        let entry = self.entries.remove(&id)?;
        self.order.retain(|other| *other != id);
        self.total_bytes = self.total_bytes.saturating_sub(entry.record.size_bytes);
        Some(entry)
    }

    fn pop_oldest(&mut self) -> Option<Entry> {
        while let Some(id) = self.order.pop_front() {
            if let Some(entry) = self.entries.remove(&id) {
                self.total_bytes = self.total_bytes.saturating_sub(entry.record.size_bytes);
                return Some(entry);
            }
        }
        None
    }

    /// Makes room for one more file of `size` bytes, returning whatever had to be evicted.
    fn admit(&mut self, size: u64, limits: &RegistryLimits) -> AppResult<Vec<Entry>> {
        if size > limits.max_total_bytes {
            return Err(AppError::InsufficientStorage {
                available: limits.max_total_bytes,
                required: size,
            });
        }

        let mut evicted = Vec::new();
        loop {
            let over_count = self.entries.len() >= limits.max_files;
            let over_bytes = self.total_bytes + size > limits.max_total_bytes;
            if !over_count && !over_bytes {
                return Ok(evicted);
            }
            if !limits.evict_oldest {
                return Err(if over_count {
                    AppError::FileLimitReached {
                        max_files: limits.max_files,
                    }
                } else {
                    AppError::InsufficientStorage {
                        available: limits.max_total_bytes.saturating_sub(self.total_bytes),
                        required: size,
                    }
                });
            }
            match self.pop_oldest() {
                Some(entry) => evicted.push(entry),
                None => {
                    return Err(AppError::FileLimitReached {
                        max_files: limits.max_files,
                    })
                }
            }
        }
    }
}

pub struct FileRegistry {
    storage: Arc<dyn Storage>,
    index: RwLock<Index>,
    limits: RegistryLimits,
    validator: UploadValidator,
    next_revision: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl FileRegistry {
    pub fn new(storage: Arc<dyn Storage>, limits: RegistryLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            index: RwLock::new(Index::default()),
            limits,
            validator: UploadValidator::new(limits.max_file_size),
            next_revision: AtomicU64::new(0),
            clock,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn limits(&self) -> &RegistryLimits {
        &self.limits
    }

    pub fn usage(&self) -> RegistryUsage {
        let index = self.index.read();
        RegistryUsage {
            files: index.entries.len(),
            total_bytes: index.total_bytes,
        }
    }

    /// All files, oldest first.
    pub fn list(&self) -> Vec<FileRecord> {
        let index = self.index.read();
        index
            .order
            .iter()
            .filter_map(|id| index.live(*id))
            .map(|entry| entry.record.clone())
            .collect()
    }

    pub fn get(&self, id: Uuid) -> AppResult<FileRecord> {
        self.index
            .read()
            .live(id)
            .map(|entry| entry.record.clone())
            .ok_or_else(|| not_found(id))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.read().live(id).is_some()
    }

    /// Stores `data` as a new file, sniffing whether it is text and in which encoding.
    pub async fn create(&self, name: &str, data: Bytes) -> AppResult<FileRecord> {
        self.create_and_then(name, data, |_| {}).await
    }

    /// Like [`create`](Self::create), but runs `on_insert` in the same locked step that makes
    /// the new file visible.
    ///
    /// `on_insert` runs if and only if the file was inserted, before any eviction cleanup is
    /// awaited. On failure it is dropped without running.
    #[tracing::instrument(skip(self, data, on_insert), fields(size_bytes = data.len()))]
    pub async fn create_and_then<F>(
        &self,
        name: &str,
        data: Bytes,
        on_insert: F,
    ) -> AppResult<FileRecord>
    where
        F: FnOnce(&FileRecord) + Send,
    {
        let start = Instant::now();
        let size = data.len() as u64;
        let name = self.validator.validate_all(name, size)?;
        if size > self.limits.max_total_bytes {
            return Err(AppError::InsufficientStorage {
                available: self.limits.max_total_bytes,
                required: size,
            });
        }

        let sniffed = sniff(&data);
        let id = Uuid::new_v4();
        let storage_key = file_key(id, self.next_revision());
        self.storage.upload_with_key(&storage_key, data).await?;

        let admitted = {
            let mut index = self.index.write();
            match index.admit(size, &self.limits) {
                Ok(evicted) => {
                    let record = FileRecord {
                        id,
                        name,
                        size_bytes: size,
                        is_text: sniffed.is_text,
                        encoding: sniffed.encoding_label().to_string(),
                        created_at: self.clock.now(),
                    };
                    index.insert(Entry {
                        record: record.clone(),
                        storage_key,
                        deleting: false,
                    });
                    on_insert(&record);
                    Ok((record, evicted))
                }
                Err(e) => Err((e, storage_key)),
            }
        };

        let (record, evicted) = match admitted {
            Ok(admitted) => admitted,
            Err((e, storage_key)) => {
                self.discard(&storage_key).await;
                return Err(e);
            }
        };

        for entry in &evicted {
            tracing::info!(
                file_id = %entry.record.id,
                size_bytes = entry.record.size_bytes,
                "Evicting oldest file to make room"
            );
            self.discard(&entry.storage_key).await;
        }

        tracing::info!(
            file_id = %record.id,
            is_text = record.is_text,
            encoding = %record.encoding,
            evicted = evicted.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File created"
        );
        Ok(record)
    }

    /// Renames a file. Renaming to the current name returns the record unchanged.
    pub fn rename(&self, id: Uuid, new_name: &str) -> AppResult<FileRecord> {
        let name = self.validator.validate_name(new_name)?;

        let mut index = self.index.write();
        let entry = index.live_mut(id).ok_or_else(|| not_found(id))?;
        if entry.record.name != name {
            tracing::info!(file_id = %id, "File renamed");
            entry.record.name = name;
        }
        Ok(entry.record.clone())
    }

    /// Deletes the file's bytes, then its entry. A failed byte delete leaves the entry intact.
    ///
    /// The file is reported as not found from the moment the delete starts.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mark = {
            let mut index = self.index.write();
            let entry = index.live_mut(id).ok_or_else(|| not_found(id))?;
            entry.deleting = true;
            DeleteMark {
                index: &self.index,
                id,
                storage_key: entry.storage_key.clone(),
                done: false,
            }
        };

        self.storage.delete(&mark.storage_key).await?;

        match mark.finish() {
            Some(_) => tracing::info!(file_id = %id, "File deleted"),
            None => tracing::debug!(file_id = %id, "File evicted while being deleted"),
        }
        Ok(())
    }

    /// Re-encodes a text file into `target`.
    ///
    /// Fails with `Unrepresentable` when `allow_lossy` is false and some character cannot be
    /// expressed in the target; nothing is written in that case.
    #[tracing::instrument(skip(self))]
    pub async fn transcode(
        &self,
        id: Uuid,
        source: SourceEncoding,
        target: TextEncoding,
        allow_lossy: bool,
    ) -> AppResult<TranscodeOutcome> {
        let start = Instant::now();
        let (record, storage_key) = self.snapshot(id)?;
        if !record.is_text {
            return Err(AppError::NotText(format!(
                "File {} is not a text file",
                record.id
            )));
        }

        let data = match self.storage.download(&storage_key).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) if !self.contains(id) => return Err(not_found(id)),
            Err(e) => return Err(e.into()),
        };
        let converted =
            tokio::task::spawn_blocking(move || transcode(&data, source, target, allow_lossy))
                .await
                .map_err(|e| AppError::Internal(format!("Transcode task failed: {}", e)))??;

        let new_size = converted.bytes.len() as u64;
        let new_key = file_key(id, self.next_revision());
        self.storage
            .upload_with_key(&new_key, Bytes::from(converted.bytes))
            .await?;

        let swapped = {
            let mut index = self.index.write();
            let Index {
                entries,
                total_bytes,
                ..
            } = &mut *index;
            match entries.get_mut(&id).filter(|entry| !entry.deleting) {
                None => Err(not_found(id)),
                Some(entry) => {
                    let others = total_bytes.saturating_sub(entry.record.size_bytes);
                    let new_total = others.saturating_add(new_size);
                    if new_total > self.limits.max_total_bytes {
                        Err(AppError::InsufficientStorage {
                            available: self.limits.max_total_bytes.saturating_sub(others),
                            required: new_size,
                        })
                    } else {
                        *total_bytes = new_total;
                        entry.record.size_bytes = new_size;
                        entry.record.encoding = target.as_str().to_string();
                        let old_key = std::mem::replace(&mut entry.storage_key, new_key.clone());
                        Ok((entry.record.clone(), old_key))
                    }
                }
            }
        };

        match swapped {
            Ok((record, old_key)) => {
                self.discard(&old_key).await;
                tracing::info!(
                    file_id = %id,
                    detected_source = %converted.source,
                    size_bytes = new_size,
                    replaced = converted.replaced,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "File transcoded"
                );
                Ok(TranscodeOutcome {
                    record,
                    replaced: converted.replaced,
                })
            }
            Err(e) => {
                self.discard(&new_key).await;
                Err(e)
            }
        }
    }

    /// Opens the current bytes of a file as a stream.
    pub async fn open(&self, id: Uuid) -> AppResult<(FileRecord, ByteStream)> {
        let (record, storage_key) = self.snapshot(id)?;
        match self.storage.download_stream(&storage_key).await {
            Ok(stream) => Ok((record, stream)),
            Err(StorageError::NotFound(_)) if !self.contains(id) => Err(not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    fn snapshot(&self, id: Uuid) -> AppResult<(FileRecord, String)> {
        self.index
            .read()
            .live(id)
            .map(|entry| (entry.record.clone(), entry.storage_key.clone()))
            .ok_or_else(|| not_found(id))
    }

    #[cfg(test)]
    fn storage_key(&self, id: Uuid) -> AppResult<String> {
        self.snapshot(id).map(|(_, key)| key)
    }

    fn next_revision(&self) -> u64 {
        self.next_revision.fetch_add(1, Ordering::Relaxed)
    }

    /// Best-effort delete of bytes no entry points at any more.
    async fn discard(&self, storage_key: &str) {
        if let Err(e) = self.storage.delete(storage_key).await {
            tracing::warn!(
                error = %e,
                storage_key = %storage_key,
                "Failed to delete unreferenced bytes"
            );
        }
    }
}

/// An entry hidden for deletion. Dropping the mark unfinished makes the entry visible again.
struct DeleteMark<'a> {
    index: &'a RwLock<Index>,
    id: Uuid,
    storage_key: String,
    done: bool,
}

impl DeleteMark<'_> {
    /// Removes the entry, returning it unless an eviction got there first.
    fn finish(mut self) -> Option<Entry> {
        self.done = true;
        self.index.write().remove(self.id)
    }
}

impl Drop for DeleteMark<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(entry) = self.index.write().entries.get_mut(&self.id) {
            entry.deleting = false;
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("File {} not found", id))
}
