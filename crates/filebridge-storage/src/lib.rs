//! FileBridge Storage Library
//!
//! This crate provides the byte-storage abstraction behind the file registry, with an
//! in-memory backend and a local filesystem backend.
//!
//! # Storage key format
//!
//! Every stored revision of a file gets its own key: `files/{file_id}/r{revision}`. A
//! transcode writes a new revision and swaps the registry entry over to it, so readers only
//! ever see a complete set of bytes. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use filebridge_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
