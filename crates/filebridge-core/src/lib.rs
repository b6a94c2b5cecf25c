//! FileBridge Core Library
//!
//! This crate provides the domain models, error types, configuration and storage backend
//! selection shared by every FileBridge component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, FileBridgeConfig};
pub use error::{AppError, AppResult, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
