//! FileBridge Services Layer
//!
//! This crate is the business service layer: the file registry, the two single-use token
//! managers (bridge sessions and download grants), the background token cleanup, and QR
//! rendering for bridge links. It re-exports what the API crate needs so handlers depend on a
//! single service facade. Keep coordination here; keep thin HTTP handling in filebridge-api.

pub mod bridge;
pub mod cleanup;
pub mod clock;
pub mod download;
pub mod links;
pub mod qr;
pub mod registry;
pub mod tokens;

#[cfg(test)]
mod test_support;

pub use bridge::{BridgeTarget, BridgeTokenManager};
pub use cleanup::TokenCleanupService;
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use download::{DownloadHandle, DownloadTokenManager};
pub use links::PublicLinks;
pub use qr::{PngQrRenderer, QrRenderer};
pub use registry::{FileRegistry, RegistryLimits, RegistryUsage, TranscodeOutcome};
pub use tokens::{generate_token, Reservation, TokenSnapshot, TokenStore};

pub use filebridge_processing::UploadValidator;
pub use filebridge_storage::{create_storage, ByteStream, Storage, StorageBackend, StorageError};
