//! FileBridge API Library
//!
//! This crate provides the HTTP API handlers, application state and setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
