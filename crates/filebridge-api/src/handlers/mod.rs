pub mod bridge;
pub mod download;
pub mod encodings;
pub mod files;
pub mod transcode;
