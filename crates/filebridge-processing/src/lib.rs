//! FileBridge Processing Library
//!
//! Content-level work on uploaded files: text encoding detection and transcoding, and
//! validation of incoming uploads.

pub mod text;
pub mod validator;

pub use text::{
    decode, detect_encoding, encode, sniff, transcode, Decoded, Encoded, Sniff, TextError,
    Transcoded,
};
pub use validator::{UploadValidator, ValidationError};
