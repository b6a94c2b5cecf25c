//! Text encoding engine.
//!
//! Supported encodings are fixed (see [`TextEncoding`]). Decoding is strict: malformed input
//! is an error, never silently replaced. Encoding is lossy: characters the target cannot hold
//! become `?` and are counted so callers can report or reject the loss.

mod codec;
mod detect;
mod error;
mod transcode;

pub use codec::{decode, encode, Decoded, Encoded};
pub use detect::{detect_encoding, sniff, Sniff, SNIFF_SAMPLE_BYTES};
pub use error::TextError;
pub use transcode::{transcode, Transcoded};

pub use filebridge_core::models::{SourceEncoding, TextEncoding};
