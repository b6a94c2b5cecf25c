pub mod bridge;
pub mod encoding;
pub mod file;

pub use bridge::{
    BridgeDownloadRequest, BridgeKind, BridgeSession, BridgeSessionResponse, DownloadGrant,
    DownloadTokenResponse,
};
pub use encoding::{EncodingsResponse, SourceEncoding, TextEncoding, UNKNOWN_ENCODING};
pub use file::{FileRecord, RenameFileRequest, TranscodeRequest, TranscodeResponse};
