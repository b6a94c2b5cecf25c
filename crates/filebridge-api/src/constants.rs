//! API constants
//!
//! Routes and OpenAPI paths are versioned under [`API_PREFIX`].

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

pub const API_VERSION: &str = "v0";

/// Versioned API prefix
pub const API_PREFIX: &str = "/api/v0";

/// Single-use download links live outside the API prefix so they read well in a browser.
pub const DOWNLOAD_PREFIX: &str = "/dl";

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Optional multipart text field overriding the uploaded file name
pub const NAME_FIELD: &str = "name";

/// Headroom over the maximum file size for multipart framing
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Header carrying the stored encoding of a downloaded file
pub const FILE_ENCODING_HEADER: &str = "x-file-encoding";

/// Seconds clients are told to wait when a concurrency gate is full
pub const BUSY_RETRY_AFTER_SECS: u64 = 2;

/// Relative URL of the QR code for a bridge session.
pub fn qr_path(token: &str) -> String {
    format!("{}/bridge/{}/qrcode", API_PREFIX, token)
}
