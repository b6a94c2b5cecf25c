//! Error types module
//!
//! Every failure a FileBridge operation can report is a variant of `AppError`. Each variant
//! describes its own HTTP presentation through the `ErrorMetadata` trait so the HTTP layer
//! never has to special-case domain errors.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like capacity limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TOKEN_EXPIRED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token already consumed")]
    TokenAlreadyConsumed,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Not a text file: {0}")]
    NotText(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("{count} character(s) cannot be represented in {encoding}")]
    Unrepresentable { encoding: String, count: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Insufficient storage: {available} bytes available, {required} bytes required")]
    InsufficientStorage { available: u64, required: u64 },

    #[error("File limit reached: at most {max_files} files can be stored")]
    FileLimitReached { max_files: usize },

    #[error("Server busy: {0}")]
    Busy(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result alias used by the registry and token managers.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidArgument(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidArgument(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the file ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::TokenNotFound => (
            410,
            "TOKEN_NOT_FOUND",
            false,
            Some("Request a new link or QR code"),
            false,
            LogLevel::Debug,
        ),
        AppError::TokenExpired => (
            410,
            "TOKEN_EXPIRED",
            false,
            Some("Request a new link or QR code"),
            false,
            LogLevel::Debug,
        ),
        AppError::TokenAlreadyConsumed => (
            410,
            "TOKEN_ALREADY_CONSUMED",
            false,
            Some("Each link works once; request a new one"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidArgument(_) => (
            400,
            "INVALID_ARGUMENT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedEncoding(_) => (
            400,
            "UNSUPPORTED_ENCODING",
            false,
            Some("Use one of the encodings listed by GET /api/v0/encodings"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotText(_) => (
            400,
            "NOT_TEXT",
            false,
            Some("Only text files can be transcoded"),
            false,
            LogLevel::Debug,
        ),
        AppError::DecodeError(_) => (
            400,
            "DECODE_ERROR",
            false,
            Some("Declare the source encoding explicitly instead of auto"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unrepresentable { .. } => (
            422,
            "UNREPRESENTABLE",
            false,
            Some("Pick a wider target encoding or allow lossy transcoding"),
            false,
            LogLevel::Debug,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::InsufficientStorage { .. } | AppError::FileLimitReached { .. } => (
            507,
            "INSUFFICIENT_STORAGE",
            true,
            Some("Delete some files and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Busy(_) => (
            503,
            "BUSY",
            true,
            Some("Wait a few seconds and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::TokenNotFound => "TokenNotFound",
            AppError::TokenExpired => "TokenExpired",
            AppError::TokenAlreadyConsumed => "TokenAlreadyConsumed",
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::UnsupportedEncoding(_) => "UnsupportedEncoding",
            AppError::NotText(_) => "NotText",
            AppError::DecodeError(_) => "DecodeError",
            AppError::Unrepresentable { .. } => "Unrepresentable",
            AppError::Storage(_) => "Storage",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::InsufficientStorage { .. } => "InsufficientStorage",
            AppError::FileLimitReached { .. } => "FileLimitReached",
            AppError::Busy(_) => "Busy",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// True for the three token failure kinds.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AppError::TokenNotFound | AppError::TokenExpired | AppError::TokenAlreadyConsumed
        )
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::TokenNotFound => "Token not found".to_string(),
            AppError::TokenExpired => "Token expired".to_string(),
            AppError::TokenAlreadyConsumed => "Token already used".to_string(),
            AppError::InvalidArgument(ref msg) => msg.clone(),
            AppError::UnsupportedEncoding(ref name) => {
                format!("Unsupported encoding: {}", name)
            }
            AppError::NotText(ref msg) => msg.clone(),
            AppError::DecodeError(ref msg) => msg.clone(),
            AppError::Unrepresentable { encoding, count } => format!(
                "{} character(s) cannot be represented in {}",
                count, encoding
            ),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::InsufficientStorage {
                available,
                required,
            } => format!(
                "Insufficient storage: {} bytes available, {} bytes required",
                available, required
            ),
            AppError::FileLimitReached { max_files } => {
                format!("File limit reached: at most {} files can be stored", max_files)
            }
            AppError::Busy(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
