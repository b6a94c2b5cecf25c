/// Validation errors for incoming uploads
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

impl From<ValidationError> for filebridge_core::AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { size, max } => filebridge_core::AppError::PayloadTooLarge(
                format!("{} bytes exceeds max {} bytes", size, max),
            ),
            ValidationError::InvalidFilename(msg) => filebridge_core::AppError::InvalidArgument(msg),
        }
    }
}

/// Longest accepted file name, in characters.
pub const MAX_FILENAME_CHARS: usize = 255;

/// Upload validator
///
/// Checks size limits and file names before bytes reach the registry. Empty files are
/// allowed; they are simply not text.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
}

impl UploadValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Validate a display name and return it trimmed.
    ///
    /// Names may contain anything printable, including path separators: they are labels, not
    /// paths, and the download boundary sanitizes them.
    pub fn validate_name(&self, name: &str) -> Result<String, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidFilename(
                "Name must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_FILENAME_CHARS {
            return Err(ValidationError::InvalidFilename(format!(
                "Name must be at most {} characters",
                MAX_FILENAME_CHARS
            )));
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidFilename(
                "Name must not contain control characters".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Validate all aspects of an upload, returning the cleaned name
    pub fn validate_all(&self, name: &str, size: u64) -> Result<String, ValidationError> {
        self.validate_file_size(size)?;
        self.validate_name(name)
    }
}
