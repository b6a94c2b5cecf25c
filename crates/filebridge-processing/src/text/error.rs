use filebridge_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("content is not valid {encoding} (at byte {offset})")]
    Malformed {
        encoding: &'static str,
        offset: usize,
    },

    #[error("could not detect the source encoding with enough confidence")]
    DetectionFailed,

    #[error("content is not text")]
    NotText,

    #[error("{count} character(s) cannot be represented in {encoding}")]
    Unrepresentable {
        encoding: &'static str,
        count: usize,
    },
}

impl From<TextError> for AppError {
    fn from(err: TextError) -> Self {
        match err {
            TextError::Malformed { .. } | TextError::DetectionFailed => {
                AppError::DecodeError(err.to_string())
            }
            TextError::NotText => AppError::NotText(err.to_string()),
            TextError::Unrepresentable { encoding, count } => AppError::Unrepresentable {
                encoding: encoding.to_string(),
                count,
            },
        }
    }
}
