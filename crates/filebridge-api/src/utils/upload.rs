//! Multipart upload extraction

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use filebridge_core::AppError;

use crate::constants::{FILE_FIELD, NAME_FIELD};

fn multipart_error(e: MultipartError, what: &str) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", e.body_text()))
    } else {
        AppError::InvalidArgument(format!("Failed to read {}: {}", what, e.body_text()))
    }
}

/// An uploaded file read fully into memory
#[derive(Debug)]
pub struct UploadedFile {
    pub name: String,
    pub data: Bytes,
}

/// Extract the file from a multipart form, reading at most `max_size` bytes of it.
///
/// Exactly one field named "file" is accepted. An optional "name" text field overrides the
/// file name sent by the client.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
    max_size: u64,
) -> Result<UploadedFile, AppError> {
    let mut file: Option<(Option<String>, Bytes)> = None;
    let mut name_override: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "multipart"))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == FILE_FIELD {
            if file.is_some() {
                return Err(AppError::InvalidArgument(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let filename = field.file_name().map(|s| s.to_string());

            let mut data = BytesMut::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| multipart_error(e, "file data"))?
            {
                if (data.len() + chunk.len()) as u64 > max_size {
                    return Err(AppError::PayloadTooLarge(format!(
                        "File exceeds maximum allowed size of {} bytes",
                        max_size
                    )));
                }
                data.extend_from_slice(&chunk);
            }
            file = Some((filename, data.freeze()));
        } else if field_name == NAME_FIELD {
            let text = field
                .text()
                .await
                .map_err(|e| multipart_error(e, "name"))?;
            name_override = Some(text);
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::InvalidArgument("No file provided".to_string()))?;
    let name = name_override
        .or(filename)
        .ok_or_else(|| AppError::InvalidArgument("File name is required".to_string()))?;

    Ok(UploadedFile { name, data })
}
