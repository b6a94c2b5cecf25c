use crate::constants::FILE_ENCODING_HEADER;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::content_disposition;
use crate::utils::ids::token_prefix;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use filebridge_core::AppError;
use futures::StreamExt;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/dl/{token}",
    tag = "downloads",
    params(
        ("token" = String, Path, description = "Download token")
    ),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 404, description = "File no longer exists", body = ErrorResponse),
        (status = 410, description = "Token unknown, expired or already used", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, token),
    fields(token = %token_prefix(&token), operation = "redeem_download")
)]
pub async fn redeem_download(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let handle = state.downloads.redeem(&token).await?;
    let record = handle.record;

    // Wrap storage stream for axum Body
    let body_stream = handle.stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let encoding = HeaderValue::from_str(&record.encoding)
        .unwrap_or_else(|_| HeaderValue::from_static("Unknown"));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, record.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition::attachment(&record.name),
        )
        .header(header::CACHE_CONTROL, "no-store")
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .header(HeaderName::from_static(FILE_ENCODING_HEADER), encoding)
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
