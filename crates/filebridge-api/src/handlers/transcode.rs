use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::ids::parse_file_id;
use axum::{
    extract::{Path, State},
    Json,
};
use filebridge_core::models::{
    SourceEncoding, TextEncoding, TranscodeRequest, TranscodeResponse,
};
use std::sync::Arc;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v0/files/{id}/transcode",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID (UUID)")
    ),
    request_body = TranscodeRequest,
    responses(
        (status = 200, description = "File re-encoded", body = TranscodeResponse),
        (status = 400, description = "Unsupported encoding, binary file, or undecodable bytes", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 422, description = "Strict transcode hit unrepresentable characters", body = ErrorResponse),
        (status = 503, description = "Too many transcodes in progress", body = ErrorResponse),
        (status = 507, description = "Result would exceed the storage limit", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(file_id = %id, operation = "transcode_file"))]
pub async fn transcode_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<TranscodeRequest>,
) -> Result<Json<TranscodeResponse>, HttpAppError> {
    let id = parse_file_id(&id)?;
    request.validate()?;
    let source: SourceEncoding = request.source_encoding.parse()?;
    let target: TextEncoding = request.target_encoding.parse()?;

    let _permit = state.gates.transcode()?;
    let outcome = state
        .registry
        .transcode(id, source, target, request.allow_lossy)
        .await?;

    Ok(Json(TranscodeResponse {
        file: outcome.record,
        replaced_characters: outcome.replaced,
    }))
}
