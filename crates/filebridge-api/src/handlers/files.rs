use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::ids::parse_file_id;
use crate::utils::upload::extract_multipart_file;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use filebridge_core::models::{DownloadTokenResponse, FileRecord, RenameFileRequest};
use std::sync::Arc;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/v0/files",
    tag = "files",
    responses(
        (status = 200, description = "All files, oldest first", body = Vec<FileRecord>)
    )
)]
pub async fn list_files(State(state): State<Arc<AppState>>) -> Json<Vec<FileRecord>> {
    Json(state.registry.list())
}

#[utoipa::path(
    post,
    path = "/api/v0/files",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = FileRecord),
        (status = 400, description = "Missing file or invalid name", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 503, description = "Too many uploads in progress", body = ErrorResponse),
        (status = 507, description = "Storage limits reached", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let _permit = state.gates.upload()?;
    let upload =
        extract_multipart_file(multipart, state.registry.limits().max_file_size).await?;

    let record = state.registry.create(&upload.name, upload.data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    patch,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID (UUID)")
    ),
    request_body = RenameFileRequest,
    responses(
        (status = 200, description = "File renamed", body = FileRecord),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(file_id = %id, operation = "rename_file"))]
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<RenameFileRequest>,
) -> Result<Json<FileRecord>, HttpAppError> {
    let id = parse_file_id(&id)?;
    request.validate()?;
    Ok(Json(state.registry.rename(id, &request.name)?))
}

#[utoipa::path(
    delete,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID (UUID)")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Bytes could not be deleted; the file is kept", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_id = %id, operation = "delete_file"))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpAppError> {
    let id = parse_file_id(&id)?;
    state.registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v0/files/{id}/download-token",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID (UUID)")
    ),
    responses(
        (status = 200, description = "Single-use download link", body = DownloadTokenResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_id = %id, operation = "issue_download_token"))]
pub async fn issue_download_token(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DownloadTokenResponse>, HttpAppError> {
    let id = parse_file_id(&id)?;
    let grant = state.downloads.issue_for_file(id)?;
    Ok(Json(DownloadTokenResponse {
        download_url: state.links.download_url(&grant.token),
        token: grant.token,
        expires_at: grant.expires_at,
    }))
}
