//! Bridge endpoints.
//!
//! The initiating device calls the `POST /bridge/upload` and `POST /bridge/download` issuers
//! and renders the QR code. The second device only ever presents the token: it inspects a
//! download session, uploads through an upload session, or exchanges a download session for a
//! single-use download link.

use crate::constants::qr_path;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::ids::token_prefix;
use crate::utils::upload::extract_multipart_file;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use filebridge_core::models::{
    BridgeDownloadRequest, BridgeSession, BridgeSessionResponse, DownloadTokenResponse,
    FileRecord,
};
use std::sync::Arc;

fn session_response(state: &AppState, session: BridgeSession) -> BridgeSessionResponse {
    BridgeSessionResponse {
        display_url: state.links.display_url(session.kind, &session.token),
        qr_url: qr_path(&session.token),
        kind: session.kind,
        token: session.token,
        expires_at: session.expires_at,
    }
}

#[utoipa::path(
    post,
    path = "/api/v0/bridge/upload",
    tag = "bridge",
    responses(
        (status = 201, description = "Upload session issued", body = BridgeSessionResponse)
    )
)]
pub async fn issue_upload_bridge(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.bridge.issue_upload();
    (StatusCode::CREATED, Json(session_response(&state, session)))
}

#[utoipa::path(
    post,
    path = "/api/v0/bridge/download",
    tag = "bridge",
    request_body = BridgeDownloadRequest,
    responses(
        (status = 201, description = "Download session issued", body = BridgeSessionResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(file_id = %request.file_id, operation = "issue_download_bridge")
)]
pub async fn issue_download_bridge(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<BridgeDownloadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session = state.bridge.issue_download(request.file_id)?;
    Ok((StatusCode::CREATED, Json(session_response(&state, session))))
}

#[utoipa::path(
    get,
    path = "/api/v0/bridge/{token}/download-info",
    tag = "bridge",
    params(
        ("token" = String, Path, description = "Bridge token")
    ),
    responses(
        (status = 200, description = "Metadata of the file behind the session", body = FileRecord),
        (status = 404, description = "File no longer exists", body = ErrorResponse),
        (status = 410, description = "Token unknown, expired or already used", body = ErrorResponse)
    )
)]
pub async fn download_info(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<FileRecord>, HttpAppError> {
    Ok(Json(state.bridge.download_info(&token)?))
}

#[utoipa::path(
    post,
    path = "/api/v0/bridge/{token}/upload",
    tag = "bridge",
    params(
        ("token" = String, Path, description = "Bridge token")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored; the session is consumed", body = FileRecord),
        (status = 400, description = "Missing file or invalid name", body = ErrorResponse),
        (status = 410, description = "Token unknown, expired or already used", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 503, description = "Too many uploads in progress", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, token, multipart),
    fields(token = %token_prefix(&token), operation = "bridge_upload")
)]
pub async fn bridge_upload(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    // Dead tokens fail before the body is read.
    state.bridge.session(&token)?;

    let _permit = state.gates.upload()?;
    let upload =
        extract_multipart_file(multipart, state.registry.limits().max_file_size).await?;

    let record = state
        .bridge
        .consume_upload(&token, &upload.name, upload.data)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    post,
    path = "/api/v0/bridge/{token}/download-token",
    tag = "bridge",
    params(
        ("token" = String, Path, description = "Bridge token")
    ),
    responses(
        (status = 200, description = "Single-use download link; the session is consumed", body = DownloadTokenResponse),
        (status = 404, description = "File no longer exists", body = ErrorResponse),
        (status = 410, description = "Token unknown, expired or already used", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, token),
    fields(token = %token_prefix(&token), operation = "exchange_bridge_download")
)]
pub async fn exchange_download_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<DownloadTokenResponse>, HttpAppError> {
    let grant = state.bridge.exchange_download(&token).await?;
    Ok(Json(DownloadTokenResponse {
        download_url: state.links.download_url(&grant.token),
        token: grant.token,
        expires_at: grant.expires_at,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v0/bridge/{token}/qrcode",
    tag = "bridge",
    params(
        ("token" = String, Path, description = "Bridge token")
    ),
    responses(
        (status = 200, description = "QR code of the session's display URL", content_type = "image/png"),
        (status = 410, description = "Token unknown, expired or already used", body = ErrorResponse)
    )
)]
pub async fn bridge_qrcode(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session = state.bridge.session(&token)?;
    let display_url = state.links.display_url(session.kind, &session.token);
    let image = state.qr.render(&display_url)?;

    Ok((
        [
            (header::CONTENT_TYPE, state.qr.content_type()),
            (header::CACHE_CONTROL, "no-store"),
        ],
        image,
    ))
}
