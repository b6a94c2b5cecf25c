//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use filebridge_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FileBridge API",
        version = "0.1.0",
        description = "Personal file collection with text re-encoding and QR-code bridges for moving files to and from a second device. All endpoints are versioned under /api/v0/; single-use download links live under /dl/."
    ),
    paths(
        // Files
        handlers::files::list_files,
        handlers::files::upload_file,
        handlers::files::rename_file,
        handlers::files::delete_file,
        handlers::files::issue_download_token,
        handlers::transcode::transcode_file,
        handlers::encodings::list_encodings,
        // Bridge
        handlers::bridge::issue_upload_bridge,
        handlers::bridge::issue_download_bridge,
        handlers::bridge::download_info,
        handlers::bridge::bridge_upload,
        handlers::bridge::exchange_download_token,
        handlers::bridge::bridge_qrcode,
        // Downloads
        handlers::download::redeem_download,
    ),
    components(
        schemas(
            models::FileRecord,
            models::RenameFileRequest,
            models::TranscodeRequest,
            models::TranscodeResponse,
            models::EncodingsResponse,
            models::BridgeKind,
            models::BridgeDownloadRequest,
            models::BridgeSessionResponse,
            models::DownloadTokenResponse,
            // Error
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "files", description = "File listing, upload, rename, delete and transcode"),
        (name = "encodings", description = "Supported text encodings"),
        (name = "bridge", description = "QR-code sessions handing an upload or download to a second device"),
        (name = "downloads", description = "Single-use download links")
    )
)]
pub struct ApiDoc;
