//! Route groups for files, bridge sessions and download links.

use crate::constants::{API_PREFIX, DOWNLOAD_PREFIX};
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;

pub fn file_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/files", API_PREFIX),
            get(handlers::files::list_files).post(handlers::files::upload_file),
        )
        .route(
            &format!("{}/files/{{id}}", API_PREFIX),
            patch(handlers::files::rename_file)
                .delete(handlers::files::delete_file),
        )
        .route(
            &format!("{}/files/{{id}}/transcode", API_PREFIX),
            post(handlers::transcode::transcode_file),
        )
        .route(
            &format!("{}/files/{{id}}/download-token", API_PREFIX),
            post(handlers::files::issue_download_token),
        )
        .route(
            &format!("{}/encodings", API_PREFIX),
            get(handlers::encodings::list_encodings),
        )
        .with_state(state)
}

pub fn bridge_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/bridge/upload", API_PREFIX),
            post(handlers::bridge::issue_upload_bridge),
        )
        .route(
            &format!("{}/bridge/download", API_PREFIX),
            post(handlers::bridge::issue_download_bridge),
        )
        .route(
            &format!("{}/bridge/{{token}}/download-info", API_PREFIX),
            get(handlers::bridge::download_info),
        )
        .route(
            &format!("{}/bridge/{{token}}/upload", API_PREFIX),
            post(handlers::bridge::bridge_upload),
        )
        .route(
            &format!("{}/bridge/{{token}}/download-token", API_PREFIX),
            post(handlers::bridge::exchange_download_token),
        )
        .route(
            &format!("{}/bridge/{{token}}/qrcode", API_PREFIX),
            get(handlers::bridge::bridge_qrcode),
        )
        .with_state(state)
}

pub fn download_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/{{token}}", DOWNLOAD_PREFIX),
            get(handlers::download::redeem_download),
        )
        .with_state(state)
}
