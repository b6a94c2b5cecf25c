//! Domain methods for the FileBridge API client.
//!
//! Response types come from `filebridge_core::models`.

use crate::{api_prefix, FileBridgeClient};
use anyhow::{Context, Result};
use bytes::Bytes;
use filebridge_core::models::{
    BridgeDownloadRequest, BridgeSessionResponse, DownloadTokenResponse, EncodingsResponse,
    FileRecord, RenameFileRequest, TranscodeRequest, TranscodeResponse,
};
use std::path::Path;
use uuid::Uuid;

fn file_form(path: &Path, name: Option<&str>) -> Result<reqwest::multipart::Form> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.bin")
        .to_string();

    let mut form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(data).file_name(file_name),
    );
    if let Some(name) = name {
        form = form.text("name", name.to_string());
    }
    Ok(form)
}

impl FileBridgeClient {
    /// List all files, oldest first.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.get(&format!("{}/files", api_prefix())).await
    }

    /// Upload a local file. `name` overrides the file name taken from the path.
    pub async fn upload_file(&self, path: &Path, name: Option<&str>) -> Result<FileRecord> {
        let form = file_form(path, name)?;
        self.post_multipart(&format!("{}/files", api_prefix()), form)
            .await
    }

    pub async fn rename_file(&self, id: Uuid, name: &str) -> Result<FileRecord> {
        let body = RenameFileRequest {
            name: name.to_string(),
        };
        self.patch_json(&format!("{}/files/{}", api_prefix(), id), &body)
            .await
    }

    pub async fn delete_file(&self, id: Uuid) -> Result<()> {
        self.delete(&format!("{}/files/{}", api_prefix(), id)).await
    }

    pub async fn transcode_file(
        &self,
        id: Uuid,
        request: &TranscodeRequest,
    ) -> Result<TranscodeResponse> {
        self.post_json(&format!("{}/files/{}/transcode", api_prefix(), id), request)
            .await
    }

    pub async fn list_encodings(&self) -> Result<EncodingsResponse> {
        self.get(&format!("{}/encodings", api_prefix())).await
    }

    /// Issue a single-use download link for a file.
    pub async fn issue_download_token(&self, id: Uuid) -> Result<DownloadTokenResponse> {
        self.post_empty(&format!("{}/files/{}/download-token", api_prefix(), id))
            .await
    }

    /// Fetch the bytes behind a download link. Consumes the link.
    pub async fn redeem_download(&self, download_url: &str) -> Result<Bytes> {
        self.get_bytes(download_url).await
    }

    /// Issue a link and download the file in one go.
    pub async fn download_file(&self, id: Uuid) -> Result<Bytes> {
        let grant = self.issue_download_token(id).await?;
        self.redeem_download(&grant.download_url).await
    }

    pub async fn create_upload_bridge(&self) -> Result<BridgeSessionResponse> {
        self.post_empty(&format!("{}/bridge/upload", api_prefix()))
            .await
    }

    pub async fn create_download_bridge(&self, file_id: Uuid) -> Result<BridgeSessionResponse> {
        self.post_json(
            &format!("{}/bridge/download", api_prefix()),
            &BridgeDownloadRequest { file_id },
        )
        .await
    }

    /// Metadata of the file behind a download session. Does not consume the session.
    pub async fn bridge_download_info(&self, token: &str) -> Result<FileRecord> {
        self.get(&format!("{}/bridge/{}/download-info", api_prefix(), token))
            .await
    }

    /// Upload a local file through an upload session, consuming it.
    pub async fn bridge_upload(
        &self,
        token: &str,
        path: &Path,
        name: Option<&str>,
    ) -> Result<FileRecord> {
        let form = file_form(path, name)?;
        self.post_multipart(&format!("{}/bridge/{}/upload", api_prefix(), token), form)
            .await
    }

    /// Exchange a download session for a single-use download link, consuming the session.
    pub async fn exchange_bridge_download(&self, token: &str) -> Result<DownloadTokenResponse> {
        self.post_empty(&format!("{}/bridge/{}/download-token", api_prefix(), token))
            .await
    }

    /// PNG QR code of a session's display URL.
    pub async fn bridge_qrcode(&self, token: &str) -> Result<Bytes> {
        self.get_bytes(&format!("{}/bridge/{}/qrcode", api_prefix(), token))
            .await
    }
}
