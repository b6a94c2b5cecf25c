//! Typed HTTP client for the FileBridge API.
//!
//! Provides generic JSON and multipart helpers plus one method per API route (see [`api`]).
//! The CLI uses this client directly.

pub mod api;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// API version prefix (e.g. "/api/v0"). Set FILEBRIDGE_API_VERSION to match the server.
pub fn api_prefix() -> String {
    let version = std::env::var("FILEBRIDGE_API_VERSION").unwrap_or_else(|_| "v0".to_string());
    format!("/api/{}", version)
}

/// HTTP client for the FileBridge API.
#[derive(Clone, Debug)]
pub struct FileBridgeClient {
    client: Client,
    base_url: String,
}

impl FileBridgeClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: FILEBRIDGE_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("FILEBRIDGE_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`. Absolute URLs (as returned in `download_url`) pass through.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.client.get(self.build_url(path));
        parse_json(send(request).await?).await
    }

    /// GET request returning the raw body.
    pub async fn get_bytes(&self, path: &str) -> Result<bytes::Bytes> {
        let request = self.client.get(self.build_url(path));
        send(request)
            .await?
            .bytes()
            .await
            .context("Failed to read response body")
    }

    /// POST without a body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.client.post(self.build_url(path));
        parse_json(send(request).await?).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.post(self.build_url(path)).json(body);
        parse_json(send(request).await?).await
    }

    /// PATCH JSON body and deserialize response.
    pub async fn patch_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.patch(self.build_url(path)).json(body);
        parse_json(send(request).await?).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        parse_json(send(request).await?).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.client.delete(self.build_url(path));
        send(request).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.context("Failed to send request")?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(anyhow::anyhow!(
            "API request failed with status {}: {}",
            status,
            error_text
        ));
    }
    Ok(response)
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .context("Failed to parse response as JSON")
}

// Re-export domain types for convenience.
pub use filebridge_core::models::{
    BridgeKind, BridgeSessionResponse, DownloadTokenResponse, EncodingsResponse, FileRecord,
    TranscodeRequest, TranscodeResponse,
};
