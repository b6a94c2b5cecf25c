//! Absolute links handed to second devices.

use filebridge_core::models::BridgeKind;

/// Builds user-facing URLs from the configured external origin.
#[derive(Debug, Clone)]
pub struct PublicLinks {
    base_url: String,
}

impl PublicLinks {
    /// `base_url` is an origin such as `https://files.example.com`; a trailing slash is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page the second device opens after scanning the QR code.
    pub fn display_url(&self, kind: BridgeKind, token: &str) -> String {
        format!("{}/m/{}/{}", self.base_url, kind.as_str(), token)
    }

    /// Single-use direct download link.
    pub fn download_url(&self, token: &str) -> String {
        format!("{}/dl/{}", self.base_url, token)
    }
}
