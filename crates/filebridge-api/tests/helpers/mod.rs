//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p filebridge-api`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use filebridge_api::constants;
use filebridge_api::setup::build_app;
use filebridge_api::state::AppState;
use filebridge_core::models::FileRecord;
use filebridge_core::{BaseConfig, Config, FileBridgeConfig, StorageBackend};
use filebridge_services::ManualClock;
use filebridge_storage::{MemoryStorage, Storage};
use std::sync::Arc;

pub const BASE_URL: &str = "http://files.test";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus handles for driving time and inspecting state.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Uploads `data` under `name` through the direct upload endpoint.
    pub async fn upload(&self, name: &str, data: &[u8]) -> FileRecord {
        let response = self
            .server
            .post(&api_path("/files"))
            .multipart(file_form(name, data))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        response.json::<FileRecord>()
    }

    /// Issues a single-use download link for `id` and returns its path on the test server.
    pub async fn download_path(&self, id: uuid::Uuid) -> String {
        let response = self
            .server
            .post(&api_path(&format!("/files/{}/download-token", id)))
            .await;
        assert_eq!(response.status_code(), 200, "{}", response.text());
        let body = response.json::<serde_json::Value>();
        relative(body["download_url"].as_str().unwrap())
    }
}

/// Strips the configured origin off an absolute link.
pub fn relative(url: &str) -> String {
    url.strip_prefix(BASE_URL)
        .unwrap_or_else(|| panic!("{} does not start with {}", url, BASE_URL))
        .to_string()
}

pub fn file_form(name: &str, data: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        constants::FILE_FIELD,
        Part::bytes(data.to_vec())
            .file_name(name)
            .mime_type("application/octet-stream"),
    )
}

pub fn test_config() -> FileBridgeConfig {
    FileBridgeConfig {
        base: BaseConfig {
            server_port: 0,
            base_url: BASE_URL.to_string(),
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            request_timeout_secs: 30,
            log_format: "compact".to_string(),
        },
        storage_backend: StorageBackend::Memory,
        local_storage_path: None,
        max_file_size_bytes: 64 * 1024,
        max_files: 100,
        max_total_size_bytes: 1024 * 1024,
        evict_oldest: true,
        upload_concurrency: 4,
        transcode_concurrency: 2,
        bridge_ttl_seconds: 300,
        download_ttl_seconds: 60,
        token_retention_seconds: 300,
        token_cleanup_interval_seconds: 30,
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config())
}

pub fn setup_test_app_with(config: FileBridgeConfig) -> TestApp {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    setup_test_app_with_storage(config, storage)
}

pub fn setup_test_app_with_storage(config: FileBridgeConfig, storage: Arc<dyn Storage>) -> TestApp {
    let clock = Arc::new(ManualClock::default());
    let (state, router) = build_app(Config(Box::new(config)), storage, clock.clone())
        .expect("Failed to build app");
    let server = TestServer::new(router).expect("Failed to start test server");
    TestApp {
        server,
        state,
        clock,
    }
}
