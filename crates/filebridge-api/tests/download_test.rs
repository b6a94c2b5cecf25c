//! Single-use download link integration tests.
//!
//! Run with: `cargo test -p filebridge-api --test download_test`

mod helpers;

use chrono::Duration;
use helpers::{api_path, setup_test_app, setup_test_app_with_storage, test_config};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn test_download_link_works_once() {
    let app = setup_test_app();
    let record = app.upload("report.txt", b"quarterly numbers\n").await;

    let response = app
        .client()
        .post(&api_path(&format!("/files/{}/download-token", record.id)))
        .await;
    assert_eq!(response.status_code(), 200);
    let grant = response.json::<Value>();
    let token = grant["token"].as_str().unwrap();
    assert_eq!(
        grant["download_url"],
        format!("{}/dl/{}", helpers::BASE_URL, token)
    );

    let path = format!("/dl/{}", token);
    let download = app.client().get(&path).await;
    assert_eq!(download.status_code(), 200);
    assert_eq!(download.header("content-type"), "application/octet-stream");
    assert_eq!(download.header("content-length"), "18");
    assert_eq!(download.header("cache-control"), "no-store");
    assert_eq!(download.header("x-content-type-options"), "nosniff");
    assert_eq!(download.header("x-file-encoding"), "UTF-8");
    assert_eq!(
        download.header("content-disposition"),
        "attachment; filename=\"report.txt\"; filename*=UTF-8''report.txt"
    );
    assert_eq!(download.as_bytes().as_ref(), b"quarterly numbers\n");

    let replay = app.client().get(&path).await;
    assert_eq!(replay.status_code(), 410);
    assert_eq!(replay.json::<Value>()["code"], "TOKEN_ALREADY_CONSUMED");
}

#[tokio::test]
async fn test_download_link_for_missing_file() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(&api_path(&format!(
            "/files/{}/download-token",
            uuid::Uuid::new_v4()
        )))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_download_after_delete_is_not_found() {
    let app = setup_test_app();
    let record = app.upload("a.txt", b"a").await;
    let path = app.download_path(record.id).await;

    app.client()
        .delete(&api_path(&format!("/files/{}", record.id)))
        .await;

    let response = app.client().get(&path).await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_expired_download_link() {
    let app = setup_test_app();
    let record = app.upload("a.txt", b"a").await;
    let path = app.download_path(record.id).await;

    app.clock.advance(Duration::seconds(60));

    let response = app.client().get(&path).await;
    assert_eq!(response.status_code(), 410);
    assert_eq!(response.json::<Value>()["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_unknown_download_token() {
    let app = setup_test_app();

    let response = app.client().get("/dl/does-not-exist").await;
    assert_eq!(response.status_code(), 410);
    assert_eq!(response.json::<Value>()["code"], "TOKEN_NOT_FOUND");
}

#[tokio::test]
async fn test_download_name_is_sanitized_in_header() {
    let app = setup_test_app();
    let record = app.upload("../etc/passwd", b"not really").await;
    let path = app.download_path(record.id).await;

    let response = app.client().get(&path).await;
    assert_eq!(response.status_code(), 200);
    let disposition = response.header("content-disposition");
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\".._etc_passwd\""));
    assert!(!disposition.contains('/'));
}

#[tokio::test]
async fn test_download_from_local_storage() {
    let dir = tempfile::tempdir().unwrap();
    let storage = filebridge_storage::LocalStorage::new(dir.path()).await.unwrap();
    let app = setup_test_app_with_storage(test_config(), Arc::new(storage));

    let record = app.upload("disk.txt", b"stored on disk\n").await;
    let path = app.download_path(record.id).await;

    let response = app.client().get(&path).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), b"stored on disk\n");
}
