//! Bridge session integration tests: upload and download hand-offs to a second device.
//!
//! Run with: `cargo test -p filebridge-api --test bridge_test`

mod helpers;

use chrono::Duration;
use filebridge_core::models::FileRecord;
use helpers::{api_path, file_form, relative, setup_test_app, BASE_URL};
use serde_json::{json, Value};

#[tokio::test]
async fn test_upload_session_is_single_use() {
    let app = setup_test_app();

    let response = app.client().post(&api_path("/bridge/upload")).await;
    assert_eq!(response.status_code(), 201);
    let session = response.json::<Value>();
    let token = session["token"].as_str().unwrap().to_string();
    assert_eq!(session["kind"], "upload");
    assert_eq!(token.len(), 43);
    assert_eq!(
        session["display_url"],
        format!("{}/m/upload/{}", BASE_URL, token)
    );
    assert_eq!(
        session["qr_url"],
        format!("/api/v0/bridge/{}/qrcode", token)
    );

    let upload = app
        .client()
        .post(&api_path(&format!("/bridge/{}/upload", token)))
        .multipart(file_form("from-phone.txt", b"sent from the phone"))
        .await;
    assert_eq!(upload.status_code(), 201);
    let record = upload.json::<FileRecord>();
    assert_eq!(record.name, "from-phone.txt");
    assert_eq!(app.state.registry.list(), vec![record]);

    let replay = app
        .client()
        .post(&api_path(&format!("/bridge/{}/upload", token)))
        .multipart(file_form("again.txt", b"again"))
        .await;
    assert_eq!(replay.status_code(), 410);
    assert_eq!(replay.json::<Value>()["code"], "TOKEN_ALREADY_CONSUMED");
    assert_eq!(app.state.registry.list().len(), 1);
}

#[tokio::test]
async fn test_failed_bridge_upload_keeps_session_usable() {
    let app = setup_test_app();
    let token = app
        .client()
        .post(&api_path("/bridge/upload"))
        .await
        .json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let too_big = vec![b'x'; 64 * 1024 + 1];
    let rejected = app
        .client()
        .post(&api_path(&format!("/bridge/{}/upload", token)))
        .multipart(file_form("big.txt", &too_big))
        .await;
    assert_eq!(rejected.status_code(), 413);

    let retried = app
        .client()
        .post(&api_path(&format!("/bridge/{}/upload", token)))
        .multipart(file_form("small.txt", b"small"))
        .await;
    assert_eq!(retried.status_code(), 201);
}

#[tokio::test]
async fn test_unknown_bridge_token_is_gone() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(&api_path("/bridge/not-a-real-token/upload"))
        .multipart(file_form("x.txt", b"x"))
        .await;
    assert_eq!(response.status_code(), 410);
    assert_eq!(response.json::<Value>()["code"], "TOKEN_NOT_FOUND");
}

#[tokio::test]
async fn test_download_session_flow() {
    let app = setup_test_app();
    let record = app.upload("slides.txt", b"slide one\nslide two\n").await;

    let response = app
        .client()
        .post(&api_path("/bridge/download"))
        .json(&json!({ "file_id": record.id }))
        .await;
    assert_eq!(response.status_code(), 201);
    let session = response.json::<Value>();
    let token = session["token"].as_str().unwrap().to_string();
    assert_eq!(session["kind"], "download");
    assert_eq!(
        session["display_url"],
        format!("{}/m/download/{}", BASE_URL, token)
    );

    // Inspecting the session does not use it up.
    for _ in 0..3 {
        let info = app
            .client()
            .get(&api_path(&format!("/bridge/{}/download-info", token)))
            .await;
        assert_eq!(info.status_code(), 200);
        assert_eq!(info.json::<FileRecord>(), record);
    }

    let exchange = app
        .client()
        .post(&api_path(&format!("/bridge/{}/download-token", token)))
        .await;
    assert_eq!(exchange.status_code(), 200);
    let grant = exchange.json::<Value>();
    let path = relative(grant["download_url"].as_str().unwrap());
    assert!(path.starts_with("/dl/"));

    let download = app.client().get(&path).await;
    assert_eq!(download.status_code(), 200);
    assert_eq!(download.as_bytes().as_ref(), b"slide one\nslide two\n");

    let replay = app
        .client()
        .post(&api_path(&format!("/bridge/{}/download-token", token)))
        .await;
    assert_eq!(replay.status_code(), 410);
    let info = app
        .client()
        .get(&api_path(&format!("/bridge/{}/download-info", token)))
        .await;
    assert_eq!(info.status_code(), 410);
}

#[tokio::test]
async fn test_download_session_for_missing_file() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(&api_path("/bridge/download"))
        .json(&json!({ "file_id": uuid::Uuid::new_v4() }))
        .await;
    assert_eq!(response.status_code(), 404);

    let malformed = app
        .client()
        .post(&api_path("/bridge/download"))
        .json(&json!({ "file_id": "nope" }))
        .await;
    assert_eq!(malformed.status_code(), 400);
}

#[tokio::test]
async fn test_download_session_after_file_deleted() {
    let app = setup_test_app();
    let record = app.upload("temp.txt", b"temporary").await;
    let token = app
        .client()
        .post(&api_path("/bridge/download"))
        .json(&json!({ "file_id": record.id }))
        .await
        .json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();

    app.client()
        .delete(&api_path(&format!("/files/{}", record.id)))
        .await;

    let info = app
        .client()
        .get(&api_path(&format!("/bridge/{}/download-info", token)))
        .await;
    assert_eq!(info.status_code(), 404);
    let exchange = app
        .client()
        .post(&api_path(&format!("/bridge/{}/download-token", token)))
        .await;
    assert_eq!(exchange.status_code(), 404);
}

#[tokio::test]
async fn test_session_tokens_are_kind_specific() {
    let app = setup_test_app();
    let record = app.upload("a.txt", b"a").await;
    let upload_token = app
        .client()
        .post(&api_path("/bridge/upload"))
        .await
        .json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();
    let download_token = app
        .client()
        .post(&api_path("/bridge/download"))
        .json(&json!({ "file_id": record.id }))
        .await
        .json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let info = app
        .client()
        .get(&api_path(&format!("/bridge/{}/download-info", upload_token)))
        .await;
    assert_eq!(info.status_code(), 410);
    assert_eq!(info.json::<Value>()["code"], "TOKEN_NOT_FOUND");

    let upload = app
        .client()
        .post(&api_path(&format!("/bridge/{}/upload", download_token)))
        .multipart(file_form("b.txt", b"b"))
        .await;
    assert_eq!(upload.status_code(), 410);
    assert_eq!(app.state.registry.list().len(), 1);
}

#[tokio::test]
async fn test_expired_session_then_purged() {
    let app = setup_test_app();
    let token = app
        .client()
        .post(&api_path("/bridge/upload"))
        .await
        .json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();

    app.clock.advance(Duration::seconds(300));
    let expired = app
        .client()
        .post(&api_path(&format!("/bridge/{}/upload", token)))
        .multipart(file_form("late.txt", b"late"))
        .await;
    assert_eq!(expired.status_code(), 410);
    assert_eq!(expired.json::<Value>()["code"], "TOKEN_EXPIRED");

    app.clock.advance(Duration::seconds(300));
    let (sessions, _) = app.state.cleanup.run_once();
    assert_eq!(sessions, 1);

    let purged = app
        .client()
        .get(&api_path(&format!("/bridge/{}/qrcode", token)))
        .await;
    assert_eq!(purged.status_code(), 410);
    assert_eq!(purged.json::<Value>()["code"], "TOKEN_NOT_FOUND");
}

#[tokio::test]
async fn test_qrcode_is_png() {
    let app = setup_test_app();
    let token = app
        .client()
        .post(&api_path("/bridge/upload"))
        .await
        .json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .client()
        .get(&api_path(&format!("/bridge/{}/qrcode", token)))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.header("cache-control"), "no-store");
    assert!(response.as_bytes().starts_with(b"\x89PNG\r\n\x1a\n"));
}
