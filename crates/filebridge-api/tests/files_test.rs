//! File collection API integration tests.
//!
//! Run with: `cargo test -p filebridge-api --test files_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use filebridge_core::models::FileRecord;
use helpers::{api_path, file_form, setup_test_app, setup_test_app_with, test_config};
use serde_json::{json, Value};

const CHINESE: &str = "会议纪要：明天九点开会。\n";

#[tokio::test]
async fn test_upload_and_list_oldest_first() {
    let app = setup_test_app();

    let first = app.upload("first.txt", b"first file\n").await;
    let second = app.upload("second.bin", &[0x89, b'P', b'N', b'G', 0, 0]).await;

    assert_eq!(first.name, "first.txt");
    assert!(first.is_text);
    assert_eq!(first.encoding, "UTF-8");
    assert_eq!(first.size_bytes, 11);
    assert!(!second.is_text);
    assert_eq!(second.encoding, "Unknown");

    let listed = app
        .client()
        .get(&api_path("/files"))
        .await
        .json::<Vec<FileRecord>>();
    assert_eq!(listed, vec![first, second]);
}

#[tokio::test]
async fn test_upload_name_field_overrides_file_name() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(b"hello".to_vec()).file_name("IMG_0001.txt"),
        )
        .add_text("name", "  greeting.txt ");
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(response.json::<FileRecord>().name, "greeting.txt");
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_text("name", "nothing.txt");
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_upload_over_size_limit_is_rejected() {
    let app = setup_test_app();
    let too_big = vec![b'a'; 64 * 1024 + 1];

    let response = app
        .client()
        .post(&api_path("/files"))
        .multipart(file_form("big.txt", &too_big))
        .await;

    assert_eq!(response.status_code(), 413);
    assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.state.registry.list().is_empty());
}

#[tokio::test]
async fn test_file_limit_without_eviction() {
    let mut config = test_config();
    config.max_files = 1;
    config.evict_oldest = false;
    let app = setup_test_app_with(config);

    app.upload("kept.txt", b"kept").await;
    let response = app
        .client()
        .post(&api_path("/files"))
        .multipart(file_form("rejected.txt", b"rejected"))
        .await;

    assert_eq!(response.status_code(), 507);
    assert_eq!(app.state.registry.list().len(), 1);
}

#[tokio::test]
async fn test_file_limit_evicts_oldest() {
    let mut config = test_config();
    config.max_files = 2;
    let app = setup_test_app_with(config);

    app.upload("one.txt", b"one").await;
    let two = app.upload("two.txt", b"two").await;
    let three = app.upload("three.txt", b"three").await;

    let names: Vec<_> = app
        .state
        .registry
        .list()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(names, vec![two.id, three.id]);
}

#[tokio::test]
async fn test_rename_file() {
    let app = setup_test_app();
    let record = app.upload("draft.txt", b"draft").await;

    let response = app
        .client()
        .patch(&api_path(&format!("/files/{}", record.id)))
        .json(&json!({ "name": "final.txt" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let renamed = response.json::<FileRecord>();
    assert_eq!(renamed.name, "final.txt");
    assert_eq!(renamed.id, record.id);
    assert_eq!(renamed.size_bytes, record.size_bytes);

    let empty = app
        .client()
        .patch(&api_path(&format!("/files/{}", record.id)))
        .json(&json!({ "name": "" }))
        .await;
    assert_eq!(empty.status_code(), 400);

    let missing = app
        .client()
        .patch(&api_path(&format!("/files/{}", uuid::Uuid::new_v4())))
        .json(&json!({ "name": "ghost.txt" }))
        .await;
    assert_eq!(missing.status_code(), 404);
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let app = setup_test_app();

    let response = app
        .client()
        .delete(&api_path("/files/not-a-uuid"))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_delete_file() {
    let app = setup_test_app();
    let record = app.upload("gone.txt", b"soon gone").await;

    let response = app
        .client()
        .delete(&api_path(&format!("/files/{}", record.id)))
        .await;
    assert_eq!(response.status_code(), 204);
    assert!(app.state.registry.list().is_empty());
    assert_eq!(app.state.registry.usage().total_bytes, 0);

    let again = app
        .client()
        .delete(&api_path(&format!("/files/{}", record.id)))
        .await;
    assert_eq!(again.status_code(), 404);
}

#[tokio::test]
async fn test_transcode_to_gb18030_and_download() {
    let app = setup_test_app();
    let record = app.upload("minutes.txt", CHINESE.as_bytes()).await;

    let response = app
        .client()
        .post(&api_path(&format!("/files/{}/transcode", record.id)))
        .json(&json!({ "target_encoding": "GB18030" }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    let body = response.json::<Value>();
    assert_eq!(body["encoding"], "GB18030");
    assert_eq!(body["replaced_characters"], 0);
    assert_eq!(body["id"], record.id.to_string());

    let (expected, _, _) = encoding_rs::GB18030.encode(CHINESE);
    assert_eq!(body["size_bytes"], expected.len() as u64);

    let path = app.download_path(record.id).await;
    let download = app.client().get(&path).await;
    assert_eq!(download.status_code(), 200);
    assert_eq!(download.header("x-file-encoding"), "GB18030");
    assert_eq!(download.as_bytes().as_ref(), expected.as_ref());
}

#[tokio::test]
async fn test_strict_transcode_keeps_file_unchanged() {
    let app = setup_test_app();
    let record = app.upload("minutes.txt", CHINESE.as_bytes()).await;

    let response = app
        .client()
        .post(&api_path(&format!("/files/{}/transcode", record.id)))
        .json(&json!({
            "source_encoding": "UTF-8",
            "target_encoding": "Windows-1252",
            "allow_lossy": false
        }))
        .await;
    assert_eq!(response.status_code(), 422);
    assert_eq!(response.json::<Value>()["code"], "UNREPRESENTABLE");

    assert_eq!(app.state.registry.get(record.id).unwrap(), record);
}

#[tokio::test]
async fn test_lossy_transcode_reports_replacements() {
    let app = setup_test_app();
    let record = app.upload("menu.txt", "café 你好\n".as_bytes()).await;

    let response = app
        .client()
        .post(&api_path(&format!("/files/{}/transcode", record.id)))
        .json(&json!({ "target_encoding": "windows-1252" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["encoding"], "Windows-1252");
    assert_eq!(body["replaced_characters"], 2);

    let path = app.download_path(record.id).await;
    let download = app.client().get(&path).await;
    assert_eq!(download.as_bytes().as_ref(), b"caf\xe9 ??\n");
}

#[tokio::test]
async fn test_transcode_rejects_binary_and_unknown_encodings() {
    let app = setup_test_app();
    let binary = app.upload("blob.bin", &[0, 1, 2, 3, 0xFF]).await;
    let text = app.upload("plain.txt", b"plain text").await;

    let response = app
        .client()
        .post(&api_path(&format!("/files/{}/transcode", binary.id)))
        .json(&json!({ "target_encoding": "UTF-8" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "NOT_TEXT");

    let response = app
        .client()
        .post(&api_path(&format!("/files/{}/transcode", text.id)))
        .json(&json!({ "target_encoding": "EBCDIC" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "UNSUPPORTED_ENCODING");
}

#[tokio::test]
async fn test_list_encodings() {
    let app = setup_test_app();

    let body = app
        .client()
        .get(&api_path("/encodings"))
        .await
        .json::<Value>();

    assert_eq!(body["source_encodings"][0], "auto");
    let targets: Vec<&str> = body["target_encodings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        targets,
        ["UTF-8", "GB18030", "GBK", "Big5", "Windows-1252", "ISO-8859-1"]
    );
}

#[tokio::test]
async fn test_health_reports_usage() {
    let app = setup_test_app();
    app.upload("a.txt", b"abc").await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "healthy");
    assert_eq!(body["files"], 1);
    assert_eq!(body["total_bytes"], 3);

    let live = app.client().get("/health/live").await;
    assert_eq!(live.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app();

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert!(body["paths"]["/api/v0/files"].is_object());
}
