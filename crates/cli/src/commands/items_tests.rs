// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::api::ApiError;
use crate::error::Error;
use crate::sync::test_helpers::{item, MockApi};
use tempfile::TempDir;
use yare::parameterized;

fn draft(title: &str, image: ImageSource) -> Draft {
    Draft {
        title: title.into(),
        description: "brass".into(),
        image,
    }
}

#[tokio::test]
async fn list_prints_newest_first() {
    let api = MockApi::with_items(vec![item("a", 1), item("b", 2)]);
    let out = list_impl(api, "text").await.unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("b: Item b"));
    assert!(lines[1].contains("a: Item a"));
}

#[tokio::test]
async fn list_json_uses_wire_names() {
    let api = MockApi::with_items(vec![item("a", 1)]);
    let out = list_impl(api, "json").await.unwrap();

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value[0]["_id"], "a");
    assert!(value[0]["imageUrl"].is_string());
}

#[tokio::test]
async fn list_rejects_unknown_format() {
    let err = list_impl(MockApi::default(), "xml").await.unwrap_err();
    assert!(matches!(err, Error::UnknownFormat { .. }));
}

#[tokio::test]
async fn list_failure_is_reported() {
    let api = MockApi::default();
    api.fail_list(Some(ApiError::Transport("offline".into())));
    let err = list_impl(api, "text").await.unwrap_err();
    assert!(err.to_string().contains("offline"));
}

#[tokio::test]
async fn show_missing_item_is_not_found() {
    let err = show_impl(&MockApi::default(), "zz", "text")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::NotFound(_))));
}

#[tokio::test]
async fn show_prints_details() {
    let api = MockApi::with_items(vec![item("a", 1)]);
    let out = show_impl(&api, "a", "text").await.unwrap();
    assert!(out.starts_with("[a] Item a"));
}

#[tokio::test]
async fn new_validates_before_sending() {
    let api = MockApi::default();
    let err = new_impl(&api, draft("Lamp", ImageSource::Url(" ".into())), "text")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Core(_)));
    assert!(list_impl(api, "text").await.unwrap().contains("no objects"));
}

#[tokio::test]
async fn new_creates_item() {
    let api = MockApi::default();
    let out = new_impl(
        &api,
        draft("Lamp", ImageSource::Url("https://img.example/l.jpg".into())),
        "text",
    )
    .await
    .unwrap();
    assert_eq!(out, "Created new-0: Lamp");
    assert!(api.upload_requests().is_empty());
}

#[tokio::test]
async fn new_uploads_local_image_then_creates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Lamp.PNG");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
    let api = MockApi::default();

    let out = new_impl(&api, draft("Lamp", ImageSource::File(path)), "json")
        .await
        .unwrap();

    let requests = api.upload_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].filename, "Lamp.PNG");
    assert_eq!(requests[0].content_type, "image/png");

    let uploads = api.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].url, "https://storage.example/uploads/Lamp.PNG?signature=mock");
    assert_eq!(uploads[0].content_type, "image/png");
    assert_eq!(uploads[0].body, vec![0x89, b'P', b'N', b'G']);

    let created: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(created["imageUrl"], "https://storage.example/uploads/Lamp.PNG");
}

#[tokio::test]
async fn failed_upload_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chair.jpg");
    std::fs::write(&path, b"jpeg").unwrap();
    let api = MockApi::default();
    api.fail_upload(Some(ApiError::Status {
        action: "upload image",
        status: 403,
    }));

    let err = new_impl(&api, draft("Chair", ImageSource::File(path)), "text")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::Status { status: 403, .. })));
    assert!(list_impl(api, "text").await.unwrap().contains("no objects"));
}

#[tokio::test]
async fn unsupported_image_is_rejected_before_upload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"text").unwrap();
    let api = MockApi::default();

    let err = new_impl(&api, draft("Notes", ImageSource::File(path)), "text")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedImage { .. }));
    assert!(api.upload_requests().is_empty());
}

#[tokio::test]
async fn missing_image_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let api = MockApi::default();

    let err = new_impl(
        &api,
        draft("Ghost", ImageSource::File(dir.path().join("ghost.jpg"))),
        "text",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(api.upload_requests().is_empty());
}

#[parameterized(
    jpg = { "a.jpg", Some("image/jpeg") },
    jpeg_upper = { "a.JPEG", Some("image/jpeg") },
    png = { "dir/b.png", Some("image/png") },
    webp = { "c.webp", Some("image/webp") },
    heic = { "d.heic", Some("image/heic") },
    no_extension = { "photo", None },
    other = { "e.bmp", None },
)]
fn content_type_from_extension(path: &str, expected: Option<&str>) {
    assert_eq!(image_content_type(Path::new(path)), expected);
}

#[tokio::test]
async fn delete_already_deleted_succeeds() {
    let out = delete_impl(MockApi::default(), "gone").await.unwrap();
    assert_eq!(out, "Deleted gone");
}

#[tokio::test]
async fn delete_server_error_fails() {
    let api = MockApi::with_items(vec![item("a", 1)]);
    api.fail_delete(Some(ApiError::Status {
        action: "delete object",
        status: 500,
    }));
    let err = delete_impl(api, "a").await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
}
