//! Tests for the HTTP blob store against a mock API.

use rehost_error::{RehostError, RehostErrorKind, StorageErrorKind};
use rehost_storage::{HttpBlobStore, ObjectStore, PutOptions};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_bytes, header, method, path, query_param},
};

fn store(server: &MockServer) -> HttpBlobStore {
    HttpBlobStore::new(server.uri(), "secret-token", Duration::from_secs(5)).unwrap()
}

fn storage_kind(err: &RehostError) -> &StorageErrorKind {
    match err.kind() {
        RehostErrorKind::Storage(e) => &e.kind,
        other => panic!("expected storage error, got {}", other),
    }
}

#[tokio::test]
async fn test_put_sends_overwrite_headers_and_body() {
    let server = MockServer::start().await;
    let public = format!("{}/public/assets/abc.jpg", server.uri());

    Mock::given(method("PUT"))
        .and(path("/assets/abc.jpg"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("x-content-type", "image/jpeg"))
        .and(header("x-allow-overwrite", "1"))
        .and(header("x-add-random-suffix", "0"))
        .and(body_bytes(b"payload".to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": public,
            "pathname": "assets/abc.jpg",
            "contentType": "image/jpeg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let object = store(&server)
        .put(
            "assets/abc.jpg",
            b"payload".to_vec().into(),
            "image/jpeg",
            PutOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(object.url, public);
    assert_eq!(object.pathname, "assets/abc.jpg");
}

#[tokio::test]
async fn test_put_conflict_is_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": "blob_already_exists", "message": "This blob already exists" }
        })))
        .mount(&server)
        .await;

    let err = store(&server)
        .put("assets/a.jpg", b"x".to_vec().into(), "image/jpeg", PutOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(storage_kind(&err), StorageErrorKind::AlreadyExists(_)));
}

#[tokio::test]
async fn test_put_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = store(&server)
        .put("assets/a.jpg", b"x".to_vec().into(), "image/jpeg", PutOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(storage_kind(&err), StorageErrorKind::Unavailable(_)));
}

#[tokio::test]
async fn test_put_unauthorized_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "code": "forbidden", "message": "Access denied" }
        })))
        .mount(&server)
        .await;

    let err = store(&server)
        .put("assets/a.jpg", b"x".to_vec().into(), "image/jpeg", PutOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(storage_kind(&err), StorageErrorKind::Rejected(_)));
}

#[tokio::test]
async fn test_head_found_and_missing() {
    let server = MockServer::start().await;
    let public = format!("{}/public/assets/abc.jpg", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("url", "assets/abc.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": public,
            "pathname": "assets/abc.jpg",
            "size": 7
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("url", "assets/missing.jpg"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "not_found", "message": "The requested blob does not exist" }
        })))
        .mount(&server)
        .await;

    let store = store(&server);
    let found = store.head("assets/abc.jpg").await.unwrap().unwrap();
    assert_eq!(found.url, public);
    assert!(store.head("assets/missing.jpg").await.unwrap().is_none());
}

#[tokio::test]
async fn test_malformed_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = store(&server)
        .put("assets/a.jpg", b"x".to_vec().into(), "image/jpeg", PutOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(storage_kind(&err), StorageErrorKind::InvalidResponse(_)));
}
