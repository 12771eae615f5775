//! Object store contract tests
//!
//! Runs the same scenarios against every backend: the local filesystem and
//! the S3-compatible client talking to an in-memory bucket.

use std::sync::Arc;

use tempfile::TempDir;
use webwatch::models::storage_key;
use webwatch::storage::{LocalStore, ObjectStore, S3Store};
use webwatch::storage::s3::S3Endpoint;
use wiremock::MockServer;

use crate::common::FakeBucket;

async fn exercise(store: Arc<dyn ObjectStore>) {
    let key = storage_key("https://example.com/news?page=1");

    assert_eq!(store.get_object(&key).await.unwrap(), None);

    store.put_object(&key, &[1; 16]).await.unwrap();
    assert_eq!(store.get_object(&key).await.unwrap(), Some(vec![1; 16]));

    store.put_object(&key, &[2; 16]).await.unwrap();
    assert_eq!(store.get_object(&key).await.unwrap(), Some(vec![2; 16]));

    let other = storage_key("https://example.com/other");
    assert_eq!(store.get_object(&other).await.unwrap(), None);
}

fn s3_store(server: &MockServer) -> S3Store {
    S3Store::connect(&S3Endpoint {
        endpoint: server.uri(),
        region: "us-east-1".into(),
        bucket: "watch".into(),
        access_key_id: "test-key".into(),
        secret_access_key: "test-secret".into(),
        session_token: None,
        path_style: true,
    })
}

#[tokio::test]
async fn test_local_store_contract() {
    let dir = TempDir::new().unwrap();
    exercise(Arc::new(LocalStore::new(dir.path()))).await;
}

#[tokio::test]
async fn test_s3_store_contract() {
    let server = MockServer::start().await;
    let bucket = FakeBucket::default();
    bucket.mount(&server).await;

    exercise(Arc::new(s3_store(&server))).await;

    let objects = bucket.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    let key = format!("/watch/{}", storage_key("https://example.com/news?page=1"));
    assert_eq!(objects.get(&key), Some(&vec![2; 16]));
}

#[tokio::test]
async fn test_s3_access_denied_is_an_error_not_absent() {
    let server = MockServer::start().await;
    let bucket = FakeBucket::default();
    let key = storage_key("https://example.com/private");
    bucket.forbid(&format!("/watch/{key}"));
    bucket.mount(&server).await;

    let store = s3_store(&server);
    assert!(store.get_object(&key).await.is_err());
    assert!(store.put_object(&key, &[0; 16]).await.is_err());
}
