//! File listing and download against the fake server.

mod common;

use serde_json::json;

use common::FakeServer;
use mailgrab::api::{ClientError, JobApi};

#[tokio::test]
async fn lists_stored_files() {
    let server = FakeServer::new();
    server.set_files(json!([
        {"name": "invoice_1.pdf", "size": 4096, "modified": "2024-01-02 11:00:00"},
        {"name": "a.pdf", "size": 10, "modified": "2024-01-01 10:00:00"},
    ]));
    let client = common::client(&common::spawn(server).await);

    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "invoice_1.pdf");
    assert_eq!(files[0].size, 4096);
    assert_eq!(files[1].modified, "2024-01-01 10:00:00");
}

#[tokio::test]
async fn empty_listing() {
    let client = common::client(&common::spawn(FakeServer::new()).await);
    assert!(client.list_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn downloads_into_directory() {
    let client = common::client(&common::spawn(FakeServer::new()).await);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out");

    let path = client.download("report 1.pdf", &target).await.unwrap();

    assert_eq!(path, target.join("report 1.pdf"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "%PDF report 1.pdf");
}

#[tokio::test]
async fn missing_download_is_an_error_and_writes_nothing() {
    let client = common::client(&common::spawn(FakeServer::new()).await);
    let dir = tempfile::tempdir().unwrap();

    let err = client.download("missing.pdf", dir.path()).await.unwrap_err();

    assert!(matches!(err, ClientError::Http(_)));
    assert!(!dir.path().join("missing.pdf").exists());
}

#[tokio::test]
async fn progress_is_fetched_once_per_call() {
    let server = FakeServer::new();
    server.push_progress([common::progress_json("running", "Processing email 1 of 4...", 1, 4, 0)]);
    let client = common::client(&common::spawn(server.clone()).await);

    let snapshot = client.fetch_progress().await.unwrap();

    assert_eq!(snapshot.progress, 1);
    assert_eq!(snapshot.total, 4);
    assert_eq!(server.polls(), 1);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = common::client(&format!("http://{addr}"));

    let err = client.fetch_progress().await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}
