//! Registry documents persisted by the filesystem blob store.

use std::sync::Arc;

use super::helpers::{hub_over, scratch_dir, server_payload};
use mcphub::{
    launcher::{
        adapters::{RecordingProcessExecutor, StaticRepositoryFetcher},
        domain::WorkspacePolicy,
    },
    registry::{adapters::FilesystemBlobStore, services::DEFAULT_REGISTRY_KEY},
};
use rstest::rstest;
use serde_json::{Value, json};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registrations_survive_reopening_the_store() {
    let (_scratch, root) = scratch_dir();
    let storage = root.join("storage");
    let workspaces = root.join("workspaces");
    let source = Arc::new(StaticRepositoryFetcher::default());
    let executor = Arc::new(RecordingProcessExecutor::succeeding("{}"));

    let writer = hub_over(
        Arc::new(FilesystemBlobStore::open(storage.clone()).expect("store should open")),
        &workspaces,
        Arc::clone(&source),
        Arc::clone(&executor),
        WorkspacePolicy::Ephemeral,
    );
    writer
        .create_or_upsert_server(&server_payload("weather", "python", "main.py"))
        .await
        .expect("registration should succeed");

    let reader = hub_over(
        Arc::new(FilesystemBlobStore::open(storage).expect("store should reopen")),
        &workspaces,
        source,
        executor,
        WorkspacePolicy::Ephemeral,
    );
    let record = reader
        .get_server("weather")
        .await
        .expect("record should be readable after reopening");

    assert_eq!(record.entrypoint(), "main.py");
    assert_eq!(record.repository().url().as_str(), "https://example.com/weather.git");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn document_on_disk_keeps_foreign_fields() {
    let (_scratch, root) = scratch_dir();
    let storage = root.join("storage");
    std::fs::create_dir_all(&storage).expect("storage dir should be created");
    let legacy = json!({
        "owner": "platform-team",
        "servers": [{
            "name": "legacy",
            "version": "0.1.0",
            "description": "Older entry",
            "author": "grace",
            "lang": "python",
            "license": "MIT",
            "entrypoint": "main.py",
            "repository": {"type": "git", "url": "https://example.com/legacy.git"},
            "rating": 5
        }]
    });
    std::fs::write(
        storage.join(DEFAULT_REGISTRY_KEY),
        serde_json::to_vec(&legacy).expect("legacy document should serialize"),
    )
    .expect("legacy document should be written");

    let hub = hub_over(
        Arc::new(FilesystemBlobStore::open(storage.clone()).expect("store should open")),
        &root.join("workspaces"),
        Arc::new(StaticRepositoryFetcher::default()),
        Arc::new(RecordingProcessExecutor::succeeding("{}")),
        WorkspacePolicy::Ephemeral,
    );
    hub.create_or_upsert_server(&server_payload("weather", "python", "main.py"))
        .await
        .expect("registration should succeed");

    let stored: Value = serde_json::from_slice(
        &std::fs::read(storage.join(DEFAULT_REGISTRY_KEY)).expect("document should be readable"),
    )
    .expect("document should be JSON");

    assert_eq!(stored["owner"], json!("platform-team"));
    assert_eq!(stored["servers"][0]["name"], json!("legacy"));
    assert_eq!(stored["servers"][0]["rating"], json!(5));
    assert_eq!(stored["servers"][1]["name"], json!("weather"));
    let listing = hub.list_servers().await.expect("listing should succeed");
    assert_eq!(listing.total, 2);
}
