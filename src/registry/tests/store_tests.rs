//! Registry store behaviour over the in-memory blob store.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::fixtures::{SteppingClock, payload, payload_value};
use crate::registry::{
    adapters::InMemoryBlobStore,
    domain::{RegistryDocumentError, ServerName},
    ports::{BlobStore, BlobStoreError, MockBlobStore, WritePrecondition},
    services::{RegistryStore, RegistryStoreError, RegistryStoreSettings},
};

type TestStore = RegistryStore<InMemoryBlobStore, SteppingClock>;

struct Harness {
    blobs: Arc<InMemoryBlobStore>,
    store: TestStore,
}

#[fixture]
fn harness() -> Harness {
    let blobs = Arc::new(InMemoryBlobStore::new());
    let store = RegistryStore::new(Arc::clone(&blobs), Arc::new(SteppingClock::new()));
    Harness { blobs, store }
}

fn name(value: &str) -> ServerName {
    ServerName::new(value).expect("valid name")
}

fn stored_json(blobs: &InMemoryBlobStore) -> Value {
    let bytes = blobs
        .raw("mcp.json")
        .expect("readable store")
        .expect("document stored");
    serde_json::from_slice(&bytes).expect("valid json")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_of_absent_document_is_empty(harness: Harness) {
    let document = harness.store.load().await.expect("load succeeds");
    assert!(document.servers().is_empty());
    assert!(harness.store.list().await.expect("list succeeds").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_without_document_reports_document_not_found(harness: Harness) {
    let result = harness.store.get(&name("weather")).await;
    assert!(matches!(result, Err(RegistryStoreError::DocumentNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_of_unknown_server_reports_server_not_found(harness: Harness) {
    harness
        .store
        .upsert(payload("weather", "1.0.0"))
        .await
        .expect("upsert succeeds");

    let result = harness.store.get(&name("Weather")).await;
    assert!(matches!(result, Err(RegistryStoreError::ServerNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upsert_then_get_round_trips(harness: Harness) {
    let stored = harness
        .store
        .upsert(payload("weather", "1.0.0"))
        .await
        .expect("upsert succeeds");
    let fetched = harness.store.get(&name("weather")).await.expect("found");

    assert_eq!(stored, fetched);
    assert_eq!(fetched.version(), "1.0.0");
    assert_eq!(fetched.repository().url().as_str(), "https://example.com/weather.git");
    assert!(fetched.pricing().is_free());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_upsert_replaces_in_place(harness: Harness) {
    let first = harness
        .store
        .upsert(payload("weather", "1.0.0"))
        .await
        .expect("first upsert");
    harness
        .store
        .upsert(payload("maps", "0.1.0"))
        .await
        .expect("second server");
    let second = harness
        .store
        .upsert(payload("weather", "1.1.0"))
        .await
        .expect("replacement");

    let servers = harness.store.list().await.expect("list succeeds");
    let names: Vec<&str> = servers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["weather", "maps"]);

    let first_meta = first.meta().expect("meta present");
    let second_meta = second.meta().expect("meta present");
    assert_eq!(first_meta.created_at, second_meta.created_at);
    assert!(second_meta.updated_at > first_meta.updated_at);
    assert_eq!(second.version(), "1.1.0");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identical_upserts_differ_only_in_updated_at(harness: Harness) {
    let first = harness
        .store
        .upsert(payload("weather", "1.0.0"))
        .await
        .expect("first upsert");
    let before = stored_json(&harness.blobs);
    harness
        .store
        .upsert(payload("weather", "1.0.0"))
        .await
        .expect("second upsert");
    let after = stored_json(&harness.blobs);

    let strip = |mut value: Value| {
        if let Some(meta) = value
            .pointer_mut("/servers/0/meta")
            .and_then(Value::as_object_mut)
        {
            meta.remove("updated_at");
        }
        value
    };
    assert_eq!(strip(before), strip(after));
    assert_eq!(harness.store.list().await.expect("list").len(), 1);
    assert!(first.meta().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_top_level_fields_are_preserved_and_not_merged(harness: Harness) {
    let legacy = json!({
        "mcphub-servers": [{"name": "legacy-only"}],
        "servers": [],
    });
    harness
        .blobs
        .put(
            "mcp.json",
            serde_json::to_vec(&legacy).expect("encode"),
            WritePrecondition::Unconditional,
        )
        .await
        .expect("seed");

    harness
        .store
        .upsert(payload("weather", "1.0.0"))
        .await
        .expect("upsert succeeds");

    let stored = stored_json(&harness.blobs);
    assert_eq!(stored["mcphub-servers"], json!([{"name": "legacy-only"}]));
    let servers = harness.store.list().await.expect("list");
    assert_eq!(servers.len(), 1);
    let result = harness.store.get(&name("legacy-only")).await;
    assert!(matches!(result, Err(RegistryStoreError::ServerNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_record_fields_survive_replacement(harness: Harness) {
    let seeded = json!({
        "servers": [{
            "name": "weather",
            "version": "0.9.0",
            "description": "old",
            "author": "ada",
            "lang": "python",
            "license": "MIT",
            "entrypoint": "main.py",
            "repository": {"type": "git", "url": "https://example.com/weather.git"},
            "pricing": null,
            "downloads": 42,
        }],
    });
    harness
        .blobs
        .put(
            "mcp.json",
            serde_json::to_vec(&seeded).expect("encode"),
            WritePrecondition::Unconditional,
        )
        .await
        .expect("seed");

    let record = harness
        .store
        .upsert(payload("weather", "1.0.0"))
        .await
        .expect("upsert succeeds");

    assert_eq!(record.retained_fields().get("downloads"), Some(&json!(42)));
    assert_eq!(stored_json(&harness.blobs)["servers"][0]["downloads"], json!(42));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_duplicates_fail_to_load(harness: Harness) {
    let record = json!({
        "name": "weather",
        "version": "1.0.0",
        "description": "d",
        "author": "a",
        "lang": "python",
        "license": "MIT",
        "entrypoint": "main.py",
        "repository": "https://example.com/weather.git",
    });
    let seeded = json!({ "servers": [record.clone(), record] });
    harness
        .blobs
        .put(
            "mcp.json",
            serde_json::to_vec(&seeded).expect("encode"),
            WritePrecondition::Unconditional,
        )
        .await
        .expect("seed");

    let result = harness.store.list().await;
    assert!(matches!(
        result,
        Err(RegistryStoreError::Document(
            RegistryDocumentError::DuplicateServerName(_)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn legacy_named_record_does_not_break_listing(harness: Harness) {
    let seeded = json!({
        "servers": [
            payload_value("weather", "1.0.0"),
            {
                "name": "Weather Server",
                "version": "0.1.0",
                "description": "d",
                "author": "a",
                "lang": "python",
                "license": "MIT",
                "entrypoint": "main.py",
                "repository": "example.com/legacy",
            },
        ],
    });
    harness
        .blobs
        .put(
            "mcp.json",
            serde_json::to_vec(&seeded).expect("encode"),
            WritePrecondition::Unconditional,
        )
        .await
        .expect("seed");

    let records = harness.store.list().await.expect("listing succeeds");

    assert_eq!(records.len(), 2);
    let summary = records.get(1).expect("legacy summary");
    assert_eq!(summary.name.as_str(), "Weather Server");
    let legacy = harness
        .store
        .get(&ServerName::from_stored("Weather Server"))
        .await
        .expect("legacy record resolves");
    assert!(legacy.name().validate().is_err());
    assert!(legacy.repository().url().validate().is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn custom_key_and_field_are_honoured() {
    let blobs = Arc::new(InMemoryBlobStore::new());
    let settings = RegistryStoreSettings::default()
        .with_key("registry/hub.json")
        .with_document_field("mcp_servers");
    let store = RegistryStore::with_settings(
        Arc::clone(&blobs),
        Arc::new(SteppingClock::new()),
        settings,
    );

    store
        .upsert(payload("weather", "1.0.0"))
        .await
        .expect("upsert succeeds");

    let bytes = blobs
        .raw("registry/hub.json")
        .expect("readable")
        .expect("stored under custom key");
    let stored: Value = serde_json::from_slice(&bytes).expect("json");
    assert!(stored.get("mcp_servers").is_some());
    assert!(stored.get("servers").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unavailable_storage_surfaces_as_storage_error() {
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_get()
        .returning(|_| Err(BlobStoreError::unavailable(std::io::Error::other("offline"))));
    let store = RegistryStore::new(Arc::new(blobs), Arc::new(SteppingClock::new()));

    let result = store.upsert(payload("weather", "1.0.0")).await;
    assert!(matches!(result, Err(RegistryStoreError::Storage(_))));
}
