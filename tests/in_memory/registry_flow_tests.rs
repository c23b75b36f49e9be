//! Registration, listing, and lookup through the hub facade.

use super::helpers::{HubHarness, harness, server_payload};
use mcphub::ErrorKind;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_servers_are_listed_in_registration_order(harness: HubHarness) {
    for name in ["weather", "maps", "clock"] {
        harness
            .hub
            .create_or_upsert_server(&server_payload(name, "python", "main.py"))
            .await
            .expect("registration should succeed");
    }

    let listing = harness.hub.list_servers().await.expect("listing should succeed");

    assert_eq!(listing.total, 3);
    let names: Vec<&str> = listing
        .servers
        .iter()
        .map(|summary| summary.name.as_str())
        .collect();
    assert_eq!(names, ["weather", "maps", "clock"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reregistration_replaces_without_duplicating(harness: HubHarness) {
    let first = harness
        .hub
        .create_or_upsert_server(&server_payload("weather", "python", "main.py"))
        .await
        .expect("first registration should succeed");
    let mut updated = server_payload("weather", "python", "app.py");
    updated["version"] = json!("2.0.0");

    let second = harness
        .hub
        .create_or_upsert_server(&updated)
        .await
        .expect("second registration should succeed");

    let listing = harness.hub.list_servers().await.expect("listing should succeed");
    assert_eq!(listing.total, 1);
    assert_eq!(second.version(), "2.0.0");
    assert_eq!(second.entrypoint(), "app.py");
    assert_eq!(
        first.meta().map(|meta| meta.created_at),
        second.meta().map(|meta| meta.created_at)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_record_carries_metadata_and_default_pricing(harness: HubHarness) {
    let mut payload = server_payload("weather", "node", "index.js");
    if let Some(fields) = payload.as_object_mut() {
        fields.remove("pricing");
    }
    harness
        .hub
        .create_or_upsert_server(&payload)
        .await
        .expect("registration should succeed");

    let record = harness
        .hub
        .get_server("weather")
        .await
        .expect("lookup should succeed");
    let body = serde_json::to_value(&record).expect("record should serialize");

    assert_eq!(body["pricing"], json!({"currency": "", "amount": 0}));
    assert!(body["meta"]["created_at"].is_string());
    assert!(body["meta"]["updated_at"].is_string());
    assert_eq!(record.repository().kind(), "git");
}

#[rstest]
#[case(json!([1, 2, 3]))]
#[case(json!({"name": "weather"}))]
#[case(json!({"name": "bad name", "version": "1", "description": "d", "author": "a",
    "lang": "python", "license": "MIT", "entrypoint": "main.py",
    "repository": "https://example.com/x.git"}))]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_payloads_are_validation_errors(
    harness: HubHarness,
    #[case] payload: serde_json::Value,
) {
    let err = harness
        .hub
        .create_or_upsert_server(&payload)
        .await
        .expect_err("payload should be rejected");

    assert_eq!(err.kind(), ErrorKind::Validation);
    let listing = harness.hub.list_servers().await.expect("listing should succeed");
    assert_eq!(listing.total, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookup_is_case_sensitive(harness: HubHarness) {
    harness
        .hub
        .create_or_upsert_server(&server_payload("weather", "python", "main.py"))
        .await
        .expect("registration should succeed");

    let err = harness
        .hub
        .get_server("Weather")
        .await
        .expect_err("different case should not match");

    assert_eq!(err.kind(), ErrorKind::NotFound);
}
