//! Pull and run flows against a static repository source.

use super::helpers::{HubHarness, harness, harness_with, leftover_workspaces, server_payload};
use mcphub::{
    ErrorKind,
    launcher::{
        adapters::{RecordingProcessExecutor, StaticRepositoryFetcher},
        domain::{ExecutionOutcome, WorkspacePolicy},
        ports::ProcessCompletion,
    },
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_run_gets_a_fresh_workspace(harness: HubHarness) {
    harness
        .hub
        .create_or_upsert_server(&server_payload("weather", "python", "main.py"))
        .await
        .expect("registration should succeed");

    harness.hub.run("weather").await.expect("first run should complete");
    harness.hub.run("weather").await.expect("second run should complete");

    let destinations = harness.source.destinations();
    assert_eq!(destinations.len(), 2);
    assert_ne!(destinations.first(), destinations.get(1));
    assert!(destinations.iter().all(|path| !path.exists()));
    assert_eq!(leftover_workspaces(&harness.workspace_root), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plain_text_output_is_wrapped() {
    let harness = harness_with(
        WorkspacePolicy::Ephemeral,
        StaticRepositoryFetcher::with_files([("server.js", "")]),
        RecordingProcessExecutor::new(ProcessCompletion::Exited {
            code: 0,
            stdout: "ready\n".to_owned(),
            stderr: "deprecation notice".to_owned(),
        }),
    );
    harness
        .hub
        .create_or_upsert_server(&server_payload("maps", "javascript", "server.js"))
        .await
        .expect("registration should succeed");

    let outcome = harness.hub.run("maps").await.expect("run should complete");

    assert!(outcome.is_success());
    assert_eq!(
        outcome.into_body(),
        json!({"output": "ready", "stderr": "deprecation notice"})
    );
    let invocations = harness.executor.invocations();
    let invocation = invocations.first().expect("one process should be spawned");
    assert_eq!(invocation.program, "node");
    assert_eq!(invocation.args, ["server.js"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_run_reports_return_code_and_streams() {
    let harness = harness_with(
        WorkspacePolicy::Ephemeral,
        StaticRepositoryFetcher::with_files([("main.py", "")]),
        RecordingProcessExecutor::new(ProcessCompletion::Exited {
            code: 3,
            stdout: "partial".to_owned(),
            stderr: "Traceback".to_owned(),
        }),
    );
    harness
        .hub
        .create_or_upsert_server(&server_payload("weather", "python", "main.py"))
        .await
        .expect("registration should succeed");

    let outcome = harness.hub.run("weather").await.expect("run should complete");

    assert!(matches!(
        outcome,
        ExecutionOutcome::Failed { return_code: 3, .. }
    ));
    assert_eq!(outcome.error_kind(), Some(ErrorKind::ExecutionFailure));
    let body = outcome.to_body();
    assert_eq!(body["stdout"], json!("partial"));
    assert_eq!(body["stderr"], json!("Traceback"));
    assert_eq!(leftover_workspaces(&harness.workspace_root), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persistent_pull_twice_replaces_the_clone() {
    let harness = harness_with(
        WorkspacePolicy::Persistent,
        StaticRepositoryFetcher::with_files([("main.py", "print('hi')")]),
        RecordingProcessExecutor::succeeding("{}"),
    );
    harness
        .hub
        .create_or_upsert_server(&server_payload("weather", "python", "main.py"))
        .await
        .expect("registration should succeed");

    let first = harness.hub.pull("weather").await.expect("first pull should succeed");
    let clone_path = first.clone_path.clone().expect("persistent pull has a path");
    std::fs::write(clone_path.join("stale.txt"), "old").expect("marker should be written");

    let second = harness.hub.pull("weather").await.expect("second pull should succeed");

    assert_eq!(second.clone_path.as_ref(), Some(&clone_path));
    assert_ne!(first.workspace_id, second.workspace_id);
    assert!(!clone_path.join("stale.txt").exists());
    assert!(clone_path.join("main.py").is_file());
    assert_eq!(harness.source.fetch_count(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pull_of_unknown_server_clones_nothing(harness: HubHarness) {
    let err = harness.hub.pull("weather").await.expect_err("server is unknown");

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(harness.source.fetch_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_pull_is_a_dependency_failure() {
    let harness = harness_with(
        WorkspacePolicy::Ephemeral,
        StaticRepositoryFetcher::failing("repository not found"),
        RecordingProcessExecutor::succeeding("{}"),
    );
    harness
        .hub
        .create_or_upsert_server(&server_payload("weather", "python", "main.py"))
        .await
        .expect("registration should succeed");

    let err = harness.hub.pull("weather").await.expect_err("clone should fail");

    assert_eq!(err.kind(), ErrorKind::DependencyFailure);
    assert_eq!(leftover_workspaces(&harness.workspace_root), 0);
}
