//! Shared test helpers for hub integration tests.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use mcphub::{
    hub::HubService,
    launcher::{
        adapters::{RecordingProcessExecutor, StaticRepositoryFetcher},
        domain::WorkspacePolicy,
        services::{Fetcher, Launcher, LauncherSettings},
    },
    registry::{adapters::InMemoryBlobStore, ports::BlobStore, services::RegistryStore},
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Hub wired to in-memory adapters.
pub type MemoryHub =
    HubService<InMemoryBlobStore, DefaultClock, StaticRepositoryFetcher, RecordingProcessExecutor>;

/// Hub plus handles on the doubles behind it.
pub struct HubHarness {
    /// Keeps the workspace root alive for the test.
    pub scratch: TempDir,
    /// Directory workspaces are created under.
    pub workspace_root: Utf8PathBuf,
    /// Repository source shared with the hub.
    pub source: Arc<StaticRepositoryFetcher>,
    /// Process executor shared with the hub.
    pub executor: Arc<RecordingProcessExecutor>,
    /// Hub under test.
    pub hub: MemoryHub,
}

/// Creates a scratch directory and its UTF-8 path.
///
/// # Panics
///
/// Panics when the directory cannot be created or its path is not UTF-8.
#[must_use]
pub fn scratch_dir() -> (TempDir, Utf8PathBuf) {
    let scratch = TempDir::new().expect("temp dir should be created");
    let path = Utf8PathBuf::from_path_buf(scratch.path().to_path_buf())
        .expect("temp path should be UTF-8");
    (scratch, path)
}

/// Builds a hub over `blobs` with the given doubles.
#[must_use]
pub fn hub_over<B: BlobStore>(
    blobs: Arc<B>,
    workspace_root: &Utf8Path,
    source: Arc<StaticRepositoryFetcher>,
    executor: Arc<RecordingProcessExecutor>,
    policy: WorkspacePolicy,
) -> HubService<B, DefaultClock, StaticRepositoryFetcher, RecordingProcessExecutor> {
    HubService::new(
        RegistryStore::new(blobs, Arc::new(DefaultClock)),
        Fetcher::new(source, workspace_root.to_owned()),
        Launcher::new(executor, LauncherSettings::default()),
        policy,
    )
}

/// Builds a harness with explicit doubles.
#[must_use]
pub fn harness_with(
    policy: WorkspacePolicy,
    source: StaticRepositoryFetcher,
    executor: RecordingProcessExecutor,
) -> HubHarness {
    let (scratch, root) = scratch_dir();
    let workspace_root = root.join("workspaces");
    let source_arc = Arc::new(source);
    let executor_arc = Arc::new(executor);
    let hub = hub_over(
        Arc::new(InMemoryBlobStore::new()),
        &workspace_root,
        Arc::clone(&source_arc),
        Arc::clone(&executor_arc),
        policy,
    );
    HubHarness {
        scratch,
        workspace_root,
        source: source_arc,
        executor: executor_arc,
        hub,
    }
}

/// Provides an ephemeral-policy hub whose repository holds `main.py` and
/// whose processes print a JSON object.
#[fixture]
pub fn harness() -> HubHarness {
    harness_with(
        WorkspacePolicy::Ephemeral,
        StaticRepositoryFetcher::with_files([("main.py", "print('hi')")]),
        RecordingProcessExecutor::succeeding("{\"forecast\": \"sunny\"}"),
    )
}

/// Returns a complete registration payload.
#[must_use]
pub fn server_payload(name: &str, lang: &str, entrypoint: &str) -> Value {
    json!({
        "name": name,
        "version": "1.0.0",
        "description": "Weather lookups",
        "author": "ada",
        "lang": lang,
        "license": "MIT",
        "entrypoint": entrypoint,
        "repository": format!("https://example.com/{name}.git"),
        "pricing": {"currency": "INR", "amount": 49.0},
    })
}

/// Counts entries left under a workspace root.
#[must_use]
pub fn leftover_workspaces(root: &Utf8Path) -> usize {
    std::fs::read_dir(root).map_or(0, Iterator::count)
}
