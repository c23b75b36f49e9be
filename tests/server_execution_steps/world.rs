//! Shared world state for server execution BDD scenarios.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mcphub::{
    hub::{HubService, HubServiceError},
    launcher::{
        adapters::{RecordingProcessExecutor, StaticRepositoryFetcher},
        domain::{ExecutionOutcome, WorkspacePolicy},
        ports::ProcessCompletion,
        services::{Fetcher, Launcher, LauncherSettings},
    },
    registry::{adapters::InMemoryBlobStore, services::RegistryStore},
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;
use tempfile::TempDir;

/// Hub type used by the BDD world.
pub type TestHub =
    HubService<InMemoryBlobStore, DefaultClock, StaticRepositoryFetcher, RecordingProcessExecutor>;

/// Scenario world for server execution behaviour tests.
pub struct ExecutionWorld {
    /// Scratch directory holding the workspace root.
    pub scratch: TempDir,
    /// Payloads registered before the hub is built.
    pub registrations: Vec<Value>,
    /// Files the repository source materializes.
    pub repository_files: Vec<String>,
    /// Completion the process double reports.
    pub completion: ProcessCompletion,
    /// Repository source, once the hub is built.
    pub source: Option<Arc<StaticRepositoryFetcher>>,
    /// Result of the last run.
    pub last_run: Option<Result<ExecutionOutcome, HubServiceError>>,
}

impl ExecutionWorld {
    /// Creates a world with no registrations and a succeeding process.
    ///
    /// # Panics
    ///
    /// Panics when the scratch directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scratch: TempDir::new().expect("scratch dir should be created"),
            registrations: Vec::new(),
            repository_files: Vec::new(),
            completion: ProcessCompletion::Exited {
                code: 0,
                stdout: "{}".to_owned(),
                stderr: String::new(),
            },
            source: None,
            last_run: None,
        }
    }

    /// Returns the workspace root under the scratch directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the scratch path is not UTF-8.
    pub fn workspace_root(&self) -> Result<Utf8PathBuf, eyre::Report> {
        Utf8PathBuf::from_path_buf(self.scratch.path().join("workspaces"))
            .map_err(|path| eyre::eyre!("scratch path is not UTF-8: {}", path.display()))
    }

    /// Builds the hub from the pending scenario state.
    ///
    /// # Errors
    ///
    /// Returns an error when the workspace root cannot be resolved.
    pub fn build_hub(&mut self) -> Result<TestHub, eyre::Report> {
        let source = Arc::new(StaticRepositoryFetcher::with_files(
            self.repository_files
                .iter()
                .map(|path| (path.as_str(), Vec::<u8>::new())),
        ));
        self.source = Some(Arc::clone(&source));
        Ok(HubService::new(
            RegistryStore::new(Arc::new(InMemoryBlobStore::new()), Arc::new(DefaultClock)),
            Fetcher::new(source, self.workspace_root()?),
            Launcher::new(
                Arc::new(RecordingProcessExecutor::new(self.completion.clone())),
                LauncherSettings::default(),
            ),
            WorkspacePolicy::Ephemeral,
        ))
    }
}

impl Default for ExecutionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ExecutionWorld {
    ExecutionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
