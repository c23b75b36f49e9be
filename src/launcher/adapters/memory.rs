//! In-memory launcher adapters for tests and offline use.

use crate::launcher::ports::{
    ProcessCompletion, ProcessExecutionResult, ProcessExecutor, ProcessInvocation,
    RepositoryFetchError, RepositoryFetchResult, RepositoryFetcher,
};
use crate::registry::domain::RepositoryUrl;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Fetcher that writes a fixed file tree instead of contacting a remote.
///
/// Each fetch recreates the same files under the destination. A fetcher
/// built with [`StaticRepositoryFetcher::failing`] rejects every fetch.
#[derive(Debug, Clone, Default)]
pub struct StaticRepositoryFetcher {
    files: Arc<BTreeMap<Utf8PathBuf, Vec<u8>>>,
    failure: Option<String>,
    fetches: Arc<AtomicUsize>,
    destinations: Arc<Mutex<Vec<Utf8PathBuf>>>,
}

impl StaticRepositoryFetcher {
    /// Creates a fetcher that materializes `files`, keyed by relative path.
    #[must_use]
    pub fn with_files<I, P, B>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<Utf8PathBuf>,
        B: Into<Vec<u8>>,
    {
        Self {
            files: Arc::new(
                files
                    .into_iter()
                    .map(|(path, bytes)| (path.into(), bytes.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Creates a fetcher whose fetches fail with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Returns how many fetches were attempted.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Returns the destinations of every attempted fetch, in order.
    #[must_use]
    pub fn destinations(&self) -> Vec<Utf8PathBuf> {
        self.destinations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn materialize(files: &BTreeMap<Utf8PathBuf, Vec<u8>>, root: &Utf8Path) -> io::Result<()> {
        std::fs::create_dir_all(root)?;
        for (relative, bytes) in files {
            let target = root.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, bytes)?;
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryFetcher for StaticRepositoryFetcher {
    async fn fetch(
        &self,
        url: &RepositoryUrl,
        destination: &Utf8Path,
    ) -> RepositoryFetchResult<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.destinations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination.to_owned());

        if let Some(message) = &self.failure {
            return Err(RepositoryFetchError::Failed {
                url: url.as_str().to_owned(),
                message: message.clone(),
            });
        }

        let files = Arc::clone(&self.files);
        let root = destination.to_owned();
        tokio::task::spawn_blocking(move || Self::materialize(&files, &root))
            .await
            .map_err(RepositoryFetchError::unavailable)?
            .map_err(RepositoryFetchError::unavailable)
    }
}

/// Executor that records invocations and answers with a preset completion.
#[derive(Debug, Clone)]
pub struct RecordingProcessExecutor {
    completion: ProcessCompletion,
    invocations: Arc<Mutex<Vec<ProcessInvocation>>>,
}

impl RecordingProcessExecutor {
    /// Creates an executor that always returns `completion`.
    #[must_use]
    pub fn new(completion: ProcessCompletion) -> Self {
        Self {
            completion,
            invocations: Arc::default(),
        }
    }

    /// Creates an executor reporting a zero exit with `stdout`.
    #[must_use]
    pub fn succeeding(stdout: impl Into<String>) -> Self {
        Self::new(ProcessCompletion::Exited {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        })
    }

    /// Returns recorded invocations, oldest first.
    #[must_use]
    pub fn invocations(&self) -> Vec<ProcessInvocation> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ProcessExecutor for RecordingProcessExecutor {
    async fn execute(
        &self,
        invocation: &ProcessInvocation,
    ) -> ProcessExecutionResult<ProcessCompletion> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());
        Ok(self.completion.clone())
    }
}
