//! Port for materializing a repository into a local directory.

use crate::registry::domain::RepositoryUrl;
use async_trait::async_trait;
use camino::Utf8Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for repository fetch operations.
pub type RepositoryFetchResult<T> = Result<T, RepositoryFetchError>;

/// Copies a remote repository into a destination directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    /// Fetches `url` into `destination`.
    ///
    /// `destination` is either absent or an empty directory.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryFetchError`] when the repository cannot be
    /// materialized.
    async fn fetch(&self, url: &RepositoryUrl, destination: &Utf8Path)
    -> RepositoryFetchResult<()>;
}

/// Errors returned by repository fetchers.
#[derive(Debug, Clone, Error)]
pub enum RepositoryFetchError {
    /// The fetch tool ran and reported failure.
    #[error("failed to fetch repository '{url}': {message}")]
    Failed {
        /// Repository that was requested.
        url: String,
        /// Diagnostic output of the fetch tool.
        message: String,
    },

    /// The fetch did not finish within its time budget.
    #[error("fetching repository '{url}' timed out after {timeout:?}")]
    TimedOut {
        /// Repository that was requested.
        url: String,
        /// Budget that elapsed.
        timeout: Duration,
    },

    /// The fetch tool could not be started or its I/O failed.
    #[error("repository fetcher unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryFetchError {
    /// Wraps an infrastructure error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
