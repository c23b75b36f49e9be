//! Workspace placement around a repository fetcher.

use crate::launcher::{
    domain::{Placement, Workspace, WorkspaceId, WorkspacePolicy},
    ports::{RepositoryFetchError, RepositoryFetcher},
};
use crate::registry::domain::{RepositoryUrl, ServerName};
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`Fetcher`].
#[derive(Debug, Error)]
pub enum FetcherError {
    /// The workspace directory could not be prepared.
    #[error("failed to prepare workspace at '{path}': {source}")]
    Workspace {
        /// Directory being prepared.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The repository could not be fetched.
    #[error(transparent)]
    Fetch(#[from] RepositoryFetchError),
}

/// Result type for fetcher operations.
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Clones repositories into workspaces under one root directory.
#[derive(Clone)]
pub struct Fetcher<F>
where
    F: RepositoryFetcher,
{
    fetcher: Arc<F>,
    workspace_root: Utf8PathBuf,
}

impl<F> Fetcher<F>
where
    F: RepositoryFetcher,
{
    /// Creates a fetcher placing workspaces under `workspace_root`.
    #[must_use]
    pub fn new(fetcher: Arc<F>, workspace_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            fetcher,
            workspace_root: workspace_root.into(),
        }
    }

    /// Returns the directory holding all workspaces.
    #[must_use]
    pub fn workspace_root(&self) -> &Utf8Path {
        &self.workspace_root
    }

    /// Clones `url` into a workspace placed according to `placement`.
    ///
    /// An ephemeral workspace is deleted again when the clone fails. A
    /// persistent workspace replaces any directory already present for the
    /// server.
    ///
    /// # Errors
    ///
    /// Returns [`FetcherError`] when the workspace cannot be prepared or the
    /// fetch fails.
    pub async fn clone_repository(
        &self,
        url: &RepositoryUrl,
        placement: &Placement,
    ) -> FetcherResult<Workspace> {
        let id = WorkspaceId::new();
        let workspace = match placement {
            Placement::Ephemeral => self.ephemeral_workspace(id).await?,
            Placement::Persistent(name) => self.persistent_workspace(id, name).await?,
        };

        tracing::info!(
            url = %url,
            workspace = %id,
            policy = %workspace.policy(),
            "fetching repository"
        );
        if let Err(err) = self.fetcher.fetch(url, workspace.root()).await {
            tracing::warn!(url = %url, error = %err, "repository fetch failed");
            self.discard(workspace).await;
            return Err(err.into());
        }
        Ok(workspace)
    }

    /// Returns the persistent workspace of `name` when one was fetched
    /// before.
    ///
    /// # Errors
    ///
    /// Returns [`FetcherError::Workspace`] when the directory cannot be
    /// inspected.
    pub async fn existing_persistent(
        &self,
        name: &ServerName,
    ) -> FetcherResult<Option<Workspace>> {
        let path = self.persistent_path(name);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => {
                Ok(Some(Workspace::persistent(WorkspaceId::new(), path)))
            }
            Ok(_) => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FetcherError::Workspace { path, source }),
        }
    }

    fn persistent_path(&self, name: &ServerName) -> Utf8PathBuf {
        self.workspace_root.join(name.as_str())
    }

    async fn ensure_root(&self) -> FetcherResult<()> {
        tokio::fs::create_dir_all(&self.workspace_root)
            .await
            .map_err(|source| FetcherError::Workspace {
                path: self.workspace_root.clone(),
                source,
            })
    }

    async fn ephemeral_workspace(&self, id: WorkspaceId) -> FetcherResult<Workspace> {
        self.ensure_root().await?;
        let root = self.workspace_root.clone();
        let prefix = format!("{id}-");
        let created = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix(&prefix).tempdir_in(&root)
        })
        .await
        .map_err(|err| FetcherError::Workspace {
            path: self.workspace_root.clone(),
            source: io::Error::other(err),
        })?;

        let dir = created.map_err(|source| FetcherError::Workspace {
            path: self.workspace_root.clone(),
            source,
        })?;
        Workspace::ephemeral(id, dir).map_err(|_| FetcherError::Workspace {
            path: self.workspace_root.clone(),
            source: io::Error::new(
                io::ErrorKind::InvalidData,
                "workspace path is not valid UTF-8",
            ),
        })
    }

    async fn persistent_workspace(
        &self,
        id: WorkspaceId,
        name: &ServerName,
    ) -> FetcherResult<Workspace> {
        self.ensure_root().await?;
        let path = self.persistent_path(name);
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => tracing::debug!(path = %path, "removed previous persistent workspace"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(FetcherError::Workspace { path, source }),
        }
        Ok(Workspace::persistent(id, path))
    }

    /// Deletes an ephemeral workspace; persistent workspaces are kept.
    ///
    /// Deletion failures are logged, not returned.
    pub async fn release(&self, workspace: Workspace) {
        let id = workspace.id();
        let root = workspace.root().to_owned();
        match tokio::task::spawn_blocking(move || workspace.release()).await {
            Ok(Ok(())) => tracing::debug!(workspace = %id, "released workspace"),
            Ok(Err(err)) => {
                tracing::warn!(path = %root, error = %err, "failed to delete workspace");
            }
            Err(err) => {
                tracing::warn!(path = %root, error = %err, "workspace cleanup task failed");
            }
        }
    }

    async fn discard(&self, workspace: Workspace) {
        let partial = (workspace.policy() == WorkspacePolicy::Persistent)
            .then(|| workspace.root().to_owned());
        self.release(workspace).await;

        let Some(path) = partial else {
            return;
        };
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "failed to delete partial clone");
            }
        }
    }
}
