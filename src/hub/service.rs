//! The hub facade: registry operations plus pull and run.

use super::{HubServiceError, PullReceipt, ServerListing};
use crate::launcher::{
    domain::{Entrypoint, ExecutionOutcome, Placement, Workspace, WorkspacePolicy},
    ports::{ProcessExecutor, RepositoryFetcher},
    services::{Fetcher, Launcher, LauncherError},
};
use crate::registry::{
    domain::{ServerName, ServerPayload, ServerRecord},
    ports::BlobStore,
    services::RegistryStore,
};
use mockable::Clock;
use serde_json::Value;
use tracing::Instrument;

/// Result type for hub operations.
pub type HubServiceResult<T> = Result<T, HubServiceError>;

/// Wires the registry store, fetcher and launcher behind the hub's
/// operations.
#[derive(Clone)]
pub struct HubService<B, C, F, E>
where
    B: BlobStore,
    C: Clock + Send + Sync,
    F: RepositoryFetcher,
    E: ProcessExecutor,
{
    store: RegistryStore<B, C>,
    fetcher: Fetcher<F>,
    launcher: Launcher<E>,
    policy: WorkspacePolicy,
}

impl<B, C, F, E> HubService<B, C, F, E>
where
    B: BlobStore,
    C: Clock + Send + Sync,
    F: RepositoryFetcher,
    E: ProcessExecutor,
{
    /// Creates a hub service.
    #[must_use]
    pub const fn new(
        store: RegistryStore<B, C>,
        fetcher: Fetcher<F>,
        launcher: Launcher<E>,
        policy: WorkspacePolicy,
    ) -> Self {
        Self {
            store,
            fetcher,
            launcher,
            policy,
        }
    }

    /// Returns the registry store.
    #[must_use]
    pub const fn store(&self) -> &RegistryStore<B, C> {
        &self.store
    }

    /// Returns the workspace policy.
    #[must_use]
    pub const fn policy(&self) -> WorkspacePolicy {
        self.policy
    }

    /// Lists every registered server.
    ///
    /// # Errors
    ///
    /// Returns [`HubServiceError::Registry`] when the document cannot be
    /// loaded.
    pub async fn list_servers(&self) -> HubServiceResult<ServerListing> {
        Ok(self.store.list().await?.into())
    }

    /// Returns the full record of `name`.
    ///
    /// Records stored under legacy names that registration would now reject
    /// can still be looked up.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank names and a not-found error when
    /// no such server is registered.
    pub async fn get_server(&self, name: &str) -> HubServiceResult<ServerRecord> {
        let server_name = ServerName::lookup(name)?;
        Ok(self.store.get(&server_name).await?)
    }

    /// Validates `payload` and inserts or replaces the server it names.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first missing or invalid field,
    /// or a registry error when the document cannot be saved.
    pub async fn create_or_upsert_server(&self, payload: &Value) -> HubServiceResult<ServerRecord> {
        let parsed = ServerPayload::from_value(payload)?;
        Ok(self.store.upsert(parsed).await?)
    }

    /// Clones the repository of `name` into a workspace.
    ///
    /// Ephemeral workspaces are deleted before this returns; the receipt
    /// only identifies them. Persistent workspaces stay in place.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown servers, a validation error when
    /// the stored name or URL is unusable, and a dependency error when the
    /// clone fails.
    pub async fn pull(&self, name: &str) -> HubServiceResult<PullReceipt> {
        let record = self.get_server(name).await?;
        check_fetchable(&record)?;
        let placement = Placement::for_policy(self.policy, record.name());
        let workspace = self
            .fetcher
            .clone_repository(record.repository().url(), &placement)
            .await?;

        let receipt = PullReceipt {
            workspace_id: workspace.id(),
            clone_path: (workspace.policy() == WorkspacePolicy::Persistent)
                .then(|| workspace.root().to_owned()),
            policy: workspace.policy(),
        };
        self.fetcher.release(workspace).await;
        Ok(receipt)
    }

    /// Fetches and runs the entrypoint of `name`.
    ///
    /// The stored name and URL, the declared language and the entrypoint path
    /// are validated before anything is cloned. Under the ephemeral policy the workspace is
    /// deleted on every exit path; under the persistent policy an existing
    /// clone is reused.
    ///
    /// # Errors
    ///
    /// Returns validation, not-found or dependency errors. Non-zero exits and
    /// timeouts are returned as [`ExecutionOutcome`] values.
    pub async fn run(&self, name: &str) -> HubServiceResult<ExecutionOutcome> {
        let record = self.get_server(name).await?;
        check_fetchable(&record)?;
        self.launcher
            .interpreter_for(record.lang())
            .map_err(LauncherError::from)?;
        Entrypoint::new(record.entrypoint())
            .map_err(LauncherError::from)?;

        let span = tracing::info_span!("run_server", server = %record.name());
        async {
            let workspace = self.workspace_for(&record).await?;
            let result = self
                .launcher
                .run(&workspace, record.entrypoint(), record.lang())
                .await;
            self.fetcher.release(workspace).await;
            Ok::<_, HubServiceError>(result?)
        }
        .instrument(span)
        .await
    }

    async fn workspace_for(&self, record: &ServerRecord) -> HubServiceResult<Workspace> {
        if self.policy == WorkspacePolicy::Persistent
            && let Some(existing) = self.fetcher.existing_persistent(record.name()).await?
        {
            tracing::debug!(path = %existing.root(), "reusing persistent workspace");
            return Ok(existing);
        }
        let placement = Placement::for_policy(self.policy, record.name());
        Ok(self
            .fetcher
            .clone_repository(record.repository().url(), &placement)
            .await?)
    }
}

/// Rejects records whose stored name or URL predates registration checks.
fn check_fetchable(record: &ServerRecord) -> HubServiceResult<()> {
    record.name().validate()?;
    record.repository().url().validate()?;
    Ok(())
}
