//! Registry store: load, query and upsert the single registry document.

use crate::registry::{
    domain::{
        DEFAULT_DOCUMENT_FIELD, RegistryDocument, RegistryDocumentError, RegistryDomainError,
        ServerName, ServerPayload, ServerRecord, ServerSummary, UpsertDisposition,
    },
    ports::{BlobStore, BlobStoreError, BlobVersion, WritePrecondition},
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Default storage key of the registry document.
pub const DEFAULT_REGISTRY_KEY: &str = "mcp.json";

/// How a read-modify-write cycle protects against concurrent writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsistencyMode {
    /// Saves are conditional on the version that was read. A concurrent
    /// writer makes the later save fail with
    /// [`RegistryStoreError::Conflict`]; nothing is retried.
    #[default]
    Optimistic,
    /// Saves overwrite whatever is stored. Concurrent upserts can silently
    /// lose all but the last writer's change.
    LastWriterWins,
}

impl ConsistencyMode {
    /// Returns the configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimistic => "optimistic",
            Self::LastWriterWins => "last_writer_wins",
        }
    }
}

impl fmt::Display for ConsistencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ConsistencyMode {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Ok(Self::Optimistic),
            "last_writer_wins" | "lww" => Ok(Self::LastWriterWins),
            _ => Err(value.to_owned()),
        }
    }
}

/// Where and how the registry document is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStoreSettings {
    key: String,
    document_field: String,
    consistency: ConsistencyMode,
}

impl Default for RegistryStoreSettings {
    fn default() -> Self {
        Self {
            key: DEFAULT_REGISTRY_KEY.to_owned(),
            document_field: DEFAULT_DOCUMENT_FIELD.to_owned(),
            consistency: ConsistencyMode::default(),
        }
    }
}

impl RegistryStoreSettings {
    /// Sets the blob key holding the document.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the top-level field holding the server array.
    #[must_use]
    pub fn with_document_field(mut self, field: impl Into<String>) -> Self {
        self.document_field = field.into();
        self
    }

    /// Sets the consistency mode.
    #[must_use]
    pub const fn with_consistency(mut self, consistency: ConsistencyMode) -> Self {
        self.consistency = consistency;
        self
    }

    /// Returns the blob key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the server array field.
    #[must_use]
    pub fn document_field(&self) -> &str {
        &self.document_field
    }

    /// Returns the consistency mode.
    #[must_use]
    pub const fn consistency(&self) -> ConsistencyMode {
        self.consistency
    }
}

/// Errors returned by [`RegistryStore`].
#[derive(Debug, Error)]
pub enum RegistryStoreError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),

    /// No registry document has been stored yet.
    #[error("registry document '{0}' not found")]
    DocumentNotFound(String),

    /// No record has the requested name.
    #[error("server '{0}' not found")]
    ServerNotFound(ServerName),

    /// The stored document could not be decoded or encoded.
    #[error(transparent)]
    Document(#[from] RegistryDocumentError),

    /// Another writer saved the document after it was read.
    #[error("registry document '{key}' was modified concurrently; reload and retry")]
    Conflict {
        /// Storage key.
        key: String,
    },

    /// The blob store failed.
    #[error(transparent)]
    Storage(BlobStoreError),
}

impl From<BlobStoreError> for RegistryStoreError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::PreconditionFailed { key } => Self::Conflict { key },
            BlobStoreError::Unavailable(_) => Self::Storage(err),
        }
    }
}

/// Result type for registry store operations.
pub type RegistryStoreResult<T> = Result<T, RegistryStoreError>;

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDocument {
    /// Decoded document.
    pub document: RegistryDocument,
    /// Version read, or `None` when no blob was stored.
    pub version: Option<BlobVersion>,
}

/// Registry persistence over a single JSON blob.
#[derive(Clone)]
pub struct RegistryStore<B, C>
where
    B: BlobStore,
    C: Clock + Send + Sync,
{
    blobs: Arc<B>,
    clock: Arc<C>,
    settings: RegistryStoreSettings,
}

impl<B, C> RegistryStore<B, C>
where
    B: BlobStore,
    C: Clock + Send + Sync,
{
    /// Creates a store with default settings.
    #[must_use]
    pub fn new(blobs: Arc<B>, clock: Arc<C>) -> Self {
        Self::with_settings(blobs, clock, RegistryStoreSettings::default())
    }

    /// Creates a store with explicit settings.
    #[must_use]
    pub const fn with_settings(
        blobs: Arc<B>,
        clock: Arc<C>,
        settings: RegistryStoreSettings,
    ) -> Self {
        Self {
            blobs,
            clock,
            settings,
        }
    }

    /// Returns the store settings.
    #[must_use]
    pub const fn settings(&self) -> &RegistryStoreSettings {
        &self.settings
    }

    /// Loads the document with its version.
    ///
    /// # Errors
    ///
    /// Returns storage and document decoding errors.
    pub async fn load_versioned(&self) -> RegistryStoreResult<VersionedDocument> {
        let Some(blob) = self.blobs.get(self.settings.key()).await? else {
            return Ok(VersionedDocument {
                document: RegistryDocument::empty(),
                version: None,
            });
        };
        let document = RegistryDocument::from_json(&blob.bytes, self.settings.document_field())?;
        Ok(VersionedDocument {
            document,
            version: Some(blob.version),
        })
    }

    /// Loads the document; an absent blob yields an empty document.
    ///
    /// # Errors
    ///
    /// Returns storage and document decoding errors.
    pub async fn load(&self) -> RegistryStoreResult<RegistryDocument> {
        Ok(self.load_versioned().await?.document)
    }

    /// Returns the record named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryStoreError::DocumentNotFound`] when no document is
    /// stored, [`RegistryStoreError::ServerNotFound`] when no record has the
    /// name, or storage and decoding errors.
    pub async fn get(&self, name: &ServerName) -> RegistryStoreResult<ServerRecord> {
        let VersionedDocument { document, version } = self.load_versioned().await?;
        if version.is_none() {
            return Err(RegistryStoreError::DocumentNotFound(
                self.settings.key().to_owned(),
            ));
        }
        document
            .find(name)
            .cloned()
            .ok_or_else(|| RegistryStoreError::ServerNotFound(name.clone()))
    }

    /// Returns the public projection of every record, in stored order.
    ///
    /// # Errors
    ///
    /// Returns storage and document decoding errors.
    pub async fn list(&self) -> RegistryStoreResult<Vec<ServerSummary>> {
        let document = self.load().await?;
        Ok(document.servers().iter().map(ServerSummary::from).collect())
    }

    /// Inserts or replaces a record and persists the whole document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryStoreError::Conflict`] in optimistic mode when the
    /// document changed between load and save, or storage and encoding
    /// errors.
    pub async fn upsert(&self, payload: ServerPayload) -> RegistryStoreResult<ServerRecord> {
        let VersionedDocument {
            mut document,
            version,
        } = self.load_versioned().await?;

        let (record, disposition) = document.upsert(payload, self.clock.utc());
        self.save(&document, version).await?;

        tracing::info!(
            server = %record.name(),
            inserted = disposition == UpsertDisposition::Inserted,
            consistency = %self.settings.consistency(),
            "stored server record"
        );
        Ok(record)
    }

    /// Persists `document`, conditioned on `read_version` in optimistic mode.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryStoreError::Conflict`] when the condition fails, or
    /// storage and encoding errors.
    pub async fn save(
        &self,
        document: &RegistryDocument,
        read_version: Option<BlobVersion>,
    ) -> RegistryStoreResult<BlobVersion> {
        let bytes = document.to_json(self.settings.document_field())?;
        let precondition = match (self.settings.consistency(), read_version) {
            (ConsistencyMode::LastWriterWins, _) => WritePrecondition::Unconditional,
            (ConsistencyMode::Optimistic, None) => WritePrecondition::Absent,
            (ConsistencyMode::Optimistic, Some(version)) => WritePrecondition::Matches(version),
        };

        let result = self
            .blobs
            .put(self.settings.key(), bytes, precondition)
            .await;
        if let Err(BlobStoreError::PreconditionFailed { key }) = &result {
            tracing::warn!(key = %key, "registry document changed concurrently; save rejected");
        }
        Ok(result?)
    }
}
