//! Blob storage port holding the registry document.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for blob store operations.
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Opaque version token of a stored blob, comparable for equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobVersion(String);

impl BlobVersion {
    /// Wraps an adapter-specific version string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A blob read together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Blob contents.
    pub bytes: Vec<u8>,
    /// Version token to pass back on a conditional write.
    pub version: BlobVersion,
}

/// Condition a write must satisfy to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePrecondition {
    /// Write unconditionally; concurrent changes may be overwritten.
    Unconditional,
    /// Write only if no blob exists under the key.
    Absent,
    /// Write only if the stored blob still has this version.
    Matches(BlobVersion),
}

/// Key-value blob storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Reads the blob under `key`, or `None` when none is stored.
    async fn get(&self, key: &str) -> BlobStoreResult<Option<StoredBlob>>;

    /// Writes `bytes` under `key` if `precondition` holds.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::PreconditionFailed`] when the stored state
    /// does not satisfy `precondition`.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        precondition: WritePrecondition,
    ) -> BlobStoreResult<BlobVersion>;
}

/// Errors returned by blob store adapters.
#[derive(Debug, Clone, Error)]
pub enum BlobStoreError {
    /// The conditional write lost against a concurrent writer.
    #[error("blob '{key}' changed since it was read")]
    PreconditionFailed {
        /// Storage key.
        key: String,
    },

    /// The storage backend could not be reached or failed.
    #[error("blob storage unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl BlobStoreError {
    /// Wraps a backend failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
