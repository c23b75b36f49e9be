//! In-memory blob store for tests and local runs.

use crate::registry::ports::{
    BlobStore, BlobStoreError, BlobStoreResult, BlobVersion, StoredBlob, WritePrecondition,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory blob store with generation-numbered versions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    state: Arc<RwLock<InMemoryBlobState>>,
}

#[derive(Debug, Default)]
struct InMemoryBlobState {
    blobs: HashMap<String, (Vec<u8>, BlobVersion)>,
    generation: u64,
    unavailable: bool,
}

impl InMemoryBlobState {
    fn next_version(&mut self) -> BlobVersion {
        self.generation = self.generation.saturating_add(1);
        BlobVersion::new(self.generation.to_string())
    }
}

fn lock_error(err: impl std::fmt::Display) -> BlobStoreError {
    BlobStoreError::unavailable(std::io::Error::other(err.to_string()))
}

impl InMemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail as if the backend were down.
    ///
    /// # Errors
    ///
    /// Returns blob store errors when lock acquisition fails.
    pub fn set_unavailable(&self, unavailable: bool) -> BlobStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.unavailable = unavailable;
        Ok(())
    }

    /// Returns the raw bytes under `key` without checking availability.
    ///
    /// # Errors
    ///
    /// Returns blob store errors when lock acquisition fails.
    pub fn raw(&self, key: &str) -> BlobStoreResult<Option<Vec<u8>>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.blobs.get(key).map(|(bytes, _)| bytes.clone()))
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, key: &str) -> BlobStoreResult<Option<StoredBlob>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.unavailable {
            return Err(BlobStoreError::unavailable(std::io::Error::other(
                "in-memory blob store marked unavailable",
            )));
        }
        Ok(state.blobs.get(key).map(|(bytes, version)| StoredBlob {
            bytes: bytes.clone(),
            version: version.clone(),
        }))
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        precondition: WritePrecondition,
    ) -> BlobStoreResult<BlobVersion> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.unavailable {
            return Err(BlobStoreError::unavailable(std::io::Error::other(
                "in-memory blob store marked unavailable",
            )));
        }

        let current = state.blobs.get(key).map(|(_, version)| version);
        let satisfied = match (&precondition, current) {
            (WritePrecondition::Unconditional, _) | (WritePrecondition::Absent, None) => true,
            (WritePrecondition::Matches(expected), Some(stored)) => expected == stored,
            (WritePrecondition::Absent, Some(_)) | (WritePrecondition::Matches(_), None) => false,
        };
        if !satisfied {
            return Err(BlobStoreError::PreconditionFailed {
                key: key.to_owned(),
            });
        }

        let version = state.next_version();
        state
            .blobs
            .insert(key.to_owned(), (bytes, version.clone()));
        Ok(version)
    }
}
