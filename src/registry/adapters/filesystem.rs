//! Local-directory blob store.
//!
//! Each key is a single file inside a capability-scoped directory. Writes go
//! to a temporary sibling and are renamed into place, so readers never see a
//! partially written document. The version token is the SHA-256 of the
//! contents.
//!
//! Conditional writes are checked and applied under a process-local lock.
//! Two processes sharing one directory are not serialized against each
//! other.

use crate::registry::ports::{
    BlobStore, BlobStoreError, BlobStoreResult, BlobVersion, StoredBlob, WritePrecondition,
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use sha2::{Digest, Sha256};
use std::io;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Blob store backed by files in one directory.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: Utf8PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FilesystemBlobStore {
    /// Opens (creating if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Unavailable`] when the directory cannot be
    /// created.
    pub fn open(root: impl Into<Utf8PathBuf>) -> BlobStoreResult<Self> {
        let root_path = root.into();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())
            .map_err(BlobStoreError::unavailable)?;
        Ok(Self {
            root: root_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

fn content_version(bytes: &[u8]) -> BlobVersion {
    BlobVersion::new(format!("{:x}", Sha256::digest(bytes)))
}

fn open_root(root: &Utf8Path) -> io::Result<Dir> {
    Dir::open_ambient_dir(root, ambient_authority())
}

fn read_blob(dir: &Dir, key: &str) -> io::Result<Option<StoredBlob>> {
    match dir.read(key) {
        Ok(bytes) => Ok(Some(StoredBlob {
            version: content_version(&bytes),
            bytes,
        })),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn write_blob(
    root: &Utf8Path,
    key: &str,
    bytes: &[u8],
    precondition: &WritePrecondition,
) -> BlobStoreResult<BlobVersion> {
    let dir = open_root(root).map_err(BlobStoreError::unavailable)?;
    let current = read_blob(&dir, key).map_err(BlobStoreError::unavailable)?;
    let satisfied = match (precondition, current.as_ref()) {
        (WritePrecondition::Unconditional, _) | (WritePrecondition::Absent, None) => true,
        (WritePrecondition::Matches(expected), Some(stored)) => *expected == stored.version,
        (WritePrecondition::Absent, Some(_)) | (WritePrecondition::Matches(_), None) => false,
    };
    if !satisfied {
        return Err(BlobStoreError::PreconditionFailed {
            key: key.to_owned(),
        });
    }

    let staging = format!(".{key}.{}.tmp", Uuid::new_v4());
    dir.write(&staging, bytes)
        .map_err(BlobStoreError::unavailable)?;
    if let Err(err) = dir.rename(&staging, &dir, key) {
        if let Err(cleanup) = dir.remove_file(&staging) {
            tracing::warn!(key, error = %cleanup, "failed to remove staged blob");
        }
        return Err(BlobStoreError::unavailable(err));
    }
    Ok(content_version(bytes))
}

fn join_error(err: &tokio::task::JoinError) -> BlobStoreError {
    BlobStoreError::unavailable(io::Error::other(format!("blob task join error: {err}")))
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn get(&self, key: &str) -> BlobStoreResult<Option<StoredBlob>> {
        let root = self.root.clone();
        let owned_key = key.to_owned();
        tokio::task::spawn_blocking(move || {
            let dir = open_root(&root)?;
            read_blob(&dir, &owned_key)
        })
        .await
        .map_err(|err| join_error(&err))?
        .map_err(BlobStoreError::unavailable)
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        precondition: WritePrecondition,
    ) -> BlobStoreResult<BlobVersion> {
        let _guard = self.write_lock.lock().await;
        let root = self.root.clone();
        let owned_key = key.to_owned();
        tokio::task::spawn_blocking(move || write_blob(&root, &owned_key, &bytes, &precondition))
            .await
            .map_err(|err| join_error(&err))?
    }
}
