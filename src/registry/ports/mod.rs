//! Port contracts for registry persistence.

mod blob;

#[cfg(test)]
pub use blob::MockBlobStore;
pub use blob::{
    BlobStore, BlobStoreError, BlobStoreResult, BlobVersion, StoredBlob, WritePrecondition,
};
