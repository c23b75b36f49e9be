//! Application services for the server registry.

mod store;

pub use store::{
    ConsistencyMode, DEFAULT_REGISTRY_KEY, RegistryStore, RegistryStoreError,
    RegistryStoreResult, RegistryStoreSettings, VersionedDocument,
};
