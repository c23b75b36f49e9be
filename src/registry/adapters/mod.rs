//! Adapter implementations for registry ports.

pub mod filesystem;
pub mod memory;

pub use filesystem::FilesystemBlobStore;
pub use memory::InMemoryBlobStore;
