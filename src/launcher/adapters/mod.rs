//! Adapter implementations for the launcher ports.

pub mod git;
pub mod memory;
pub mod process;

pub use git::{DEFAULT_CLONE_TIMEOUT, GitCliFetcher};
pub use memory::{RecordingProcessExecutor, StaticRepositoryFetcher};
pub use process::{DEFAULT_EXECUTION_TIMEOUT, MAX_CAPTURE_BYTES, TokioProcessExecutor};
