//! Port contracts for fetching repositories and running processes.

mod fetcher;
mod process;

#[cfg(test)]
pub use fetcher::MockRepositoryFetcher;
pub use fetcher::{RepositoryFetchError, RepositoryFetchResult, RepositoryFetcher};
#[cfg(test)]
pub use process::MockProcessExecutor;
pub use process::{
    ProcessCompletion, ProcessExecutionError, ProcessExecutionResult, ProcessExecutor,
    ProcessInvocation,
};
