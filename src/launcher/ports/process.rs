//! Port for running a child process to completion under a deadline.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for process execution.
pub type ProcessExecutionResult<T> = Result<T, ProcessExecutionError>;

/// A fully specified child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    /// Program to run, resolved through `PATH` when not a path.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory of the child.
    pub working_dir: Utf8PathBuf,
    /// Wall-clock budget measured from spawn.
    pub timeout: Duration,
}

/// How a child process finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessCompletion {
    /// The process exited on its own or was killed by a signal.
    Exited {
        /// Exit code, or the negated signal number.
        code: i32,
        /// Captured stdout, lossily decoded.
        stdout: String,
        /// Captured stderr, lossily decoded.
        stderr: String,
    },
    /// The deadline passed and the process group was killed.
    TimedOut {
        /// Stdout captured before the kill.
        stdout: String,
        /// Stderr captured before the kill.
        stderr: String,
    },
}

/// Spawns and supervises child processes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Runs `invocation` with stdin closed and both output streams captured.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessExecutionError`] when the process cannot be spawned
    /// or supervised. Non-zero exits and timeouts are completions.
    async fn execute(
        &self,
        invocation: &ProcessInvocation,
    ) -> ProcessExecutionResult<ProcessCompletion>;
}

/// Errors returned by process executors.
#[derive(Debug, Clone, Error)]
pub enum ProcessExecutionError {
    /// The program could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Waiting on the child failed.
    #[error("failed to supervise child process: {0}")]
    Supervise(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProcessExecutionError {
    /// Wraps a spawn failure for `program`.
    pub fn spawn(
        program: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Spawn {
            program: program.into(),
            source: Arc::new(err),
        }
    }

    /// Wraps a supervision failure.
    pub fn supervise(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Supervise(Arc::new(err))
    }
}
