//! Caller-facing error classification.

use serde::Serialize;
use std::fmt;

/// Category of a failed hub operation.
///
/// Execution timeouts and failures are normally reported as run outcomes;
/// the kinds exist so those outcomes can be classified the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request was malformed or refers to something unusable.
    Validation,
    /// The named document, server or payment does not exist.
    NotFound,
    /// Storage, the repository host, an interpreter or the payment gateway
    /// failed.
    DependencyFailure,
    /// A run exceeded its time budget.
    ExecutionTimeout,
    /// A run exited non-zero.
    ExecutionFailure,
    /// An unexpected local failure.
    Internal,
}

impl ErrorKind {
    /// Returns the snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::DependencyFailure => "dependency_failure",
            Self::ExecutionTimeout => "execution_timeout",
            Self::ExecutionFailure => "execution_failure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
