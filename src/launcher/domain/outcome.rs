//! Results of running a server entrypoint.

use crate::error::ErrorKind;
use serde_json::{Value, json};
use std::time::Duration;

/// How a run ended.
///
/// Failures and timeouts are results, not errors: both carry the captured
/// streams so callers can report them.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The process exited with status zero.
    Succeeded {
        /// Normalized response body.
        body: Value,
    },
    /// The process exited non-zero or was killed by a signal.
    Failed {
        /// Exit code, or the negated signal number.
        return_code: i32,
        /// Captured stdout.
        stdout: String,
        /// Captured stderr.
        stderr: String,
    },
    /// The time budget ran out and the process group was killed.
    TimedOut {
        /// Budget that elapsed.
        budget: Duration,
        /// Stdout captured before the kill.
        stdout: String,
        /// Stderr captured before the kill.
        stderr: String,
    },
}

impl ExecutionOutcome {
    /// Returns `true` for a zero-exit run.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Classifies an unsuccessful run; `None` for success.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { .. } => Some(ErrorKind::ExecutionFailure),
            Self::TimedOut { .. } => Some(ErrorKind::ExecutionTimeout),
        }
    }

    /// Returns the response body for this outcome.
    #[must_use]
    pub fn to_body(&self) -> Value {
        match self {
            Self::Succeeded { body } => body.clone(),
            Self::Failed {
                return_code,
                stdout,
                stderr,
            } => json!({
                "error": format!("server process exited with return code {return_code}"),
                "stdout": stdout,
                "stderr": stderr,
                "return_code": return_code,
            }),
            Self::TimedOut {
                budget,
                stdout,
                stderr,
            } => json!({
                "error": format!(
                    "server process timed out after {} seconds",
                    budget.as_secs_f64()
                ),
                "stdout": stdout,
                "stderr": stderr,
                "timed_out": true,
            }),
        }
    }

    /// Consumes the outcome, returning its response body.
    #[must_use]
    pub fn into_body(self) -> Value {
        match self {
            Self::Succeeded { body } => body,
            other => other.to_body(),
        }
    }
}
