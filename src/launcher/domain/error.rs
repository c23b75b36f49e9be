//! Error types for launcher domain validation.

use thiserror::Error;

/// Errors returned when a declared language or entrypoint is unusable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LauncherDomainError {
    /// The declared language has no interpreter mapping.
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    /// The entrypoint is empty after trimming.
    #[error("entrypoint must not be empty")]
    EmptyEntrypoint,

    /// The entrypoint is an absolute path.
    #[error("entrypoint must be relative to the repository root: '{0}'")]
    AbsoluteEntrypoint(String),

    /// The entrypoint climbs out of the workspace.
    #[error("entrypoint escapes the workspace: '{0}'")]
    EntrypointEscapesWorkspace(String),

    /// The workspace policy value is not recognized.
    #[error("unknown workspace policy: '{0}'")]
    UnknownWorkspacePolicy(String),
}
