//! Error types for registry domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDomainError {
    /// The server name is empty after trimming.
    #[error("server name must not be empty")]
    EmptyServerName,

    /// The server name contains characters that cannot key a directory.
    #[error(
        "server name '{0}' contains invalid characters (path separators, whitespace, control characters and a leading '.' are not allowed)"
    )]
    InvalidServerName(String),

    /// The server name exceeds the 100-character limit.
    #[error("server name exceeds 100 character limit: {0}")]
    ServerNameTooLong(String),

    /// The repository URL is empty after trimming.
    #[error("repository URL must not be empty")]
    EmptyRepositoryUrl,

    /// The repository URL has an unsupported scheme or shape.
    #[error(
        "repository URL '{0}' must use https, http, ssh, git or file, or the scp-like user@host:path form"
    )]
    InvalidRepositoryUrl(String),

    /// The repository field is neither a string nor a `{type, url}` object.
    #[error("repository must be a URL string or an object with a 'url' field")]
    InvalidRepositoryShape,

    /// The payload is not a JSON object.
    #[error("server payload must be a JSON object")]
    PayloadNotAnObject,

    /// A required payload key is missing or null.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A payload key is present but has the wrong type.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidField {
        /// Payload key.
        field: &'static str,
        /// Description of the problem.
        reason: String,
    },
}
