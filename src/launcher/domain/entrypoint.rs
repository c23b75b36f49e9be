//! Repository-relative entrypoint paths.

use super::LauncherDomainError;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fmt;

/// Relative path of the file an interpreter runs, validated lexically.
///
/// Absolute paths and `..` components are rejected. Whether the file exists
/// and stays inside the workspace once symlinks are followed is checked
/// against the workspace at launch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrypoint(Utf8PathBuf);

impl Entrypoint {
    /// Validates an entrypoint declared by a server record.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherDomainError`] for empty, absolute or escaping paths.
    pub fn new(value: &str) -> Result<Self, LauncherDomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LauncherDomainError::EmptyEntrypoint);
        }
        let path = Utf8Path::new(trimmed);
        if path.has_root() || trimmed.starts_with('\\') {
            return Err(LauncherDomainError::AbsoluteEntrypoint(trimmed.to_owned()));
        }

        let mut normalized = Utf8PathBuf::new();
        for component in path.components() {
            match component {
                Utf8Component::Normal(part) => normalized.push(part),
                Utf8Component::CurDir => {}
                Utf8Component::ParentDir => {
                    return Err(LauncherDomainError::EntrypointEscapesWorkspace(
                        trimmed.to_owned(),
                    ));
                }
                Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                    return Err(LauncherDomainError::AbsoluteEntrypoint(trimmed.to_owned()));
                }
            }
        }
        if normalized.as_str().is_empty() {
            return Err(LauncherDomainError::EmptyEntrypoint);
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized relative path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        &self.0
    }
}

impl fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
