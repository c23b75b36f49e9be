//! Workspaces: directories holding one cloned repository.

use super::LauncherDomainError;
use crate::registry::domain::ServerName;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fmt;
use tempfile::TempDir;
use uuid::Uuid;

/// Identifier reported for a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkspaceId(Uuid);

impl WorkspaceId {
    /// Creates a random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether workspaces outlive the request that created them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspacePolicy {
    /// A fresh directory per request, deleted when released or dropped.
    #[default]
    Ephemeral,
    /// One directory per server name, replaced on every fetch.
    Persistent,
}

impl WorkspacePolicy {
    /// Returns the configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ephemeral => "ephemeral",
            Self::Persistent => "persistent",
        }
    }
}

impl fmt::Display for WorkspacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkspacePolicy {
    type Error = LauncherDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ephemeral" => Ok(Self::Ephemeral),
            "persistent" => Ok(Self::Persistent),
            _ => Err(LauncherDomainError::UnknownWorkspacePolicy(value.to_owned())),
        }
    }
}

/// Where a single fetch places its clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// A uniquely named directory under the workspace root.
    Ephemeral,
    /// `<workspace root>/<server name>`.
    Persistent(ServerName),
}

impl Placement {
    /// Chooses the placement for `name` under `policy`.
    #[must_use]
    pub fn for_policy(policy: WorkspacePolicy, name: &ServerName) -> Self {
        match policy {
            WorkspacePolicy::Ephemeral => Self::Ephemeral,
            WorkspacePolicy::Persistent => Self::Persistent(name.clone()),
        }
    }

    /// Returns the policy this placement belongs to.
    #[must_use]
    pub const fn policy(&self) -> WorkspacePolicy {
        match self {
            Self::Ephemeral => WorkspacePolicy::Ephemeral,
            Self::Persistent(_) => WorkspacePolicy::Persistent,
        }
    }
}

#[derive(Debug)]
enum Lease {
    Ephemeral(TempDir),
    Persistent,
}

/// A directory holding a cloned repository.
///
/// An ephemeral workspace owns its directory: it is removed by
/// [`Workspace::release`] or, failing that, when the value is dropped.
#[derive(Debug)]
pub struct Workspace {
    id: WorkspaceId,
    root: Utf8PathBuf,
    lease: Lease,
}

impl Workspace {
    /// Wraps a temporary directory as an ephemeral workspace.
    ///
    /// # Errors
    ///
    /// Returns the directory back when its path is not valid UTF-8.
    pub fn ephemeral(id: WorkspaceId, dir: TempDir) -> Result<Self, TempDir> {
        match Utf8PathBuf::from_path_buf(dir.path().to_path_buf()) {
            Ok(root) => Ok(Self {
                id,
                root,
                lease: Lease::Ephemeral(dir),
            }),
            Err(_) => Err(dir),
        }
    }

    /// Describes a persistent workspace directory.
    #[must_use]
    pub const fn persistent(id: WorkspaceId, root: Utf8PathBuf) -> Self {
        Self {
            id,
            root,
            lease: Lease::Persistent,
        }
    }

    /// Returns the workspace identifier.
    #[must_use]
    pub const fn id(&self) -> WorkspaceId {
        self.id
    }

    /// Returns the repository root inside the workspace.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the policy the workspace was created under.
    #[must_use]
    pub const fn policy(&self) -> WorkspacePolicy {
        match self.lease {
            Lease::Ephemeral(_) => WorkspacePolicy::Ephemeral,
            Lease::Persistent => WorkspacePolicy::Persistent,
        }
    }

    /// Deletes an ephemeral workspace; persistent workspaces are kept.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while deleting the directory.
    pub fn release(self) -> std::io::Result<()> {
        match self.lease {
            Lease::Ephemeral(dir) => dir.close(),
            Lease::Persistent => Ok(()),
        }
    }
}
