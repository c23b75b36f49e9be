//! Response bodies of hub operations.

use crate::launcher::domain::{WorkspaceId, WorkspacePolicy};
use crate::registry::domain::ServerSummary;
use camino::Utf8PathBuf;
use serde::Serialize;

/// Body of a server listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerListing {
    /// Number of servers.
    pub total: usize,
    /// Public projection of every server, in stored order.
    pub servers: Vec<ServerSummary>,
}

impl From<Vec<ServerSummary>> for ServerListing {
    fn from(servers: Vec<ServerSummary>) -> Self {
        Self {
            total: servers.len(),
            servers,
        }
    }
}

/// Body of a pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullReceipt {
    /// Identifier of the workspace the clone went into.
    pub workspace_id: WorkspaceId,
    /// Location of a persistent clone; absent for ephemeral workspaces,
    /// which are deleted before the pull returns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_path: Option<Utf8PathBuf>,
    /// Workspace policy in effect.
    pub policy: WorkspacePolicy,
}
