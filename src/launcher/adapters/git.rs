//! Repository fetcher backed by the `git` command-line client.

use crate::launcher::ports::{RepositoryFetchError, RepositoryFetchResult, RepositoryFetcher};
use crate::registry::domain::RepositoryUrl;
use async_trait::async_trait;
use camino::Utf8Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default budget for one clone.
pub const DEFAULT_CLONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Shallow-clones repositories with `git clone --depth 1`.
///
/// Terminal prompts are disabled so credential requests fail instead of
/// blocking.
#[derive(Debug, Clone)]
pub struct GitCliFetcher {
    program: String,
    timeout: Duration,
}

impl Default for GitCliFetcher {
    fn default() -> Self {
        Self::new("git", DEFAULT_CLONE_TIMEOUT)
    }
}

impl GitCliFetcher {
    /// Creates a fetcher running `program` with a per-clone `timeout`.
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn clone_command(&self, url: &RepositoryUrl, destination: &Utf8Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["clone", "--depth", "1", "--quiet", "--"])
            .arg(url.as_str())
            .arg(destination.as_std_path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl RepositoryFetcher for GitCliFetcher {
    async fn fetch(
        &self,
        url: &RepositoryUrl,
        destination: &Utf8Path,
    ) -> RepositoryFetchResult<()> {
        tracing::debug!(url = %url, destination = %destination, "cloning repository");
        let mut command = self.clone_command(url, destination);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(RepositoryFetchError::unavailable)?,
            Err(_) => {
                tracing::warn!(url = %url, timeout = ?self.timeout, "repository clone timed out");
                return Err(RepositoryFetchError::TimedOut {
                    url: url.as_str().to_owned(),
                    timeout: self.timeout,
                });
            }
        };

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => format!("git exited with {}", output.status),
            text => text.to_owned(),
        };
        Err(RepositoryFetchError::Failed {
            url: url.as_str().to_owned(),
            message,
        })
    }
}
