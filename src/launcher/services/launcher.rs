//! Running a server entrypoint inside a workspace.

use crate::launcher::{
    adapters::DEFAULT_EXECUTION_TIMEOUT,
    domain::{
        Entrypoint, ExecutionOutcome, InterpreterTable, LauncherDomainError, ResultNormalizer,
        RuntimeKind, Workspace,
    },
    ports::{ProcessCompletion, ProcessExecutionError, ProcessExecutor, ProcessInvocation},
};
use cap_std::{ambient_authority, fs_utf8::Dir};
use camino::Utf8PathBuf;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`Launcher`].
#[derive(Debug, Error)]
pub enum LauncherError {
    /// The language or entrypoint failed validation.
    #[error(transparent)]
    Domain(#[from] LauncherDomainError),

    /// The entrypoint does not exist in the workspace.
    #[error("entrypoint '{0}' not found in repository")]
    EntrypointNotFound(String),

    /// The entrypoint exists but is not a regular file.
    #[error("entrypoint '{0}' is not a file")]
    EntrypointNotAFile(String),

    /// The entrypoint could not be resolved inside the workspace, for
    /// example because a symlink points outside it.
    #[error("entrypoint '{entrypoint}' cannot be resolved inside the workspace: {reason}")]
    EntrypointRejected {
        /// Declared entrypoint.
        entrypoint: String,
        /// Resolution failure.
        reason: String,
    },

    /// The workspace could not be inspected.
    #[error("failed to inspect workspace '{path}': {source}")]
    Workspace {
        /// Workspace root.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The interpreter could not be started or supervised.
    #[error(transparent)]
    Process(#[from] ProcessExecutionError),
}

/// Result type for launcher operations.
pub type LauncherResult<T> = Result<T, LauncherError>;

/// Interpreter table and time budget used for runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    interpreters: InterpreterTable,
    timeout: Duration,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            interpreters: InterpreterTable::default(),
            timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }
}

impl LauncherSettings {
    /// Replaces the interpreter table.
    #[must_use]
    pub fn with_interpreters(mut self, interpreters: InterpreterTable) -> Self {
        self.interpreters = interpreters;
        self
    }

    /// Replaces the per-run time budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the interpreter table.
    #[must_use]
    pub const fn interpreters(&self) -> &InterpreterTable {
        &self.interpreters
    }

    /// Returns the per-run time budget.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Spawns interpreters against workspace entrypoints.
#[derive(Clone)]
pub struct Launcher<E>
where
    E: ProcessExecutor,
{
    executor: Arc<E>,
    settings: LauncherSettings,
}

impl<E> Launcher<E>
where
    E: ProcessExecutor,
{
    /// Creates a launcher.
    #[must_use]
    pub const fn new(executor: Arc<E>, settings: LauncherSettings) -> Self {
        Self { executor, settings }
    }

    /// Returns the launcher settings.
    #[must_use]
    pub const fn settings(&self) -> &LauncherSettings {
        &self.settings
    }

    /// Maps `lang` to its interpreter program.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherDomainError::UnsupportedLanguage`] for unknown
    /// languages.
    pub fn interpreter_for(&self, lang: &str) -> Result<&str, LauncherDomainError> {
        let kind = RuntimeKind::from_lang(lang)?;
        Ok(self.settings.interpreters.program(kind))
    }

    /// Runs `entrypoint` from `workspace` with the interpreter for `lang`.
    ///
    /// The language and entrypoint are validated before anything is
    /// spawned. Non-zero exits and timeouts are reported as outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError`] when validation fails or the interpreter
    /// cannot be started.
    pub async fn run(
        &self,
        workspace: &Workspace,
        entrypoint: &str,
        lang: &str,
    ) -> LauncherResult<ExecutionOutcome> {
        let program = self.interpreter_for(lang)?.to_owned();
        let entrypoint = Entrypoint::new(entrypoint)?;
        check_entrypoint(workspace, &entrypoint).await?;

        let invocation = ProcessInvocation {
            program,
            args: vec![entrypoint.as_path().as_str().to_owned()],
            working_dir: workspace.root().to_owned(),
            timeout: self.settings.timeout,
        };
        tracing::info!(
            workspace = %workspace.id(),
            program = %invocation.program,
            entrypoint = %entrypoint,
            "launching server"
        );

        let outcome = match self.executor.execute(&invocation).await? {
            ProcessCompletion::Exited {
                code: 0,
                stdout,
                stderr,
            } => ExecutionOutcome::Succeeded {
                body: ResultNormalizer.normalize(&stdout, &stderr),
            },
            ProcessCompletion::Exited {
                code,
                stdout,
                stderr,
            } => ExecutionOutcome::Failed {
                return_code: code,
                stdout,
                stderr,
            },
            ProcessCompletion::TimedOut { stdout, stderr } => ExecutionOutcome::TimedOut {
                budget: self.settings.timeout,
                stdout,
                stderr,
            },
        };
        tracing::info!(
            workspace = %workspace.id(),
            success = outcome.is_success(),
            "server run finished"
        );
        Ok(outcome)
    }
}

/// Confirms `entrypoint` is a regular file reachable without leaving the
/// workspace, following symlinks.
async fn check_entrypoint(workspace: &Workspace, entrypoint: &Entrypoint) -> LauncherResult<()> {
    let root = workspace.root().to_owned();
    let relative = entrypoint.as_path().to_owned();
    let checked = tokio::task::spawn_blocking(move || -> LauncherResult<()> {
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .map_err(|source| LauncherError::Workspace {
                path: root.clone(),
                source,
            })?;
        match dir.metadata(&relative) {
            Ok(metadata) if metadata.is_file() => Ok(()),
            Ok(_) => Err(LauncherError::EntrypointNotAFile(relative.to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(LauncherError::EntrypointNotFound(relative.to_string()))
            }
            Err(err) => Err(LauncherError::EntrypointRejected {
                entrypoint: relative.to_string(),
                reason: err.to_string(),
            }),
        }
    })
    .await;

    checked.map_err(|err| LauncherError::Workspace {
        path: workspace.root().to_owned(),
        source: io::Error::other(err),
    })?
}
