//! Environment-driven configuration.

use crate::launcher::{
    adapters::{DEFAULT_CLONE_TIMEOUT, DEFAULT_EXECUTION_TIMEOUT},
    domain::{InterpreterTable, RuntimeKind, WorkspacePolicy},
    services::LauncherSettings,
};
use crate::payment::services::PaymentCredentials;
use crate::registry::{
    domain::DEFAULT_DOCUMENT_FIELD,
    services::{ConsistencyMode, DEFAULT_REGISTRY_KEY, RegistryStoreSettings},
};
use crate::telemetry::LogFormat;
use camino::Utf8PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be used.
    #[error("invalid value for {variable}: '{value}' ({reason})")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: &'static str,
    },

    /// Only one half of the payment key pair is set.
    #[error("MCPHUB_PAYMENT_KEY_ID and MCPHUB_PAYMENT_KEY_SECRET must be set together")]
    IncompletePaymentCredentials,

    /// The system temporary directory is not valid UTF-8.
    #[error("system temporary directory is not valid UTF-8; set MCPHUB_WORKSPACE_DIR")]
    NonUtf8TempDir,
}

/// Settings of the hub, read from `MCPHUB_*` variables.
///
/// | Variable | Default |
/// |---|---|
/// | `MCPHUB_STORAGE_DIR` | `./data` |
/// | `MCPHUB_REGISTRY_KEY` | `mcp.json` |
/// | `MCPHUB_DOCUMENT_FIELD` | `servers` |
/// | `MCPHUB_CONSISTENCY` | `optimistic` |
/// | `MCPHUB_WORKSPACE_DIR` | `<temp dir>/mcphub` |
/// | `MCPHUB_WORKSPACE_POLICY` | `ephemeral` |
/// | `MCPHUB_EXECUTION_TIMEOUT_SECS` | `30` |
/// | `MCPHUB_CLONE_TIMEOUT_SECS` | `120` |
/// | `MCPHUB_GIT_PROGRAM` | `git` |
/// | `MCPHUB_PYTHON_PROGRAM` | `python3` |
/// | `MCPHUB_NODE_PROGRAM` | `node` |
/// | `MCPHUB_PAYMENT_KEY_ID`, `MCPHUB_PAYMENT_KEY_SECRET` | unset |
/// | `MCPHUB_LOG_FORMAT` | `pretty` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Directory of the filesystem blob store.
    pub storage_dir: Utf8PathBuf,
    /// Registry store key, field and consistency mode.
    pub store: RegistryStoreSettings,
    /// Directory holding workspaces.
    pub workspace_dir: Utf8PathBuf,
    /// Workspace policy.
    pub workspace_policy: WorkspacePolicy,
    /// Interpreters and run budget.
    pub launcher: LauncherSettings,
    /// Budget of one clone.
    pub clone_timeout: Duration,
    /// Git program used for clones.
    pub git_program: String,
    /// Payment gateway credentials; payments are disabled when absent.
    pub payment: Option<PaymentCredentials>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl HubConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first unusable variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first unusable variable.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let storage_dir = get("MCPHUB_STORAGE_DIR").map_or_else(|| "./data".into(), Utf8PathBuf::from);

        let consistency = match get("MCPHUB_CONSISTENCY") {
            None => ConsistencyMode::default(),
            Some(value) => ConsistencyMode::try_from(value.as_str()).map_err(|_| {
                ConfigError::InvalidValue {
                    variable: "MCPHUB_CONSISTENCY",
                    value,
                    reason: "expected optimistic or last_writer_wins",
                }
            })?,
        };
        let store = RegistryStoreSettings::default()
            .with_key(get("MCPHUB_REGISTRY_KEY").unwrap_or_else(|| DEFAULT_REGISTRY_KEY.to_owned()))
            .with_document_field(
                get("MCPHUB_DOCUMENT_FIELD").unwrap_or_else(|| DEFAULT_DOCUMENT_FIELD.to_owned()),
            )
            .with_consistency(consistency);

        let workspace_dir = match get("MCPHUB_WORKSPACE_DIR") {
            Some(value) => Utf8PathBuf::from(value),
            None => Utf8PathBuf::from_path_buf(std::env::temp_dir())
                .map_err(|_| ConfigError::NonUtf8TempDir)?
                .join("mcphub"),
        };

        let workspace_policy = match get("MCPHUB_WORKSPACE_POLICY") {
            None => WorkspacePolicy::default(),
            Some(value) => WorkspacePolicy::try_from(value.as_str()).map_err(|_| {
                ConfigError::InvalidValue {
                    variable: "MCPHUB_WORKSPACE_POLICY",
                    value,
                    reason: "expected ephemeral or persistent",
                }
            })?,
        };

        let execution_timeout = seconds(
            "MCPHUB_EXECUTION_TIMEOUT_SECS",
            get("MCPHUB_EXECUTION_TIMEOUT_SECS"),
            DEFAULT_EXECUTION_TIMEOUT,
        )?;
        let clone_timeout = seconds(
            "MCPHUB_CLONE_TIMEOUT_SECS",
            get("MCPHUB_CLONE_TIMEOUT_SECS"),
            DEFAULT_CLONE_TIMEOUT,
        )?;

        let mut interpreters = InterpreterTable::default();
        if let Some(program) = get("MCPHUB_PYTHON_PROGRAM") {
            interpreters = interpreters.with_program(RuntimeKind::Python, program);
        }
        if let Some(program) = get("MCPHUB_NODE_PROGRAM") {
            interpreters = interpreters.with_program(RuntimeKind::Node, program);
        }
        let launcher = LauncherSettings::default()
            .with_interpreters(interpreters)
            .with_timeout(execution_timeout);

        let payment = match (get("MCPHUB_PAYMENT_KEY_ID"), get("MCPHUB_PAYMENT_KEY_SECRET")) {
            (Some(key_id), Some(secret)) => Some(PaymentCredentials::new(key_id, secret)),
            (None, None) => None,
            _ => return Err(ConfigError::IncompletePaymentCredentials),
        };

        let log_format = match get("MCPHUB_LOG_FORMAT") {
            None => LogFormat::default(),
            Some(value) => LogFormat::try_from(value.as_str()).map_err(|_| {
                ConfigError::InvalidValue {
                    variable: "MCPHUB_LOG_FORMAT",
                    value,
                    reason: "expected pretty or json",
                }
            })?,
        };

        Ok(Self {
            storage_dir,
            store,
            workspace_dir,
            workspace_policy,
            launcher,
            clone_timeout,
            git_program: get("MCPHUB_GIT_PROGRAM").unwrap_or_else(|| "git".to_owned()),
            payment,
            log_format,
        })
    }
}

fn seconds(
    variable: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(text) = value else {
        return Ok(default);
    };
    match text.parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidValue {
            variable,
            value: text,
            reason: "expected a positive number of seconds",
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}
