//! Tracing subscriber setup for the binary.

use std::fmt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Output format of log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per record.
    Json,
}

impl LogFormat {
    /// Returns the configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LogFormat {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "human" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(value.to_owned()),
        }
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(true)
                .with_writer(std::io::stderr)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
        LogFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
    }
}
