//! Language-to-interpreter mapping.

use super::LauncherDomainError;
use std::fmt;

/// Interpreter family a server's declared language maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKind {
    /// Python 3.
    Python,
    /// Node.js, used for JavaScript and TypeScript servers.
    Node,
}

impl RuntimeKind {
    /// Maps a declared language, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherDomainError::UnsupportedLanguage`] for languages
    /// without an interpreter.
    pub fn from_lang(lang: &str) -> Result<Self, LauncherDomainError> {
        match lang.trim().to_ascii_lowercase().as_str() {
            "python" | "python3" => Ok(Self::Python),
            "javascript" | "typescript" | "node" | "nodejs" => Ok(Self::Node),
            _ => Err(LauncherDomainError::UnsupportedLanguage(lang.to_owned())),
        }
    }

    /// Returns the interpreter program used when no override is configured.
    #[must_use]
    pub const fn default_program(self) -> &'static str {
        match self {
            Self::Python => "python3",
            Self::Node => "node",
        }
    }

    /// Returns the runtime as a lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Node => "node",
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpreter programs per runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterTable {
    python: String,
    node: String,
}

impl Default for InterpreterTable {
    fn default() -> Self {
        Self {
            python: RuntimeKind::Python.default_program().to_owned(),
            node: RuntimeKind::Node.default_program().to_owned(),
        }
    }
}

impl InterpreterTable {
    /// Replaces the program used for `kind`.
    #[must_use]
    pub fn with_program(mut self, kind: RuntimeKind, program: impl Into<String>) -> Self {
        let slot = match kind {
            RuntimeKind::Python => &mut self.python,
            RuntimeKind::Node => &mut self.node,
        };
        *slot = program.into();
        self
    }

    /// Returns the program for `kind`.
    #[must_use]
    pub fn program(&self, kind: RuntimeKind) -> &str {
        match kind {
            RuntimeKind::Python => &self.python,
            RuntimeKind::Node => &self.node,
        }
    }
}
