//! Validated server name type.

use super::RegistryDomainError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Maximum length for a server name.
const MAX_SERVER_NAME_LENGTH: usize = 100;

/// Unique, immutable key of a registered server.
///
/// Names also key persistent workspace directories, so anything that could
/// change the meaning of a path component is rejected at registration.
/// Casing is preserved: `Weather` and `weather` are distinct servers.
///
/// Names read back from a stored document are not validated, since earlier
/// revisions accepted any string; [`ServerName::validate`] checks one before
/// it is used as a path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct ServerName(String);

impl ServerName {
    /// Creates a validated server name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyServerName`] when the value is
    /// empty after trimming, [`RegistryDomainError::ServerNameTooLong`] when
    /// it exceeds 100 characters, or
    /// [`RegistryDomainError::InvalidServerName`] when it contains path
    /// separators, whitespace or control characters, or starts with `.`.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyServerName);
        }

        if trimmed.chars().count() > MAX_SERVER_NAME_LENGTH {
            return Err(RegistryDomainError::ServerNameTooLong(raw));
        }

        let has_forbidden = trimmed.starts_with('.')
            || trimmed
                .chars()
                .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
        if has_forbidden {
            return Err(RegistryDomainError::InvalidServerName(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Wraps a name as it was stored, without validation.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds the key used to look a record up.
    ///
    /// Valid names are normalized as by [`ServerName::new`]. Other non-empty
    /// values are kept verbatim so records stored under legacy names can
    /// still be found.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyServerName`] for blank input.
    pub fn lookup(value: &str) -> Result<Self, RegistryDomainError> {
        match Self::new(value) {
            Err(RegistryDomainError::EmptyServerName) => Err(RegistryDomainError::EmptyServerName),
            Err(_) => Ok(Self::from_stored(value)),
            valid => valid,
        }
    }

    /// Checks that the name would be accepted at registration unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error [`ServerName::new`] reports, or
    /// [`RegistryDomainError::InvalidServerName`] when the stored value
    /// carries surrounding whitespace.
    pub fn validate(&self) -> Result<(), RegistryDomainError> {
        if Self::new(self.0.as_str())? == *self {
            Ok(())
        } else {
            Err(RegistryDomainError::InvalidServerName(self.0.clone()))
        }
    }

    /// Returns the server name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServerName {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ServerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from_stored)
    }
}

impl From<ServerName> for String {
    fn from(value: ServerName) -> Self {
        value.0
    }
}

impl AsRef<str> for ServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
