//! Source repository value objects.
//!
//! Publishers describe a repository either as a bare URL string or as a
//! structured `{type, url}` object. Both forms normalize to
//! [`RepositorySource`] at ingress, and the structured form is what gets
//! persisted.

use super::RegistryDomainError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Repository type recorded when the bare string form is submitted.
pub const DEFAULT_REPOSITORY_KIND: &str = "git";

const ALLOWED_SCHEMES: [&str; 5] = ["https://", "http://", "ssh://", "git://", "file://"];

/// Clone URL.
///
/// URLs submitted for registration are validated; URLs read back from a
/// stored document are kept verbatim and checked with
/// [`RepositoryUrl::validate`] before a clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RepositoryUrl(String);

impl RepositoryUrl {
    /// Creates a validated repository URL.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyRepositoryUrl`] for blank input and
    /// [`RegistryDomainError::InvalidRepositoryUrl`] when the value is neither
    /// a URL with a supported scheme nor an scp-like `user@host:path`.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyRepositoryUrl);
        }

        if trimmed.starts_with('-') || trimmed.chars().any(char::is_whitespace) {
            return Err(RegistryDomainError::InvalidRepositoryUrl(raw));
        }

        let lowered = trimmed.to_ascii_lowercase();
        let has_scheme = ALLOWED_SCHEMES
            .iter()
            .any(|scheme| lowered.starts_with(scheme) && lowered.len() > scheme.len());
        if has_scheme || is_scp_like(trimmed) {
            return Ok(Self(trimmed.to_owned()));
        }

        Err(RegistryDomainError::InvalidRepositoryUrl(raw))
    }

    /// Wraps a URL as it was stored, without validation.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Checks that the URL would be accepted at registration unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error [`RepositoryUrl::new`] reports, or
    /// [`RegistryDomainError::InvalidRepositoryUrl`] when the stored value
    /// carries surrounding whitespace.
    pub fn validate(&self) -> Result<(), RegistryDomainError> {
        if Self::new(self.0.as_str())? == *self {
            Ok(())
        } else {
            Err(RegistryDomainError::InvalidRepositoryUrl(self.0.clone()))
        }
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_scp_like(value: &str) -> bool {
    if value.contains("://") {
        return false;
    }
    let Some((user_host, path)) = value.split_once(':') else {
        return false;
    };
    let Some((user, host)) = user_host.split_once('@') else {
        return false;
    };
    !user.is_empty() && !host.is_empty() && !path.is_empty() && !host.contains('/')
}

impl AsRef<str> for RepositoryUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized repository location of a server package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySource {
    #[serde(rename = "type")]
    kind: String,
    url: RepositoryUrl,
}

impl RepositorySource {
    /// Creates a repository source of the default `git` kind.
    #[must_use]
    pub fn git(url: RepositoryUrl) -> Self {
        Self {
            kind: DEFAULT_REPOSITORY_KIND.to_owned(),
            url,
        }
    }

    /// Normalizes either accepted JSON shape.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidRepositoryShape`] when the value
    /// is neither a string nor an object with a string `url`, or URL
    /// validation errors from [`RepositoryUrl::new`].
    pub fn from_value(value: &Value) -> Result<Self, RegistryDomainError> {
        Self::parse(value, |url: &str| RepositoryUrl::new(url))
    }

    /// Decodes a stored repository value.
    ///
    /// Both shapes are accepted as in [`RepositorySource::from_value`], but
    /// the URL is kept without validation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidRepositoryShape`] when the value
    /// is neither a string nor an object with a string `url`.
    pub fn from_stored_value(value: &Value) -> Result<Self, RegistryDomainError> {
        Self::parse(value, |url| Ok(RepositoryUrl::from_stored(url)))
    }

    fn parse(
        value: &Value,
        to_url: impl Fn(&str) -> Result<RepositoryUrl, RegistryDomainError>,
    ) -> Result<Self, RegistryDomainError> {
        match value {
            Value::String(url) => Ok(Self::git(to_url(url)?)),
            Value::Object(fields) => {
                let url = fields
                    .get("url")
                    .and_then(Value::as_str)
                    .ok_or(RegistryDomainError::InvalidRepositoryShape)?;
                let kind = match fields.get("type") {
                    None | Some(Value::Null) => DEFAULT_REPOSITORY_KIND.to_owned(),
                    Some(Value::String(kind)) if !kind.trim().is_empty() => kind.trim().to_owned(),
                    Some(_) => return Err(RegistryDomainError::InvalidRepositoryShape),
                };
                Ok(Self {
                    kind,
                    url: to_url(url)?,
                })
            }
            _ => Err(RegistryDomainError::InvalidRepositoryShape),
        }
    }

    /// Returns the repository type, e.g. `git`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the clone URL.
    #[must_use]
    pub const fn url(&self) -> &RepositoryUrl {
        &self.url
    }
}

impl<'de> Deserialize<'de> for RepositorySource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_stored_value(&value).map_err(serde::de::Error::custom)
    }
}
