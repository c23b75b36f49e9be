//! Server record aggregate and its public listing projection.

use super::{Pricing, RepositorySource, ServerName, ServerPayload, pricing::null_as_free};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registration timestamps of a server record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMeta {
    /// First insertion time; never changes afterwards.
    pub created_at: DateTime<Utc>,
    /// Time of the latest upsert.
    pub updated_at: DateTime<Utc>,
}

/// One registered server package, as persisted in the registry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    name: ServerName,
    version: String,
    description: String,
    author: String,
    lang: String,
    license: String,
    entrypoint: String,
    repository: RepositorySource,
    #[serde(default, deserialize_with = "null_as_free")]
    pricing: Pricing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tools: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sonarqube: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    security_report: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<ServerMeta>,
    /// Fields written by other revisions, kept verbatim.
    #[serde(flatten)]
    retained: Map<String, Value>,
}

impl ServerRecord {
    /// Builds a record from a validated payload.
    #[must_use]
    pub fn from_payload(payload: ServerPayload, meta: ServerMeta) -> Self {
        let ServerPayload {
            name,
            version,
            description,
            author,
            lang,
            license,
            entrypoint,
            repository,
            pricing,
            tools,
            sonarqube,
            security_report,
        } = payload;

        Self {
            name,
            version,
            description,
            author,
            lang,
            license,
            entrypoint,
            repository,
            pricing,
            tools,
            sonarqube,
            security_report,
            meta: Some(meta),
            retained: Map::new(),
        }
    }

    /// Returns the unique server name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the published version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the author.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the declared language, as submitted.
    #[must_use]
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Returns the license identifier.
    #[must_use]
    pub fn license(&self) -> &str {
        &self.license
    }

    /// Returns the entrypoint path relative to the repository root.
    #[must_use]
    pub fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    /// Returns the normalized repository location.
    #[must_use]
    pub const fn repository(&self) -> &RepositorySource {
        &self.repository
    }

    /// Returns the price.
    #[must_use]
    pub const fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Returns the opaque tool catalogue.
    #[must_use]
    pub const fn tools(&self) -> Option<&Value> {
        self.tools.as_ref()
    }

    /// Returns the opaque legacy code-quality report.
    #[must_use]
    pub const fn sonarqube(&self) -> Option<&Value> {
        self.sonarqube.as_ref()
    }

    /// Returns the opaque security report.
    #[must_use]
    pub const fn security_report(&self) -> Option<&Value> {
        self.security_report.as_ref()
    }

    /// Returns registration timestamps, absent only on legacy records.
    #[must_use]
    pub const fn meta(&self) -> Option<&ServerMeta> {
        self.meta.as_ref()
    }

    /// Returns fields this revision does not model.
    #[must_use]
    pub const fn retained_fields(&self) -> &Map<String, Value> {
        &self.retained
    }

    pub(crate) fn retain_fields(&mut self, retained: Map<String, Value>) {
        self.retained = retained;
    }
}

/// Public projection of a record returned by server listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerSummary {
    /// Unique server name.
    pub name: ServerName,
    /// Published version.
    pub version: String,
    /// Description.
    pub description: String,
    /// Author.
    pub author: String,
    /// Declared language.
    pub lang: String,
    /// License identifier.
    pub license: String,
    /// Entrypoint path.
    pub entrypoint: String,
    /// Repository location.
    pub repository: RepositorySource,
    /// Price, defaulted to free.
    pub pricing: Pricing,
    /// Tool catalogue when present and non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    /// Legacy code-quality report when present and non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sonarqube: Option<Value>,
    /// Security report when present and non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_report: Option<Value>,
}

impl From<&ServerRecord> for ServerSummary {
    fn from(record: &ServerRecord) -> Self {
        Self {
            name: record.name.clone(),
            version: record.version.clone(),
            description: record.description.clone(),
            author: record.author.clone(),
            lang: record.lang.clone(),
            license: record.license.clone(),
            entrypoint: record.entrypoint.clone(),
            repository: record.repository.clone(),
            pricing: record.pricing.clone(),
            tools: non_empty(record.tools.as_ref()),
            sonarqube: non_empty(record.sonarqube.as_ref()),
            security_report: non_empty(record.security_report.as_ref()),
        }
    }
}

fn non_empty(value: Option<&Value>) -> Option<Value> {
    value
        .filter(|blob| match blob {
            Value::Null | Value::Bool(false) => false,
            Value::Object(fields) => !fields.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::String(text) => !text.is_empty(),
            Value::Bool(true) | Value::Number(_) => true,
        })
        .cloned()
}
