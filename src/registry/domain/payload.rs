//! Ingress validation for create-or-upsert payloads.

use super::{Pricing, RegistryDomainError, RepositorySource, ServerName};
use serde_json::{Map, Value};

/// Keys every create-or-upsert payload must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "name",
    "version",
    "description",
    "author",
    "lang",
    "license",
    "entrypoint",
    "repository",
];

/// A validated create-or-upsert request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerPayload {
    /// Unique server name.
    pub name: ServerName,
    /// Published version string.
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// Publisher name.
    pub author: String,
    /// Declared implementation language, kept as submitted.
    pub lang: String,
    /// License identifier.
    pub license: String,
    /// Entrypoint path relative to the repository root.
    pub entrypoint: String,
    /// Normalized repository location.
    pub repository: RepositorySource,
    /// Package price; free when omitted.
    pub pricing: Pricing,
    /// Opaque tool catalogue.
    pub tools: Option<Value>,
    /// Opaque legacy code-quality report.
    pub sonarqube: Option<Value>,
    /// Opaque security report.
    pub security_report: Option<Value>,
}

impl ServerPayload {
    /// Validates a raw JSON payload.
    ///
    /// Required keys are checked first, in [`REQUIRED_FIELDS`] order, so the
    /// error names the first missing key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::PayloadNotAnObject`],
    /// [`RegistryDomainError::MissingField`] naming the first absent key,
    /// [`RegistryDomainError::InvalidField`] for wrongly typed values, or
    /// name and repository validation errors.
    pub fn from_value(value: &Value) -> Result<Self, RegistryDomainError> {
        let fields = value
            .as_object()
            .ok_or(RegistryDomainError::PayloadNotAnObject)?;

        if let Some(missing) = REQUIRED_FIELDS
            .iter()
            .find(|key| fields.get(**key).is_none_or(Value::is_null))
        {
            return Err(RegistryDomainError::MissingField(*missing));
        }

        let repository = fields
            .get("repository")
            .ok_or(RegistryDomainError::MissingField("repository"))?;

        Ok(Self {
            name: ServerName::new(required_string(fields, "name")?)?,
            version: required_string(fields, "version")?,
            description: required_string(fields, "description")?,
            author: required_string(fields, "author")?,
            lang: required_string(fields, "lang")?,
            license: required_string(fields, "license")?,
            entrypoint: required_entrypoint(fields)?,
            repository: RepositorySource::from_value(repository)?,
            pricing: Pricing::from_payload(fields.get("pricing"))?,
            tools: optional_blob(fields, "tools"),
            sonarqube: optional_blob(fields, "sonarqube"),
            security_report: optional_blob(fields, "security_report"),
        })
    }
}

fn required_string(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<String, RegistryDomainError> {
    match fields.get(field) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Null) | None => Err(RegistryDomainError::MissingField(field)),
        Some(_) => Err(RegistryDomainError::InvalidField {
            field,
            reason: "expected a string".to_owned(),
        }),
    }
}

fn required_entrypoint(fields: &Map<String, Value>) -> Result<String, RegistryDomainError> {
    let entrypoint = required_string(fields, "entrypoint")?;
    if entrypoint.trim().is_empty() {
        return Err(RegistryDomainError::InvalidField {
            field: "entrypoint",
            reason: "must not be empty".to_owned(),
        });
    }
    Ok(entrypoint)
}

fn optional_blob(fields: &Map<String, Value>, field: &str) -> Option<Value> {
    fields.get(field).filter(|value| !value.is_null()).cloned()
}
