//! The registry document: every server record in one persisted blob.

use super::{ServerMeta, ServerName, ServerPayload, ServerRecord};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Canonical top-level field holding the server array.
pub const DEFAULT_DOCUMENT_FIELD: &str = "servers";

/// Errors raised while decoding or encoding a registry document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDocumentError {
    /// The blob is not valid JSON or does not have the expected shape.
    #[error("malformed registry document: {0}")]
    Malformed(String),

    /// The stored array holds two records with the same name.
    #[error("registry document contains duplicate server name: {0}")]
    DuplicateServerName(ServerName),

    /// The document could not be serialized.
    #[error("failed to encode registry document: {0}")]
    Encode(String),
}

/// Whether an upsert inserted a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertDisposition {
    /// No record with the name existed; the record was appended.
    Inserted,
    /// A record with the name was replaced in place.
    Replaced,
}

/// Ordered server records keyed by name, plus any other top-level fields.
///
/// Top-level fields other than the configured server array are carried
/// through untouched. In particular a legacy array stored under a different
/// field name is neither read nor merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryDocument {
    servers: Vec<ServerRecord>,
    retained: Map<String, Value>,
}

impl RegistryDocument {
    /// Creates a document with no records.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decodes a stored blob, reading the array under `field`.
    ///
    /// A missing or `null` field yields an empty array.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDocumentError::Malformed`] when the blob is not a
    /// JSON object or a record fails to decode, and
    /// [`RegistryDocumentError::DuplicateServerName`] when the stored array
    /// violates name uniqueness.
    pub fn from_json(bytes: &[u8], field: &str) -> Result<Self, RegistryDocumentError> {
        let mut retained: Map<String, Value> = serde_json::from_slice(bytes)
            .map_err(|err| RegistryDocumentError::Malformed(err.to_string()))?;

        let servers: Vec<ServerRecord> = match retained.remove(field) {
            None | Some(Value::Null) => Vec::new(),
            Some(array) => serde_json::from_value(array).map_err(|err| {
                RegistryDocumentError::Malformed(format!("field '{field}': {err}"))
            })?,
        };

        let mut seen = HashSet::with_capacity(servers.len());
        if let Some(duplicate) = servers.iter().find(|record| !seen.insert(record.name())) {
            return Err(RegistryDocumentError::DuplicateServerName(
                duplicate.name().clone(),
            ));
        }

        Ok(Self { servers, retained })
    }

    /// Encodes the document, writing the array under `field`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDocumentError::Encode`] when serialization fails.
    pub fn to_json(&self, field: &str) -> Result<Vec<u8>, RegistryDocumentError> {
        let mut root = self.retained.clone();
        let servers = serde_json::to_value(&self.servers)
            .map_err(|err| RegistryDocumentError::Encode(err.to_string()))?;
        root.insert(field.to_owned(), servers);
        serde_json::to_vec_pretty(&Value::Object(root))
            .map_err(|err| RegistryDocumentError::Encode(err.to_string()))
    }

    /// Returns records in stored order.
    #[must_use]
    pub fn servers(&self) -> &[ServerRecord] {
        &self.servers
    }

    /// Returns top-level fields other than the server array.
    #[must_use]
    pub const fn retained_fields(&self) -> &Map<String, Value> {
        &self.retained
    }

    /// Finds a record by name.
    #[must_use]
    pub fn find(&self, name: &ServerName) -> Option<&ServerRecord> {
        self.servers.iter().find(|record| record.name() == name)
    }

    /// Inserts or replaces the record named by `payload`.
    ///
    /// An existing record keeps its position, its `created_at` and any fields
    /// this revision does not model. `updated_at` is always set to `now`.
    pub fn upsert(
        &mut self,
        payload: ServerPayload,
        now: DateTime<Utc>,
    ) -> (ServerRecord, UpsertDisposition) {
        let position = self
            .servers
            .iter()
            .position(|record| *record.name() == payload.name);

        let Some(existing) = position.and_then(|index| self.servers.get_mut(index)) else {
            let meta = ServerMeta {
                created_at: now,
                updated_at: now,
            };
            let record = ServerRecord::from_payload(payload, meta);
            self.servers.push(record.clone());
            return (record, UpsertDisposition::Inserted);
        };

        let created_at = existing.meta().map_or(now, |meta| meta.created_at);
        let mut record = ServerRecord::from_payload(
            payload,
            ServerMeta {
                created_at,
                updated_at: now,
            },
        );
        record.retain_fields(existing.retained_fields().clone());
        existing.clone_from(&record);
        (record, UpsertDisposition::Replaced)
    }
}
