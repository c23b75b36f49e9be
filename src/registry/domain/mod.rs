//! Domain model for the server registry.
//!
//! The registry domain models server identity, repository locations,
//! pricing, ingress validation, and the single-document collection that
//! holds every record. Storage concerns remain outside this boundary.

mod document;
mod error;
mod name;
mod payload;
mod pricing;
mod record;
mod repository;

pub use document::{
    DEFAULT_DOCUMENT_FIELD, RegistryDocument, RegistryDocumentError, UpsertDisposition,
};
pub use error::RegistryDomainError;
pub use name::ServerName;
pub use payload::{REQUIRED_FIELDS, ServerPayload};
pub use pricing::Pricing;
pub use record::{ServerMeta, ServerRecord, ServerSummary};
pub use repository::{DEFAULT_REPOSITORY_KIND, RepositorySource, RepositoryUrl};
