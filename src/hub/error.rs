//! Hub errors and their classification.

use crate::error::ErrorKind;
use crate::launcher::{
    ports::ProcessExecutionError,
    services::{FetcherError, LauncherError},
};
use crate::registry::{domain::RegistryDomainError, services::RegistryStoreError};
use thiserror::Error;

/// Errors returned by [`super::HubService`].
#[derive(Debug, Error)]
pub enum HubServiceError {
    /// The request failed registry validation.
    #[error(transparent)]
    Input(#[from] RegistryDomainError),

    /// The registry store failed.
    #[error(transparent)]
    Registry(#[from] RegistryStoreError),

    /// The repository could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetcherError),

    /// The server could not be launched.
    #[error(transparent)]
    Launch(#[from] LauncherError),
}

impl HubServiceError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Validation,
            Self::Registry(err) => registry_kind(err),
            Self::Fetch(err) => fetch_kind(err),
            Self::Launch(err) => launch_kind(err),
        }
    }
}

const fn registry_kind(err: &RegistryStoreError) -> ErrorKind {
    match err {
        RegistryStoreError::Domain(_) => ErrorKind::Validation,
        RegistryStoreError::DocumentNotFound(_) | RegistryStoreError::ServerNotFound(_) => {
            ErrorKind::NotFound
        }
        RegistryStoreError::Conflict { .. } | RegistryStoreError::Storage(_) => {
            ErrorKind::DependencyFailure
        }
        RegistryStoreError::Document(_) => ErrorKind::Internal,
    }
}

const fn fetch_kind(err: &FetcherError) -> ErrorKind {
    match err {
        FetcherError::Fetch(_) => ErrorKind::DependencyFailure,
        FetcherError::Workspace { .. } => ErrorKind::Internal,
    }
}

const fn launch_kind(err: &LauncherError) -> ErrorKind {
    match err {
        LauncherError::Domain(_)
        | LauncherError::EntrypointNotFound(_)
        | LauncherError::EntrypointNotAFile(_)
        | LauncherError::EntrypointRejected { .. } => ErrorKind::Validation,
        LauncherError::Process(ProcessExecutionError::Spawn { .. }) => {
            ErrorKind::DependencyFailure
        }
        LauncherError::Process(ProcessExecutionError::Supervise(_))
        | LauncherError::Workspace { .. } => ErrorKind::Internal,
    }
}
