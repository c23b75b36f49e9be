//! Error types for payment domain validation.

use thiserror::Error;

/// Errors returned when a payment request is malformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentDomainError {
    /// The amount is negative, not finite or too large.
    #[error("invalid payment amount: {0}")]
    InvalidAmount(String),

    /// The currency code is blank.
    #[error("currency must not be empty")]
    EmptyCurrency,

    /// The server name is blank.
    #[error("server name must not be empty")]
    EmptyServerName,

    /// A gateway identifier is blank.
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),
}
