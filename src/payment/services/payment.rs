//! Server purchase orchestration.

use crate::error::ErrorKind;
use crate::payment::{
    domain::{
        OrderReceipt, OrderRequest, PaymentDomainError, PaymentStatus, PaymentVerification,
        SignatureVerifier,
    },
    ports::{PaymentGateway, PaymentGatewayError},
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Gateway key pair used for orders and signature checks.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentCredentials {
    key_id: String,
    key_secret: String,
}

impl fmt::Debug for PaymentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentCredentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

impl PaymentCredentials {
    /// Creates credentials from the public key id and shared secret.
    #[must_use]
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// Returns the public key id.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

/// A checkout the client claims to have completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyPaymentRequest {
    /// Gateway order identifier.
    pub order_id: String,
    /// Gateway payment identifier.
    pub payment_id: String,
    /// Hex signature returned by the gateway checkout.
    pub signature: String,
    /// Server that was paid for.
    pub server_name: String,
}

/// Errors returned by [`PaymentService`].
#[derive(Debug, Error)]
pub enum PaymentServiceError {
    /// The request failed validation.
    #[error(transparent)]
    Domain(#[from] PaymentDomainError),

    /// The gateway rejected the request or failed.
    #[error(transparent)]
    Gateway(#[from] PaymentGatewayError),

    /// The checkout signature does not match.
    #[error("invalid payment signature")]
    InvalidSignature,

    /// The gateway has no payment with the identifier.
    #[error("payment '{0}' not found")]
    PaymentNotFound(String),
}

impl PaymentServiceError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_)
            | Self::InvalidSignature
            | Self::Gateway(PaymentGatewayError::Rejected(_)) => ErrorKind::Validation,
            Self::Gateway(PaymentGatewayError::Unavailable(_)) => ErrorKind::DependencyFailure,
            Self::PaymentNotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Result type for payment service operations.
pub type PaymentServiceResult<T> = Result<T, PaymentServiceError>;

/// Creates orders, verifies checkouts and reports payment status.
#[derive(Clone)]
pub struct PaymentService<G>
where
    G: PaymentGateway,
{
    gateway: Arc<G>,
    key_id: String,
    verifier: SignatureVerifier,
}

impl<G> PaymentService<G>
where
    G: PaymentGateway,
{
    /// Creates a payment service.
    #[must_use]
    pub fn new(gateway: Arc<G>, credentials: PaymentCredentials) -> Self {
        let PaymentCredentials { key_id, key_secret } = credentials;
        Self {
            gateway,
            key_id,
            verifier: SignatureVerifier::new(key_secret),
        }
    }

    /// Creates a gateway order for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentServiceError::Gateway`] when the gateway rejects or
    /// fails the order.
    pub async fn create_order(&self, request: &OrderRequest) -> PaymentServiceResult<OrderReceipt> {
        let draft = request.to_draft();
        let order = self.gateway.create_order(&draft).await?;
        tracing::info!(
            server = %request.server_name(),
            order_id = %order.id,
            amount = order.amount,
            currency = %order.currency,
            "created payment order"
        );
        Ok(OrderReceipt {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.key_id.clone(),
        })
    }

    /// Verifies a completed checkout's signature.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentServiceError::Domain`] for blank identifiers and
    /// [`PaymentServiceError::InvalidSignature`] when the signature does not
    /// match.
    pub fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> PaymentServiceResult<PaymentVerification> {
        require("order id", &request.order_id)?;
        require("payment id", &request.payment_id)?;
        if !self
            .verifier
            .verify(&request.order_id, &request.payment_id, &request.signature)
        {
            tracing::warn!(
                order_id = %request.order_id,
                payment_id = %request.payment_id,
                "payment signature mismatch"
            );
            return Err(PaymentServiceError::InvalidSignature);
        }
        Ok(PaymentVerification::success(
            request.payment_id.clone(),
            request.server_name.clone(),
        ))
    }

    /// Reports the gateway status of a payment.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentServiceError::PaymentNotFound`] for unknown ids, or
    /// gateway failures.
    pub async fn payment_status(&self, payment_id: &str) -> PaymentServiceResult<PaymentStatus> {
        require("payment id", payment_id)?;
        self.gateway
            .fetch_payment(payment_id)
            .await?
            .ok_or_else(|| PaymentServiceError::PaymentNotFound(payment_id.to_owned()))
    }
}

fn require(field: &'static str, value: &str) -> Result<(), PaymentDomainError> {
    if value.trim().is_empty() {
        return Err(PaymentDomainError::EmptyIdentifier(field));
    }
    Ok(())
}
