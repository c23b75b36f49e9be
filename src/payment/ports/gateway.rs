//! Port for the external payment gateway.

use crate::payment::domain::{GatewayOrder, OrderDraft, PaymentStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for payment gateway operations.
pub type PaymentGatewayResult<T> = Result<T, PaymentGatewayError>;

/// Creates orders and reports payments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Registers an order with the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentGatewayError`] when the gateway rejects the order or
    /// cannot be reached.
    async fn create_order(&self, draft: &OrderDraft) -> PaymentGatewayResult<GatewayOrder>;

    /// Looks up a payment by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentGatewayError`] when the gateway cannot be reached.
    async fn fetch_payment(&self, payment_id: &str) -> PaymentGatewayResult<Option<PaymentStatus>>;
}

/// Errors returned by payment gateways.
#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    /// The gateway refused the request as invalid.
    #[error("payment gateway rejected the request: {0}")]
    Rejected(String),

    /// The gateway failed or could not be reached.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl PaymentGatewayError {
    /// Wraps an infrastructure error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
