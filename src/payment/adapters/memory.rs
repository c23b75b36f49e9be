//! In-memory payment gateway.

use crate::payment::{
    domain::{GatewayOrder, OrderDraft, PaymentStatus},
    ports::{PaymentGateway, PaymentGatewayError, PaymentGatewayResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    orders: Vec<(GatewayOrder, OrderDraft)>,
    payments: HashMap<String, PaymentStatus>,
}

/// Thread-safe in-memory payment gateway.
///
/// Orders get `order_<uuid>` identifiers. Payments only exist once recorded
/// with [`InMemoryPaymentGateway::record_payment`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

fn lock_error(err: impl std::fmt::Display) -> PaymentGatewayError {
    PaymentGatewayError::unavailable(std::io::Error::other(format!(
        "payment gateway lock poisoned: {err}"
    )))
}

impl InMemoryPaymentGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a payment so it can be fetched.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentGatewayError::Unavailable`] when the state lock is
    /// poisoned.
    pub fn record_payment(&self, payment: PaymentStatus) -> PaymentGatewayResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.payments.insert(payment.payment_id.clone(), payment);
        Ok(())
    }

    /// Returns the drafts of every created order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentGatewayError::Unavailable`] when the state lock is
    /// poisoned.
    pub fn drafts(&self) -> PaymentGatewayResult<Vec<OrderDraft>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.orders.iter().map(|(_, draft)| draft.clone()).collect())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_order(&self, draft: &OrderDraft) -> PaymentGatewayResult<GatewayOrder> {
        if draft.amount <= 0 {
            return Err(PaymentGatewayError::Rejected(
                "order amount must be positive".to_owned(),
            ));
        }
        let order = GatewayOrder {
            id: format!("order_{}", Uuid::new_v4().simple()),
            amount: draft.amount,
            currency: draft.currency.clone(),
        };
        let mut state = self.state.write().map_err(lock_error)?;
        state.orders.push((order.clone(), draft.clone()));
        Ok(order)
    }

    async fn fetch_payment(&self, payment_id: &str) -> PaymentGatewayResult<Option<PaymentStatus>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.payments.get(payment_id).cloned())
    }
}
