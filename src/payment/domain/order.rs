//! Orders: what a consumer pays for a server.

use super::PaymentDomainError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Largest amount accepted, in major units.
pub const MAX_ORDER_AMOUNT: f64 = 1.0e13;

/// A consumer's request to pay for a server.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    server_name: String,
    amount: f64,
    currency: String,
}

impl OrderRequest {
    /// Validates an order request expressed in major currency units.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentDomainError`] for blank fields and for amounts that
    /// are negative, not finite or above [`MAX_ORDER_AMOUNT`].
    pub fn new(
        server_name: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
    ) -> Result<Self, PaymentDomainError> {
        let name = server_name.into().trim().to_owned();
        if name.is_empty() {
            return Err(PaymentDomainError::EmptyServerName);
        }
        if !amount.is_finite() || amount < 0.0 || amount > MAX_ORDER_AMOUNT {
            return Err(PaymentDomainError::InvalidAmount(amount.to_string()));
        }
        let code = currency.into().trim().to_owned();
        if code.is_empty() {
            return Err(PaymentDomainError::EmptyCurrency);
        }
        Ok(Self {
            server_name: name,
            amount,
            currency: code,
        })
    }

    /// Returns the server being paid for.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Returns the amount in major units as submitted.
    #[must_use]
    pub const fn amount(&self) -> f64 {
        self.amount
    }

    /// Returns the amount in the currency's smallest unit, truncated.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        reason = "amount is validated finite and bounded well inside i64"
    )]
    pub fn amount_subunits(&self) -> i64 {
        (self.amount * 100.0).trunc() as i64
    }

    /// Returns the currency code in upper case.
    #[must_use]
    pub fn currency_code(&self) -> String {
        self.currency.to_uppercase()
    }

    /// Builds the gateway order for this request.
    #[must_use]
    pub fn to_draft(&self) -> OrderDraft {
        let amount = self.amount_subunits();
        let mut notes = BTreeMap::new();
        notes.insert("server_name".to_owned(), self.server_name.clone());
        OrderDraft {
            amount,
            currency: self.currency_code(),
            receipt: format!("order_{}_{amount}", self.server_name),
            notes,
        }
    }
}

/// Order as submitted to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    /// Amount in subunits.
    pub amount: i64,
    /// Upper-case currency code.
    pub currency: String,
    /// Merchant receipt reference.
    pub receipt: String,
    /// Free-form metadata attached to the order.
    pub notes: BTreeMap<String, String>,
}

/// Order as acknowledged by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    /// Gateway order identifier.
    pub id: String,
    /// Amount in subunits.
    pub amount: i64,
    /// Currency code.
    pub currency: String,
}

/// Response returned to a client that created an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    /// Gateway order identifier.
    pub order_id: String,
    /// Amount in subunits.
    pub amount: i64,
    /// Currency code.
    pub currency: String,
    /// Public key identifier the client uses with the gateway checkout.
    pub key_id: String,
}
