//! Payment status and verification responses.

use serde::Serialize;

/// Payment as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentStatus {
    /// Gateway payment identifier.
    pub payment_id: String,
    /// Gateway status, such as `captured` or `failed`.
    pub status: String,
    /// Amount in subunits.
    pub amount: i64,
    /// Currency code.
    pub currency: String,
    /// Payment method, when reported.
    pub method: Option<String>,
    /// Payer email, when reported.
    pub email: Option<String>,
    /// Payer phone number, when reported.
    pub contact: Option<String>,
}

/// Response for a checkout whose signature verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentVerification {
    /// Always `"success"`.
    pub status: &'static str,
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Verified payment identifier.
    pub payment_id: String,
    /// Server the payment was for.
    pub server_name: String,
}

impl PaymentVerification {
    /// Builds the success response for a verified payment.
    #[must_use]
    pub fn success(payment_id: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: "Payment verified successfully",
            payment_id: payment_id.into(),
            server_name: server_name.into(),
        }
    }
}
