//! Port contracts for payments.

mod gateway;

#[cfg(test)]
pub use gateway::MockPaymentGateway;
pub use gateway::{PaymentGateway, PaymentGatewayError, PaymentGatewayResult};
