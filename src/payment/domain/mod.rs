//! Domain model for server purchases.

mod error;
mod order;
mod signature;
mod status;

pub use error::PaymentDomainError;
pub use order::{GatewayOrder, MAX_ORDER_AMOUNT, OrderDraft, OrderReceipt, OrderRequest};
pub use signature::SignatureVerifier;
pub use status::{PaymentStatus, PaymentVerification};
