//! Application services for payments.

mod payment;

pub use payment::{
    PaymentCredentials, PaymentService, PaymentServiceError, PaymentServiceResult,
    VerifyPaymentRequest,
};
