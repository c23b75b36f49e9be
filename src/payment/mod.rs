//! Paid server purchases through an external payment gateway.
//!
//! Amounts are converted to currency subunits, orders are created through
//! the [`ports::PaymentGateway`] port and checkout signatures are verified
//! locally with the shared secret.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
