//! Adapter implementations for the payment ports.

pub mod memory;

pub use memory::InMemoryPaymentGateway;
