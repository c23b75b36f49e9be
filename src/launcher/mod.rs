//! Fetching server repositories into workspaces and running their
//! entrypoints.
//!
//! Follows the same layout as [`crate::registry`]: domain types, port
//! contracts, adapters and orchestration services.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
