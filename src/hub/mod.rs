//! The hub's external operations over the registry and launcher.

mod error;
mod response;
mod service;

pub use error::HubServiceError;
pub use response::{PullReceipt, ServerListing};
pub use service::{HubService, HubServiceResult};
