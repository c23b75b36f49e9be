//! mcphub: a registry and launcher for third-party MCP server packages.
//!
//! Publishers register metadata pointing at a source repository and an
//! entrypoint file. Consumers fetch that repository and run the entrypoint
//! on demand under a time budget, receiving normalized JSON output.
//!
//! # Architecture
//!
//! Each context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (filesystem, git, processes)
//!
//! # Modules
//!
//! - [`registry`]: Server records and the single-document registry store
//! - [`launcher`]: Repository fetching, workspaces and entrypoint execution
//! - [`hub`]: The external operations wiring registry and launcher together
//! - [`payment`]: Orders, checkout signature verification and payment status
//! - [`config`]: Environment-driven settings
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod error;
pub mod hub;
pub mod launcher;
pub mod payment;
pub mod registry;
pub mod telemetry;

pub use error::ErrorKind;
