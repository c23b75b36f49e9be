//! Domain model for fetching and launching server packages.

mod entrypoint;
mod error;
mod normalize;
mod outcome;
mod runtime;
mod workspace;

pub use entrypoint::Entrypoint;
pub use error::LauncherDomainError;
pub use normalize::ResultNormalizer;
pub use outcome::ExecutionOutcome;
pub use runtime::{InterpreterTable, RuntimeKind};
pub use workspace::{Placement, Workspace, WorkspaceId, WorkspacePolicy};
