//! Application services for fetching and launching servers.

mod fetcher;
mod launcher;

pub use fetcher::{Fetcher, FetcherError, FetcherResult};
pub use launcher::{Launcher, LauncherError, LauncherResult, LauncherSettings};
