//! Step definitions for server execution scenarios.

mod given;
mod then;
mod when;
pub mod world;
