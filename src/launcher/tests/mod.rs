//! Unit tests for the launcher context.
