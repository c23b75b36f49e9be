//! Unit tests for the registry context.

mod store_tests;
