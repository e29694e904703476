//! Shared helpers for the integration tests.

/// Tracing setup and run helpers.
pub mod harness;
