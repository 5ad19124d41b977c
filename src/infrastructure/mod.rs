//! Infrastructure layer - adapters the host wires in.
//!
//! This layer provides:
//! - Clock abstraction (system time vs mock)
//! - The `beforeSend` throttle plugin
//! - An ordered hook pipeline

pub mod clock;
pub mod pipeline;
pub mod plugin;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// report-throttle = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
