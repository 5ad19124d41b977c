//! Mock implementations for testing.
//!
//! Test doubles for the clock port and a tracing layer that records log
//! output, so tests can drive time and assert on what the throttle logged.

pub mod clock;
pub mod layer;

pub use clock::MockClock;
pub use layer::{CapturedEvent, MockCaptureLayer};
