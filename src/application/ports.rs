//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::report::ErrorReport;
use std::fmt::Debug;
use std::time::Instant;

/// Port for obtaining current time.
///
/// This abstraction allows the application layer to work with time
/// without depending on system clock implementation details.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for hooks that run just before a report is delivered.
///
/// A hook may inspect the report and call [`ErrorReport::ignore`] to stop
/// delivery. It must not block: the host calls hooks synchronously on its
/// delivery path.
pub trait BeforeSend<M = serde_json::Value>: Send + Sync {
    /// Inspect a report about to be sent.
    fn before_send(&self, report: &mut ErrorReport<M>);
}

impl<M, F> BeforeSend<M> for F
where
    F: Fn(&mut ErrorReport<M>) + Send + Sync,
{
    fn before_send(&self, report: &mut ErrorReport<M>) {
        self(report)
    }
}
