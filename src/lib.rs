//! # report-throttle
//!
//! Sliding-window throttling and deduplication for outbound error reports.
//!
//! An error-reporting client can flood its collector when something breaks in
//! a loop: the same exception thrown on every frame, or a cascade of distinct
//! failures after a dependency goes down. This crate provides a `beforeSend`
//! hook that drops reports once either of two limits is reached inside a
//! sliding time window:
//!
//! - **Volume**: at most `maxEventsPerWindow` reports are admitted per window.
//! - **Duplicates**: a report whose content matches an already-admitted report
//!   is admitted at most `maxDuplicateEventsPerWindow` more times per window.
//!
//! Rejected reports are marked ignored and never enter the window, so they do
//! not extend it.
//!
//! ## Quick Start
//!
//! ```rust
//! use report_throttle::{BeforeSend, ErrorReport, ThrottlePlugin};
//! use std::time::Duration;
//!
//! let throttle = ThrottlePlugin::builder()
//!     .with_event_window(Duration::from_secs(60))
//!     .with_max_events_per_window(100)
//!     .with_max_duplicate_events_per_window(10)
//!     .build()
//!     .unwrap();
//!
//! let mut report: ErrorReport = ErrorReport::new("TypeError", "x is undefined");
//! throttle.before_send(&mut report);
//!
//! if !report.is_ignored() {
//!     // hand the report to the transport
//! }
//! ```
//!
//! ## Configuration
//!
//! The host client passes its configuration object straight through; only
//! the throttle's own options are read:
//!
//! | option                        | default | meaning                          |
//! |-------------------------------|---------|----------------------------------|
//! | `eventWindowSize`             | 60000   | sliding window length in ms      |
//! | `maxEventsPerWindow`          | 100     | reports admitted per window      |
//! | `maxDuplicateEventsPerWindow` | 10      | identical reports per window     |
//!
//! ```rust
//! use report_throttle::ThrottlePlugin;
//! use serde_json::json;
//!
//! let throttle = ThrottlePlugin::from_host_config(&json!({
//!     "apiKey": "0123456789abcdef",
//!     "eventWindowSize": 10_000,
//! }))
//! .unwrap();
//!
//! let err = ThrottlePlugin::from_host_config(&json!({ "maxEventsPerWindow": "lots" }))
//!     .unwrap_err();
//! assert!(err.to_string().contains("maxEventsPerWindow must be a number if specified"));
//! # let _ = throttle;
//! ```
//!
//! ## What Counts as a Duplicate
//!
//! Two reports are duplicates when these fields are equal, compared by value:
//! `apiKey`, `errorClass`, `errorMessage`, `stacktrace`, `context`,
//! `groupingHash`, `metaData`, `handledState`, `user` and `app`.
//!
//! Breadcrumbs and device data are left out because they change between
//! otherwise identical failures. A field that is absent differs from the same
//! field set to `null`. Object key order is irrelevant, array order is not.
//!
//! ## Hook Pipelines
//!
//! Hosts that run several `beforeSend` hooks can use [`SendPipeline`], which
//! runs hooks in order and stops at the first one that ignores the report.
//! Place the throttle last so reports dropped by earlier filters do not use up
//! window budget:
//!
//! ```rust
//! use report_throttle::{ErrorReport, SendPipeline, ThrottlePlugin};
//!
//! let mut pipeline = SendPipeline::new();
//! pipeline.push(|report: &mut ErrorReport| {
//!     if report.error_class.as_deref() == Some("ResizeObserverError") {
//!         report.ignore();
//!     }
//! });
//! pipeline.push(ThrottlePlugin::new());
//!
//! let deliver = pipeline.run(&mut ErrorReport::new("Error", "boom"));
//! assert!(deliver);
//! ```
//!
//! ## Observability
//!
//! ```rust
//! # use report_throttle::ThrottlePlugin;
//! # let throttle = ThrottlePlugin::new();
//! let snapshot = throttle.metrics().snapshot();
//! println!("accepted: {}", snapshot.reports_accepted);
//! println!("rejected as duplicates: {}", snapshot.duplicates_rejected);
//! println!("rejected, window full: {}", snapshot.window_full_rejected);
//! println!("rejection rate: {:.2}%", snapshot.rejection_rate() * 100.0);
//! ```
//!
//! Rejections are logged through `tracing` at `DEBUG`. A report whose
//! equality key cannot be computed is logged at `WARN`.
//!
//! ## Fail-Safe Operation
//!
//! If a report's content cannot be serialized to derive its equality key (a
//! cyclic custom `Serialize` impl, a map with non-string keys), the report is
//! treated as unique. It is still counted toward the volume limit, but never
//! against the duplicate limit. The throttle never panics on report content.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    history::{History, HistoryEntry},
    key::{EqualityKey, KeyError},
    policy::{Decision, PolicyError, RejectReason, WindowPolicy},
    report::{Breadcrumb, ErrorReport, HandledState, Severity, StackFrame},
};

pub use application::{
    config::{ConfigError, ThrottleConfig},
    controller::ThrottleController,
    metrics::{Metrics, MetricsSnapshot},
    ports::{BeforeSend, Clock},
};

pub use infrastructure::{
    clock::SystemClock,
    pipeline::SendPipeline,
    plugin::{BuildError, ThrottlePlugin, ThrottlePluginBuilder},
};
