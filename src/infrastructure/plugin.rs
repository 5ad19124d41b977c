//! Delivery hook that applies the throttle to outbound reports.
//!
//! `ThrottlePlugin` implements the [`BeforeSend`] port: the host calls it just
//! before delivering a report, and the plugin marks the report ignored when
//! the controller rejects it. Accepted reports are left untouched.

use crate::application::{
    config::{ConfigError, ThrottleConfig},
    controller::ThrottleController,
    metrics::Metrics,
    ports::{BeforeSend, Clock},
};
use crate::domain::{policy::Decision, report::ErrorReport};
use crate::infrastructure::clock::SystemClock;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Error returned when building a `ThrottlePlugin` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Configuration validation failed
    Config(ConfigError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Config(e) => write!(f, "throttle configuration error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Config(e) => Some(e),
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(e: ConfigError) -> Self {
        BuildError::Config(e)
    }
}

/// Builder for constructing a `ThrottlePlugin`.
#[derive(Debug)]
pub struct ThrottlePluginBuilder {
    config: ThrottleConfig,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Metrics>,
}

impl ThrottlePluginBuilder {
    /// Replace all three limits at once.
    pub fn with_config(mut self, config: ThrottleConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the sliding window length.
    ///
    /// The window is kept at millisecond precision; anything under one
    /// millisecond is rejected by `build()`.
    pub fn with_event_window(mut self, window: Duration) -> Self {
        self.config.event_window_size = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the number of reports admitted per window.
    pub fn with_max_events_per_window(mut self, max: usize) -> Self {
        self.config.max_events_per_window = max as u64;
        self
    }

    /// Set the number of identical reports admitted per window.
    pub fn with_max_duplicate_events_per_window(mut self, max: usize) -> Self {
        self.config.max_duplicate_events_per_window = max as u64;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Record into an existing metrics tracker.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the plugin.
    ///
    /// # Errors
    /// Returns `BuildError::Config` if any limit is zero.
    pub fn build(self) -> Result<ThrottlePlugin, BuildError> {
        let policy = self.config.to_policy()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let metrics = self.metrics.unwrap_or_default();

        tracing::debug!(
            event_window_ms = self.config.event_window_size,
            max_events = self.config.max_events_per_window,
            max_duplicates = self.config.max_duplicate_events_per_window,
            "Report throttle configured"
        );

        Ok(ThrottlePlugin {
            controller: Arc::new(ThrottleController::new(policy, clock, metrics)),
        })
    }
}

/// A `beforeSend` hook that drops reports over the window limits.
///
/// Clones share the same controller and therefore the same history.
#[derive(Debug, Clone)]
pub struct ThrottlePlugin {
    controller: Arc<ThrottleController>,
}

impl ThrottlePlugin {
    /// Create a builder for configuring the plugin.
    ///
    /// Defaults:
    /// - Window: 60 seconds
    /// - Max events per window: 100
    /// - Max duplicate events per window: 10
    /// - Clock: system clock
    pub fn builder() -> ThrottlePluginBuilder {
        ThrottlePluginBuilder {
            config: ThrottleConfig::default(),
            clock: None,
            metrics: None,
        }
    }

    /// Create a plugin with default settings.
    pub fn new() -> Self {
        Self::with_controller(Arc::new(ThrottleController::new(
            Default::default(),
            Arc::new(SystemClock::new()),
            Metrics::new(),
        )))
    }

    /// Create a plugin from the host's configuration object.
    ///
    /// # Errors
    /// Returns `BuildError::Config` if an option is present but not a positive
    /// integer.
    ///
    /// # Example
    ///
    /// ```
    /// # use report_throttle::ThrottlePlugin;
    /// # use serde_json::json;
    /// let plugin = ThrottlePlugin::from_host_config(&json!({
    ///     "apiKey": "0123456789abcdef",
    ///     "maxEventsPerWindow": 20,
    /// }))
    /// .unwrap();
    /// assert_eq!(plugin.controller().policy().max_events_per_window(), 20);
    /// ```
    pub fn from_host_config(config: &Value) -> Result<Self, BuildError> {
        Self::builder()
            .with_config(ThrottleConfig::from_json(config)?)
            .build()
    }

    /// Wrap an existing controller.
    pub fn with_controller(controller: Arc<ThrottleController>) -> Self {
        Self { controller }
    }

    /// Decide on a report without marking it.
    pub fn check<M: Serialize>(&self, report: &ErrorReport<M>) -> Decision {
        self.controller.decide(report)
    }

    /// Get a reference to the underlying controller.
    pub fn controller(&self) -> &Arc<ThrottleController> {
        &self.controller
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        self.controller.metrics()
    }
}

impl Default for ThrottlePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Serialize> BeforeSend<M> for ThrottlePlugin {
    fn before_send(&self, report: &mut ErrorReport<M>) {
        // Already dropped by an earlier hook; don't spend window budget on it
        if report.is_ignored() {
            return;
        }

        if self.controller.decide(report).is_reject() {
            report.ignore();
        }
    }
}
