//! Window admission controller.
//!
//! The controller owns one rolling history and decides, report by report,
//! whether delivery goes ahead. Each decision (evict, count, check limits,
//! record) runs under a single lock so the counts that drive the limits are
//! exactly the entries the decision sees.

use crate::application::metrics::Metrics;
use crate::application::ports::Clock;
use crate::domain::{
    history::History,
    key::EqualityKey,
    policy::{Decision, RejectReason, WindowPolicy},
    report::ErrorReport,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Decides whether reports are delivered.
///
/// One controller corresponds to one client session. Share it with `Arc`.
#[derive(Debug)]
pub struct ThrottleController {
    policy: WindowPolicy,
    history: Mutex<History>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl ThrottleController {
    /// Create a controller with an empty history.
    ///
    /// # Arguments
    /// * `policy` - Window length and limits
    /// * `clock` - Time source sampled once per decision
    /// * `metrics` - Metrics tracker
    pub fn new(policy: WindowPolicy, clock: Arc<dyn Clock>, metrics: Metrics) -> Self {
        Self {
            policy,
            history: Mutex::new(History::new()),
            clock,
            metrics,
        }
    }

    /// Decide on a report using the controller's clock.
    pub fn decide<M: Serialize>(&self, report: &ErrorReport<M>) -> Decision {
        let now = self.clock.now();
        self.decide_at(report, now)
    }

    /// Decide on a report at an explicit instant.
    ///
    /// # Fail-Safe Behavior
    /// If the report's equality key cannot be derived, the report is treated
    /// as having no duplicates. It is still subject to the window event limit
    /// and, when admitted, occupies a slot that matches nothing.
    pub fn decide_at<M: Serialize>(&self, report: &ErrorReport<M>, now: Instant) -> Decision {
        let key = match EqualityKey::extract(report) {
            Ok(key) => Some(key),
            Err(e) => {
                self.metrics.record_key_failure();
                tracing::warn!(
                    error = %e,
                    error_class = report.error_class.as_deref().unwrap_or(""),
                    "Could not derive equality key for report; treating it as unique"
                );
                None
            }
        };

        let decision = {
            let mut history = self.lock_history();
            let decision = self.policy.apply(&mut history, key.as_ref(), now);

            if let Decision::Reject(reason) = decision {
                tracing::debug!(
                    reason = %reason,
                    key = %key.as_ref().map(ToString::to_string).unwrap_or_default(),
                    in_window = history.len(),
                    max_events = self.policy.max_events_per_window(),
                    max_duplicates = self.policy.max_duplicate_events_per_window(),
                    "Report rejected by throttle"
                );
            }
            decision
        };

        match decision {
            Decision::Accept => self.metrics.record_accepted(),
            Decision::Reject(RejectReason::DuplicateLimit) => {
                self.metrics.record_duplicate_rejected()
            }
            Decision::Reject(RejectReason::WindowFull) => {
                self.metrics.record_window_full_rejected()
            }
        }

        decision
    }

    /// Number of reports currently held in the history.
    ///
    /// Entries are only evicted during a decision, so this may include
    /// entries that have already aged out of the window.
    pub fn history_len(&self) -> usize {
        self.lock_history().len()
    }

    /// Forget every admitted report.
    pub fn clear(&self) {
        self.lock_history().clear();
        tracing::trace!("Throttle history cleared");
    }

    /// Get the policy in force.
    pub fn policy(&self) -> &WindowPolicy {
        &self.policy
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// The history is plain data and every mutation leaves it valid, so a
    /// poisoned lock is recovered rather than propagated.
    fn lock_history(&self) -> MutexGuard<'_, History> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
