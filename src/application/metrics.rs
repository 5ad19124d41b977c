//! Observability metrics for report throttling.
//!
//! Counts what the throttle did with each report for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking throttling statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Reports let through
    reports_accepted: AtomicU64,
    /// Reports dropped by the duplicate limit
    duplicates_rejected: AtomicU64,
    /// Reports dropped by the window event limit
    window_full_rejected: AtomicU64,
    /// Reports whose equality key could not be derived
    key_failures: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                reports_accepted: AtomicU64::new(0),
                duplicates_rejected: AtomicU64::new(0),
                window_full_rejected: AtomicU64::new(0),
                key_failures: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_accepted(&self) {
        self.inner.reports_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate_rejected(&self) {
        self.inner
            .duplicates_rejected
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_window_full_rejected(&self) {
        self.inner
            .window_full_rejected
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_key_failure(&self) {
        self.inner.key_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of reports accepted.
    pub fn reports_accepted(&self) -> u64 {
        self.inner.reports_accepted.load(Ordering::Relaxed)
    }

    /// Get the number of reports rejected as duplicates.
    pub fn duplicates_rejected(&self) -> u64 {
        self.inner.duplicates_rejected.load(Ordering::Relaxed)
    }

    /// Get the number of reports rejected because the window was full.
    pub fn window_full_rejected(&self) -> u64 {
        self.inner.window_full_rejected.load(Ordering::Relaxed)
    }

    /// Get the total number of rejected reports.
    pub fn reports_rejected(&self) -> u64 {
        self.duplicates_rejected()
            .saturating_add(self.window_full_rejected())
    }

    /// Get the number of reports whose key could not be derived.
    pub fn key_failures(&self) -> u64 {
        self.inner.key_failures.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reports_accepted: self.reports_accepted(),
            duplicates_rejected: self.duplicates_rejected(),
            window_full_rejected: self.window_full_rejected(),
            key_failures: self.key_failures(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.reports_accepted.store(0, Ordering::Relaxed);
        self.inner.duplicates_rejected.store(0, Ordering::Relaxed);
        self.inner.window_full_rejected.store(0, Ordering::Relaxed);
        self.inner.key_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub reports_accepted: u64,
    pub duplicates_rejected: u64,
    pub window_full_rejected: u64,
    pub key_failures: u64,
}

impl MetricsSnapshot {
    /// Total rejected reports.
    pub fn reports_rejected(&self) -> u64 {
        self.duplicates_rejected
            .saturating_add(self.window_full_rejected)
    }

    /// Total reports seen (accepted + rejected).
    pub fn total_reports(&self) -> u64 {
        self.reports_accepted
            .saturating_add(self.reports_rejected())
    }

    /// Ratio of rejected reports to all reports (0.0 to 1.0).
    ///
    /// Returns 0.0 if no reports have been processed.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_reports();
        if total == 0 {
            0.0
        } else {
            self.reports_rejected() as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot {
            reports_accepted: 0,
            duplicates_rejected: 0,
            window_full_rejected: 0,
            key_failures: 0,
        });
    }

    #[test]
    fn test_record_each_counter() {
        let metrics = Metrics::new();
        metrics.record_accepted();
        metrics.record_accepted();
        metrics.record_duplicate_rejected();
        metrics.record_window_full_rejected();
        metrics.record_window_full_rejected();
        metrics.record_window_full_rejected();
        metrics.record_key_failure();

        assert_eq!(metrics.reports_accepted(), 2);
        assert_eq!(metrics.duplicates_rejected(), 1);
        assert_eq!(metrics.window_full_rejected(), 3);
        assert_eq!(metrics.reports_rejected(), 4);
        assert_eq!(metrics.key_failures(), 1);
    }

    #[test]
    fn test_snapshot_rejection_rate() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().rejection_rate(), 0.0);

        metrics.record_accepted();
        assert_eq!(metrics.snapshot().rejection_rate(), 0.0);

        metrics.record_duplicate_rejected();
        assert!((metrics.snapshot().rejection_rate() - 0.5).abs() < f64::EPSILON);

        metrics.record_window_full_rejected();
        metrics.record_window_full_rejected();
        assert!((metrics.snapshot().rejection_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(metrics.snapshot().total_reports(), 4);
    }

    #[test]
    fn test_key_failures_not_part_of_totals() {
        let metrics = Metrics::new();
        metrics.record_key_failure();
        metrics.record_accepted();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_reports(), 1);
        assert_eq!(snapshot.key_failures, 1);
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        metrics.record_accepted();
        metrics.record_duplicate_rejected();
        metrics.record_key_failure();

        metrics.reset();
        assert_eq!(metrics.snapshot().total_reports(), 0);
        assert_eq!(metrics.key_failures(), 0);
    }

    #[test]
    fn test_metrics_clone_shares_counters() {
        let m1 = Metrics::new();
        m1.record_accepted();

        let m2 = m1.clone();
        m2.record_accepted();

        assert_eq!(m1.reports_accepted(), 2);
        assert_eq!(m2.reports_accepted(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::thread;

        let metrics = Metrics::new();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_accepted();
                    m.record_duplicate_rejected();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.reports_accepted(), 1000);
        assert_eq!(metrics.duplicates_rejected(), 1000);
    }
}
