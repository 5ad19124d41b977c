//! Sliding-window admission policy.
//!
//! A report is admitted unless either limit is hit:
//! - more than `max_duplicate_events_per_window` identical reports were
//!   already admitted inside the window, or
//! - `max_events_per_window` reports of any kind were already admitted
//!   inside the window.

use crate::domain::history::History;
use crate::domain::key::EqualityKey;
use std::fmt;
use std::time::{Duration, Instant};

/// Why a report was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Too many identical reports inside the window
    DuplicateLimit,
    /// The window's total event budget is used up
    WindowFull,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::DuplicateLimit => write!(f, "duplicate limit reached"),
            RejectReason::WindowFull => write!(f, "window event limit reached"),
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Deliver the report
    Accept,
    /// Drop the report
    Reject(RejectReason),
}

impl Decision {
    /// Check if this decision is Accept.
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }

    /// Check if this decision is Reject.
    pub fn is_reject(&self) -> bool {
        matches!(self, Decision::Reject(_))
    }

    /// The rejection reason, if any.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Decision::Accept => None,
            Decision::Reject(reason) => Some(*reason),
        }
    }
}

/// Error returned when policy parameters are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Window length must be greater than zero
    ZeroWindow,
    /// Max events per window must be greater than zero
    ZeroMaxEvents,
    /// Max duplicate events per window must be greater than zero
    ZeroMaxDuplicates,
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::ZeroWindow => write!(f, "event window must be greater than 0"),
            PolicyError::ZeroMaxEvents => {
                write!(f, "max events per window must be greater than 0")
            }
            PolicyError::ZeroMaxDuplicates => {
                write!(f, "max duplicate events per window must be greater than 0")
            }
        }
    }
}

impl std::error::Error for PolicyError {}

/// Limits applied over the sliding window.
///
/// # Example
/// ```
/// use report_throttle::{History, WindowPolicy, EqualityKey};
/// use std::time::{Duration, Instant};
///
/// let policy = WindowPolicy::new(Duration::from_millis(1000), 3, 1).unwrap();
/// let mut history = History::new();
/// let key = EqualityKey::from_canonical("k1");
/// let t0 = Instant::now();
///
/// assert!(policy.apply(&mut history, Some(&key), t0).is_accept());
/// // First duplicate still fits: one prior occurrence is not > 1
/// assert!(policy.apply(&mut history, Some(&key), t0 + Duration::from_millis(100)).is_accept());
/// // Second duplicate does not
/// assert!(policy.apply(&mut history, Some(&key), t0 + Duration::from_millis(200)).is_reject());
/// // Once the window has passed, the slate is clean
/// assert!(policy.apply(&mut history, Some(&key), t0 + Duration::from_millis(1100)).is_accept());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    event_window: Duration,
    max_events_per_window: usize,
    max_duplicate_events_per_window: usize,
}

impl WindowPolicy {
    /// Default window length (one minute).
    pub const DEFAULT_EVENT_WINDOW: Duration = Duration::from_millis(60_000);
    /// Default total events per window.
    pub const DEFAULT_MAX_EVENTS: usize = 100;
    /// Default duplicate events per window.
    pub const DEFAULT_MAX_DUPLICATES: usize = 10;

    /// Create a policy.
    ///
    /// # Errors
    /// Returns a `PolicyError` if any parameter is zero.
    pub fn new(
        event_window: Duration,
        max_events_per_window: usize,
        max_duplicate_events_per_window: usize,
    ) -> Result<Self, PolicyError> {
        if event_window.is_zero() {
            return Err(PolicyError::ZeroWindow);
        }
        if max_events_per_window == 0 {
            return Err(PolicyError::ZeroMaxEvents);
        }
        if max_duplicate_events_per_window == 0 {
            return Err(PolicyError::ZeroMaxDuplicates);
        }
        Ok(Self {
            event_window,
            max_events_per_window,
            max_duplicate_events_per_window,
        })
    }

    /// Length of the sliding window.
    pub fn event_window(&self) -> Duration {
        self.event_window
    }

    /// Total reports admitted per window.
    pub fn max_events_per_window(&self) -> usize {
        self.max_events_per_window
    }

    /// Prior identical reports tolerated per window.
    pub fn max_duplicate_events_per_window(&self) -> usize {
        self.max_duplicate_events_per_window
    }

    /// Decide on one report and update `history` on admission.
    ///
    /// Steps, in order: evict entries outside the window, count entries with
    /// the same key, reject if that count exceeds the duplicate limit, reject
    /// if the history already holds the window's event budget, otherwise
    /// record `now` with the key and accept.
    ///
    /// A `None` key never matches anything, so only the volume limit applies.
    pub fn apply(
        &self,
        history: &mut History,
        key: Option<&EqualityKey>,
        now: Instant,
    ) -> Decision {
        history.evict_expired(now, self.event_window);

        let dupes = key.map_or(0, |k| history.count_duplicates(k));

        if dupes > self.max_duplicate_events_per_window {
            return Decision::Reject(RejectReason::DuplicateLimit);
        }

        if history.len() >= self.max_events_per_window {
            return Decision::Reject(RejectReason::WindowFull);
        }

        history.push(now, key.cloned());
        Decision::Accept
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            event_window: Self::DEFAULT_EVENT_WINDOW,
            max_events_per_window: Self::DEFAULT_MAX_EVENTS,
            max_duplicate_events_per_window: Self::DEFAULT_MAX_DUPLICATES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn key(s: &str) -> EqualityKey {
        EqualityKey::from_canonical(s)
    }

    #[test]
    fn test_defaults() {
        let policy = WindowPolicy::default();
        assert_eq!(policy.event_window(), ms(60_000));
        assert_eq!(policy.max_events_per_window(), 100);
        assert_eq!(policy.max_duplicate_events_per_window(), 10);
    }

    #[test]
    fn test_zero_parameters_rejected() {
        assert_eq!(
            WindowPolicy::new(Duration::ZERO, 1, 1),
            Err(PolicyError::ZeroWindow)
        );
        assert_eq!(WindowPolicy::new(ms(1), 0, 1), Err(PolicyError::ZeroMaxEvents));
        assert_eq!(
            WindowPolicy::new(ms(1), 1, 0),
            Err(PolicyError::ZeroMaxDuplicates)
        );
    }

    #[test]
    fn test_duplicate_window_scenario() {
        let policy = WindowPolicy::new(ms(1000), 3, 1).unwrap();
        let mut history = History::new();
        let k1 = key("k1");
        let t0 = Instant::now();

        assert_eq!(policy.apply(&mut history, Some(&k1), t0), Decision::Accept);
        assert_eq!(
            policy.apply(&mut history, Some(&k1), t0 + ms(100)),
            Decision::Accept
        );
        assert_eq!(
            policy.apply(&mut history, Some(&k1), t0 + ms(200)),
            Decision::Reject(RejectReason::DuplicateLimit)
        );
        assert_eq!(
            policy.apply(&mut history, Some(&k1), t0 + ms(1100)),
            Decision::Accept
        );
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_volume_scenario() {
        let policy = WindowPolicy::new(ms(60_000), 2, 10).unwrap();
        let mut history = History::new();
        let now = Instant::now();

        assert!(policy.apply(&mut history, Some(&key("k1")), now).is_accept());
        assert!(policy.apply(&mut history, Some(&key("k2")), now).is_accept());
        assert_eq!(
            policy.apply(&mut history, Some(&key("k3")), now),
            Decision::Reject(RejectReason::WindowFull)
        );
    }

    #[test]
    fn test_duplicate_boundary() {
        for n in 1..=5 {
            let policy = WindowPolicy::new(ms(60_000), 100, n).unwrap();
            let mut history = History::new();
            let k = key("same");
            let now = Instant::now();

            // Original plus n duplicates are admitted
            for i in 0..=n {
                assert!(
                    policy.apply(&mut history, Some(&k), now).is_accept(),
                    "occurrence {} with limit {} should be accepted",
                    i + 1,
                    n
                );
            }
            assert_eq!(history.count_duplicates(&k), n + 1);

            // Next one exceeds the limit
            assert_eq!(
                policy.apply(&mut history, Some(&k), now),
                Decision::Reject(RejectReason::DuplicateLimit)
            );
        }
    }

    #[test]
    fn test_volume_boundary() {
        for m in 1..=5 {
            let policy = WindowPolicy::new(ms(60_000), m, 100).unwrap();
            let mut history = History::new();
            let now = Instant::now();

            for i in 0..m {
                let k = key(&format!("k{}", i));
                assert!(policy.apply(&mut history, Some(&k), now).is_accept());
            }

            let fresh = key("never-seen");
            assert_eq!(
                policy.apply(&mut history, Some(&fresh), now),
                Decision::Reject(RejectReason::WindowFull)
            );
            assert_eq!(history.len(), m);
        }
    }

    #[test]
    fn test_duplicate_check_precedes_volume_check() {
        let policy = WindowPolicy::new(ms(60_000), 2, 1).unwrap();
        let mut history = History::new();
        let k = key("k");
        let now = Instant::now();

        assert!(policy.apply(&mut history, Some(&k), now).is_accept());
        assert!(policy.apply(&mut history, Some(&k), now).is_accept());

        // Both limits are hit; the duplicate limit is reported
        assert_eq!(
            policy.apply(&mut history, Some(&k), now),
            Decision::Reject(RejectReason::DuplicateLimit)
        );
    }

    #[test]
    fn test_rejections_do_not_enter_history() {
        let policy = WindowPolicy::new(ms(60_000), 1, 10).unwrap();
        let mut history = History::new();
        let now = Instant::now();

        assert!(policy.apply(&mut history, Some(&key("a")), now).is_accept());
        for _ in 0..10 {
            assert!(policy.apply(&mut history, Some(&key("b")), now).is_reject());
        }
        assert_eq!(history.len(), 1);
        assert_eq!(history.count_duplicates(&key("b")), 0);
    }

    #[test]
    fn test_expired_entries_do_not_count() {
        let policy = WindowPolicy::new(ms(1000), 1, 1).unwrap();
        let mut history = History::new();
        let t0 = Instant::now();

        assert!(policy.apply(&mut history, Some(&key("a")), t0).is_accept());
        assert!(policy
            .apply(&mut history, Some(&key("b")), t0 + ms(999))
            .is_reject());

        // Exactly at the boundary the old entry is gone
        assert!(policy
            .apply(&mut history, Some(&key("b")), t0 + ms(1000))
            .is_accept());
    }

    #[test]
    fn test_sliding_window_partially_expires() {
        let policy = WindowPolicy::new(ms(1000), 2, 10).unwrap();
        let mut history = History::new();
        let t0 = Instant::now();

        assert!(policy.apply(&mut history, Some(&key("a")), t0).is_accept());
        assert!(policy
            .apply(&mut history, Some(&key("b")), t0 + ms(500))
            .is_accept());
        assert!(policy
            .apply(&mut history, Some(&key("c")), t0 + ms(900))
            .is_reject());

        // The t0 entry has expired, the t0+500 one has not
        assert!(policy
            .apply(&mut history, Some(&key("c")), t0 + ms(1000))
            .is_accept());
        assert!(policy
            .apply(&mut history, Some(&key("d")), t0 + ms(1001))
            .is_reject());
    }

    #[test]
    fn test_unkeyed_report_only_subject_to_volume() {
        let policy = WindowPolicy::new(ms(60_000), 3, 1).unwrap();
        let mut history = History::new();
        let now = Instant::now();

        assert!(policy.apply(&mut history, None, now).is_accept());
        assert!(policy.apply(&mut history, None, now).is_accept());
        assert!(policy.apply(&mut history, None, now).is_accept());
        assert_eq!(
            policy.apply(&mut history, None, now),
            Decision::Reject(RejectReason::WindowFull)
        );
    }

    #[test]
    fn test_decision_helpers() {
        assert!(Decision::Accept.is_accept());
        assert!(!Decision::Accept.is_reject());
        assert_eq!(Decision::Accept.reject_reason(), None);

        let rejected = Decision::Reject(RejectReason::WindowFull);
        assert!(rejected.is_reject());
        assert_eq!(rejected.reject_reason(), Some(RejectReason::WindowFull));
    }
}
