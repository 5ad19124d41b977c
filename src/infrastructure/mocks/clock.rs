//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Controllable clock for deterministic window tests.
///
/// Clones share the same time value, so a test can hand one clone to the
/// throttle and advance another.
///
/// # Examples
///
/// ```
/// use report_throttle::infrastructure::mocks::MockClock;
/// use report_throttle::Clock;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let clock = MockClock::new(start);
/// let shared = clock.clone();
///
/// clock.advance_millis(250);
/// assert_eq!(shared.now(), start + Duration::from_millis(250));
///
/// clock.set(start);
/// assert_eq!(shared.elapsed_since(start), Duration::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    current_time: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    pub fn new(start: Instant) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        *self.lock() += duration;
    }

    /// Advance the clock by a number of milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Set the clock to a specific instant, including one in the past.
    pub fn set(&self, instant: Instant) {
        *self.lock() = instant;
    }

    /// Time elapsed between `origin` and the clock's current instant.
    pub fn elapsed_since(&self, origin: Instant) -> Duration {
        self.lock().saturating_duration_since(origin)
    }

    fn lock(&self) -> MutexGuard<'_, Instant> {
        self.current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.lock()
    }
}
