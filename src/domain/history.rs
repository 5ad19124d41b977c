//! Rolling history of admitted reports.

use crate::domain::key::EqualityKey;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One admitted report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// When the report was admitted
    pub timestamp: Instant,
    /// Its equality key, or `None` if the key could not be derived
    pub key: Option<EqualityKey>,
}

/// Admitted reports in admission order.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry that is no longer inside `window` as seen from `now`.
    ///
    /// An entry survives while `timestamp > now - window`; an entry exactly
    /// `window` old is dropped. Survivors keep their relative order. Entries
    /// stamped after `now` are kept.
    ///
    /// Returns the number of evicted entries.
    pub fn evict_expired(&mut self, now: Instant, window: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| now.saturating_duration_since(entry.timestamp) < window);
        before - self.entries.len()
    }

    /// Count entries carrying `key`.
    pub fn count_duplicates(&self, key: &EqualityKey) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key.as_ref() == Some(key))
            .count()
    }

    /// Append an entry.
    pub fn push(&mut self, timestamp: Instant, key: Option<EqualityKey>) {
        self.entries.push_back(HistoryEntry { timestamp, key });
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over entries, oldest admission first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
