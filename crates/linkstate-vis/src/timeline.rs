//! Virtual-time task queue.
//!
//! Every deferred continuation of the choreography (the next frame of a
//! marker, a delayed launch, a flooding hop) is an entry in a [`Timeline`].
//! Entries are ordered by due time and then by the order they were scheduled,
//! so two entries due at the same instant run in scheduling order. Time only
//! moves when the owner pops entries or advances the clock, which makes runs
//! deterministic and lets tests fast-forward.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled entry, usable for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId {
    due: Duration,
    seq: u64,
}

impl TaskId {
    /// When the entry is due.
    pub fn due(&self) -> Duration {
        self.due
    }
}

/// Ordered queue of tasks keyed by virtual due time.
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    now: Duration,
    next_seq: u64,
    entries: BTreeMap<TaskId, T>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Timeline<T> {
    /// Create an empty timeline at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to run `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId {
            due: self.now + delay,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(id, task);
        id
    }

    /// Drop every pending entry. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.entries.len();
        self.entries.clear();
        cancelled
    }

    /// Due time of the earliest pending entry.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.keys().next().map(TaskId::due)
    }

    /// Pop the earliest entry if it is due at or before `until`, moving the
    /// clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<(Duration, T)> {
        let first = *self.entries.keys().next()?;
        if first.due > until {
            return None;
        }
        let task = self.entries.remove(&first)?;
        self.now = self.now.max(first.due);
        Some((first.due, task))
    }

    /// Move the clock forward to `to` (never backwards).
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
