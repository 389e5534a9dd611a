//! Lifecycle event journal
//!
//! Append-only, capacity-bounded log of lifecycle events used for diagnostics.
//! Storage order is insertion order (oldest first); presentation layers that
//! want newest-first reverse the snapshot themselves.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Default number of entries kept before the oldest are evicted.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 200;

/// A single journaled lifecycle event. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct EventLogEntry {
    /// Monotonic id, unique within one journal
    pub id: u64,

    /// Human-readable event description
    pub text: String,

    /// Wall-clock time the event was appended
    pub timestamp: DateTime<Utc>,
}

/// Bounded FIFO journal of lifecycle events.
///
/// Appends always succeed; once capacity is reached the oldest entry is
/// evicted. Interior locking keeps `append` usable from any handler without
/// threading `&mut` through the orchestration code.
pub struct EventJournal {
    capacity: usize,
    inner: Mutex<JournalInner>,
}

struct JournalInner {
    next_id: u64,
    entries: VecDeque<EventLogEntry>,
}

impl EventJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(JournalInner {
                next_id: 0,
                entries: VecDeque::new(),
            }),
        }
    }

    /// Append an event, assigning it a monotonic id and timestamp.
    pub fn append(&self, text: impl Into<String>) -> EventLogEntry {
        let entry = {
            let mut inner = self.inner.lock().expect("journal lock poisoned");

            let entry = EventLogEntry {
                id: inner.next_id,
                text: text.into(),
                timestamp: Utc::now(),
            };
            inner.next_id += 1;

            if inner.entries.len() == self.capacity {
                inner.entries.pop_front();
            }
            inner.entries.push_back(entry.clone());

            entry
        };

        debug!("journal[{}]: {}", entry.id, entry.text);
        entry
    }

    /// Snapshot of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<EventLogEntry> {
        let inner = self.inner.lock().expect("journal lock poisoned");
        inner.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("journal lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_CAPACITY)
    }
}
