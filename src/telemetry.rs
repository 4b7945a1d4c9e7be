//! Relay diagnostics: counters plus a bounded history of emitted records.
//!
//! The relay has no failure signals of its own, so the only way to observe
//! silent drops (no sink registered, or a sink whose consumer went away) is
//! through these counters.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::relay::CallRecord;

/// Snapshot of relay diagnostics for pull-based reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayStatsSnapshot {
    /// Notifications processed, regardless of emission outcome.
    pub notifications: u64,
    /// Records successfully handed to the registered sink.
    pub emitted: u64,
    /// Records dropped because no sink was registered.
    pub dropped_no_sink: u64,
    /// Records dropped because the sink's consumer had gone away.
    pub sink_closed: u64,
    /// Most recently emitted records, oldest first.
    pub recent: Vec<CallRecord>,
}

/// Counters retained for the lifetime of one relay instance.
pub struct RelayStats {
    notifications: AtomicU64,
    emitted: AtomicU64,
    dropped_no_sink: AtomicU64,
    sink_closed: AtomicU64,
    recent: Mutex<VecDeque<CallRecord>>,
    history_capacity: usize,
}

impl RelayStats {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            notifications: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
            dropped_no_sink: AtomicU64::new(0),
            sink_closed: AtomicU64::new(0),
            recent: Mutex::new(VecDeque::with_capacity(history_capacity)),
            history_capacity,
        }
    }

    pub fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emitted(&self, record: &CallRecord) {
        self.emitted.fetch_add(1, Ordering::Relaxed);

        let mut recent = self.recent.lock().expect("history poisoned");
        if recent.len() == self.history_capacity {
            recent.pop_front();
        }
        recent.push_back(record.clone());
    }

    pub fn record_dropped_no_sink(&self) {
        self.dropped_no_sink.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_closed(&self) {
        self.sink_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStatsSnapshot {
        let recent = self.recent.lock().expect("history poisoned");
        RelayStatsSnapshot {
            notifications: self.notifications.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            dropped_no_sink: self.dropped_no_sink.load(Ordering::Relaxed),
            sink_closed: self.sink_closed.load(Ordering::Relaxed),
            recent: recent.iter().cloned().collect(),
        }
    }
}

impl Default for RelayStats {
    fn default() -> Self {
        Self::new(64)
    }
}
