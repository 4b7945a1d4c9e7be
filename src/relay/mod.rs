//! Call state relay core.
//!
//! Receives call-state change notifications from the host telephony glue,
//! maintains a per-call table of snapshots and derived timestamps, and
//! forwards one flat [`CallRecord`] per notification through the registered
//! sink. Emission uses a single-consumer ordered channel, so records reach
//! the consumer in processing order without ever blocking the notifying
//! thread.

mod state;
mod types;

pub use state::CallPhase;
pub use types::{CallRecord, CallSnapshot, CallTimestamps};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, trace};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::error::{log_relay_error, RelayError};
use crate::telemetry::{RelayStats, RelayStatsSnapshot};

/// Clock returning floating-point seconds since the Unix epoch.
///
/// Injectable so hosts and tests can control time; production relays use
/// the system clock.
pub type EpochClock = Arc<dyn Fn() -> f64 + Send + Sync>;

fn system_epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Observer contract driven by the host telephony glue.
///
/// A single method suffices; whatever registers with the telephony
/// subsystem holds the relay (or any other implementor) behind this trait
/// and forwards each change notification.
pub trait CallObserver: Send + Sync {
    fn on_call_changed(&self, call: CallSnapshot);
}

/// One entry in the call table: latest snapshot plus derived state.
struct TrackedCall {
    snapshot: CallSnapshot,
    phase: CallPhase,
    timestamps: CallTimestamps,
}

/// Relay instance owning the sink slot and the per-call table.
///
/// All owned state is scoped to this instance; construct one and pass it
/// to whatever registers it with the telephony subsystem. The call table
/// sits behind a mutex so [`active_call_info`](Self::active_call_info) may
/// be called from any thread, not just the notification-delivery context.
pub struct CallStateRelay {
    sink: Mutex<Option<mpsc::UnboundedSender<CallRecord>>>,
    calls: Mutex<HashMap<Uuid, TrackedCall>>,
    clock: EpochClock,
    stats: RelayStats,
    trace_notifications: bool,
}

impl CallStateRelay {
    /// Create a relay on the system clock with default config.
    pub fn new() -> Self {
        Self::with_config(&RelayConfig::default())
    }

    /// Create a relay with explicit diagnostics configuration.
    pub fn with_config(config: &RelayConfig) -> Self {
        Self::build(config, Arc::new(system_epoch_seconds))
    }

    /// Create a relay with an injected epoch clock.
    pub fn with_clock(clock: EpochClock) -> Self {
        Self::build(&RelayConfig::default(), clock)
    }

    /// Create a relay with explicit config and an injected clock.
    pub fn with_config_and_clock(config: &RelayConfig, clock: EpochClock) -> Self {
        Self::build(config, clock)
    }

    fn build(config: &RelayConfig, clock: EpochClock) -> Self {
        Self {
            sink: Mutex::new(None),
            calls: Mutex::new(HashMap::new()),
            clock,
            stats: RelayStats::new(config.history_capacity),
            trace_notifications: config.trace_notifications,
        }
    }

    /// Register, replace, or clear the output sink.
    ///
    /// Replacement is atomic with respect to subsequent emissions. No
    /// validation and no error conditions; an absent sink means records
    /// are dropped silently (and counted by diagnostics).
    pub fn set_sink(&self, sink: Option<mpsc::UnboundedSender<CallRecord>>) {
        match self.sink.lock() {
            Ok(mut guard) => {
                let registered = sink.is_some();
                *guard = sink;
                debug!(
                    "event sink {}",
                    if registered { "registered" } else { "cleared" }
                );
            }
            Err(_) => {
                log_relay_error(
                    &RelayError::LockPoisoned {
                        component: "sink".to_string(),
                    },
                    "set_sink",
                );
            }
        }
    }

    /// Process one call-state change notification.
    ///
    /// Records `connected_at` / `ended_at` at most once each, keeps the
    /// active-call table current, builds a [`CallRecord`] and emits it to
    /// the sink in processing order. For ended calls the table entry is
    /// purged after the record has been built; any later notification for
    /// the same id is treated as a fresh, unseen call. Total operation:
    /// nothing here signals failure to the caller.
    pub fn on_call_changed(&self, call: CallSnapshot) {
        let now = (self.clock)();
        self.stats.record_notification();

        if self.trace_notifications {
            trace!(
                "call {} changed: outgoing={} connected={} ended={} on_hold={}",
                call.id,
                call.is_outgoing,
                call.has_connected,
                call.has_ended,
                call.is_on_hold
            );
        }

        let mut calls = match self.calls.lock() {
            Ok(guard) => guard,
            Err(_) => {
                log_relay_error(
                    &RelayError::LockPoisoned {
                        component: "call_table".to_string(),
                    },
                    "on_call_changed",
                );
                return;
            }
        };

        let phase = CallPhase::from_flags(&call);

        let entry = calls.entry(call.id).or_insert_with(|| TrackedCall {
            snapshot: call,
            phase,
            timestamps: CallTimestamps::default(),
        });
        entry.snapshot = call;
        entry.phase = phase;

        // The connected flag stays set on the ended notification, so a
        // call that connects and ends in one report gets both timestamps.
        if call.has_connected && entry.timestamps.connected_at.is_none() {
            entry.timestamps.connected_at = Some(now);
            debug!("call {} connected at {:.3}", call.id, now);
        }
        if phase == CallPhase::Ended && entry.timestamps.ended_at.is_none() {
            entry.timestamps.ended_at = Some(now);
            debug!("call {} ended at {:.3}", call.id, now);
        }

        let timestamps = entry.timestamps;

        // Duration is reported only on the ended notification; live calls
        // get theirs from the query path instead.
        let duration = match (timestamps.connected_at, timestamps.ended_at) {
            (Some(connected), Some(ended)) if phase == CallPhase::Ended => {
                Some(ended - connected)
            }
            _ => None,
        };

        let record = CallRecord::from_snapshot(&call, timestamps, duration);

        // The record must be built before the purge; Ended is terminal.
        if !phase.is_active() {
            calls.remove(&call.id);
        }

        // Emit while still holding the table lock so records reach the
        // sink in the order notifications were processed.
        self.emit(record);
    }

    /// One record per currently active call, unordered.
    ///
    /// Calls with a known connect time report their live elapsed duration;
    /// calls not yet connected report no duration. Ended calls never
    /// appear here, their entries are purged on the ended notification.
    pub fn active_call_info(&self) -> Vec<CallRecord> {
        let now = (self.clock)();
        let calls = match self.calls.lock() {
            Ok(guard) => guard,
            Err(_) => {
                log_relay_error(
                    &RelayError::LockPoisoned {
                        component: "call_table".to_string(),
                    },
                    "active_call_info",
                );
                return Vec::new();
            }
        };

        calls
            .values()
            .map(|entry| {
                let duration = match (entry.timestamps.connected_at, entry.timestamps.ended_at) {
                    // Parity with the notification path; unreachable in
                    // practice because ended entries are purged.
                    (Some(connected), Some(ended)) if entry.phase == CallPhase::Ended => {
                        Some(ended - connected)
                    }
                    (Some(connected), _) => Some(now - connected),
                    _ => None,
                };
                CallRecord::from_snapshot(&entry.snapshot, entry.timestamps, duration)
            })
            .collect()
    }

    /// Current diagnostics counters and emitted-record history.
    pub fn stats_snapshot(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }

    fn emit(&self, record: CallRecord) {
        let guard = match self.sink.lock() {
            Ok(guard) => guard,
            Err(_) => {
                log_relay_error(
                    &RelayError::LockPoisoned {
                        component: "sink".to_string(),
                    },
                    "emit",
                );
                return;
            }
        };

        match guard.as_ref() {
            Some(sink) => {
                if sink.send(record.clone()).is_err() {
                    // Consumer side of the channel is gone.
                    log_relay_error(&RelayError::SinkClosed, "emit");
                    self.stats.record_sink_closed();
                } else {
                    trace!("emitted record for call {}", record.id);
                    self.stats.record_emitted(&record);
                }
            }
            None => {
                debug!("no sink registered; record for call {} dropped", record.id);
                self.stats.record_dropped_no_sink();
            }
        }
    }
}

impl Default for CallStateRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl CallObserver for CallStateRelay {
    fn on_call_changed(&self, call: CallSnapshot) {
        CallStateRelay::on_call_changed(self, call);
    }
}
