//! Explicit per-call lifecycle phase.
//!
//! The phase is derived solely from the flags on incoming snapshots, which
//! the host framework reports monotonically; the previous phase never
//! overrides them. Absence from the call table is the implicit "unseen"
//! phase. `Ended` is terminal: the table entry is purged once the ended
//! record has been built, so a reused id starts over as unseen.

use serde::{Deserialize, Serialize};

use super::types::CallSnapshot;

/// Lifecycle phase of a tracked call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPhase {
    /// Observed at least once, not yet connected.
    ActiveNotConnected,
    /// Connected and still in progress.
    ActiveConnected,
    /// Reported ended; the entry is removed right after emission.
    Ended,
}

impl CallPhase {
    /// Single transition function for the whole relay.
    pub fn from_flags(snapshot: &CallSnapshot) -> CallPhase {
        if snapshot.has_ended {
            CallPhase::Ended
        } else if snapshot.has_connected {
            CallPhase::ActiveConnected
        } else {
            CallPhase::ActiveNotConnected
        }
    }

    /// Whether this phase keeps the call in the active table.
    pub fn is_active(self) -> bool {
        !matches!(self, CallPhase::Ended)
    }
}
