// Host-facing surface of the call relay.
//
// A process embedding the relay typically wants exactly one instance wired
// between the telephony glue and the application shell; this module holds
// that instance and exposes free functions over it. Hosts that prefer
// explicit ownership can construct `CallStateRelay` directly and skip this
// module entirely.

use futures::Stream;
use once_cell::sync::Lazy;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::relay::{CallRecord, CallSnapshot, CallStateRelay};
use crate::telemetry::RelayStatsSnapshot;

/// Process-wide relay instance backing the free functions below.
static RELAY: Lazy<CallStateRelay> = Lazy::new(CallStateRelay::new);

/// Version of the relay crate.
pub fn relay_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Forward one call-state change notification from the telephony glue.
pub fn notify_call_changed(call: CallSnapshot) {
    RELAY.on_call_changed(call);
}

/// Register or replace the output sink directly.
///
/// The sender half of an unbounded channel is the sink handle; the
/// consumer drains the receiver on whatever context it requires.
pub fn set_event_sink(sink: Option<mpsc::UnboundedSender<CallRecord>>) {
    tracing::info!("event sink updated (registered={})", sink.is_some());
    RELAY.set_sink(sink);
}

/// Deregister the output sink; subsequent records are dropped silently.
pub fn clear_event_sink() {
    set_event_sink(None);
}

/// Subscribe to emitted records as an async stream.
///
/// Creates a fresh channel, installs its sender as the relay's sink
/// (replacing any previous sink), and returns the receiving stream.
/// Records arrive in the order notifications were processed.
pub fn call_event_stream() -> impl Stream<Item = CallRecord> {
    let (tx, rx) = mpsc::unbounded_channel();
    RELAY.set_sink(Some(tx));
    tracing::info!("call event stream subscribed");
    UnboundedReceiverStream::new(rx)
}

/// One record per currently active call, unordered.
pub fn active_call_info() -> Vec<CallRecord> {
    RELAY.active_call_info()
}

/// Diagnostics counters and recent emitted-record history.
pub fn relay_stats() -> RelayStatsSnapshot {
    RELAY.stats_snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_version() {
        assert_eq!(relay_version(), "0.1.0");
    }
}
