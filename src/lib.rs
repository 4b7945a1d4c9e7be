// Call Relay Core
// Translates telephony call-state notifications into ordered sink emissions

// Module declarations
pub mod api;
pub mod config;
pub mod error;
pub mod relay;
pub mod telemetry;

// Re-exports for convenience
pub use relay::{CallObserver, CallPhase, CallRecord, CallSnapshot, CallStateRelay, EpochClock};

use std::sync::Once;

static LOG_INIT: Once = Once::new();

/// Initialize logging output for hosts, tests, and the CLI harness.
///
/// Installs a tracing-subscriber fmt layer (which also captures `log`
/// records). Safe to call more than once.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_target(false).try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
