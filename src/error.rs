// Error types for the call relay crate
//
// The relay operations themselves are total: a missing sink is a silent
// drop and a missing timestamp is "not yet known". Structured errors exist
// for the fallible edges (config loading, lock poisoning observed at an
// API boundary) and for uniform diagnostic logging.

use std::fmt;

use log::error;

/// Error codes for structured error reporting.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Relay error code constants.
///
/// Error code range: 2001-2004
pub struct RelayErrorCodes {}

impl RelayErrorCodes {
    /// Mutex on shared relay state was poisoned
    pub const LOCK_POISONED: i32 = 2001;

    /// Config file could not be read
    pub const CONFIG_READ_FAILED: i32 = 2002;

    /// Config file contents failed to parse
    pub const CONFIG_INVALID: i32 = 2003;

    /// Sink channel's consumer has gone away
    pub const SINK_CLOSED: i32 = 2004;
}

/// Log a relay error with structured context.
///
/// Non-blocking; never panics on failure.
pub fn log_relay_error(err: &RelayError, context: &str) {
    error!(
        "Relay error in {}: code={}, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Relay-related errors
#[derive(Debug, Clone, PartialEq)]
pub enum RelayError {
    /// Mutex on shared relay state was poisoned
    LockPoisoned { component: String },

    /// Config file could not be read
    ConfigReadFailed { path: String, reason: String },

    /// Config file contents failed to parse
    ConfigInvalid { reason: String },

    /// Sink channel's consumer has gone away
    SinkClosed,
}

impl ErrorCode for RelayError {
    fn code(&self) -> i32 {
        match self {
            RelayError::LockPoisoned { .. } => RelayErrorCodes::LOCK_POISONED,
            RelayError::ConfigReadFailed { .. } => RelayErrorCodes::CONFIG_READ_FAILED,
            RelayError::ConfigInvalid { .. } => RelayErrorCodes::CONFIG_INVALID,
            RelayError::SinkClosed => RelayErrorCodes::SINK_CLOSED,
        }
    }

    fn message(&self) -> String {
        match self {
            RelayError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
            RelayError::ConfigReadFailed { path, reason } => {
                format!("Failed to read config file {}: {}", path, reason)
            }
            RelayError::ConfigInvalid { reason } => {
                format!("Invalid config: {}", reason)
            }
            RelayError::SinkClosed => {
                "Sink channel closed by consumer; record dropped".to_string()
            }
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelayError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for RelayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_codes() {
        assert_eq!(
            RelayError::LockPoisoned {
                component: "calls".to_string()
            }
            .code(),
            RelayErrorCodes::LOCK_POISONED
        );
        assert_eq!(
            RelayError::ConfigReadFailed {
                path: "relay.json".to_string(),
                reason: "missing".to_string()
            }
            .code(),
            RelayErrorCodes::CONFIG_READ_FAILED
        );
        assert_eq!(
            RelayError::ConfigInvalid {
                reason: "bad json".to_string()
            }
            .code(),
            RelayErrorCodes::CONFIG_INVALID
        );
        assert_eq!(RelayError::SinkClosed.code(), RelayErrorCodes::SINK_CLOSED);
    }

    #[test]
    fn test_relay_error_messages() {
        let err = RelayError::LockPoisoned {
            component: "call_table".to_string(),
        };
        assert_eq!(err.message(), "Lock poisoned on call_table");

        let err = RelayError::ConfigInvalid {
            reason: "expected object".to_string(),
        };
        assert!(err.message().contains("expected object"));

        let err = RelayError::SinkClosed;
        assert!(err.message().contains("closed"));
    }

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::SinkClosed;
        let display = format!("{}", err);
        assert!(display.contains("RelayError"));
        assert!(display.contains(&err.code().to_string()));
    }
}
