//! Runtime configuration for the relay's diagnostics surface.
//!
//! The relay core needs no tuning; config only controls how chatty the
//! diagnostics are and how much emitted history is retained. Loading from
//! a JSON file lets hosts and the CLI harness adjust this without
//! recompilation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::RelayError;

/// Relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Number of recently emitted records retained for diagnostics
    pub history_capacity: usize,
    /// Emit a trace log line for every processed notification
    pub trace_notifications: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            history_capacity: 64,
            trace_notifications: false,
        }
    }
}

impl RelayConfig {
    /// Load configuration from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RelayError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| RelayError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| RelayError::ConfigInvalid {
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = RelayConfig::default();
        assert_eq!(config.history_capacity, 64);
        assert!(!config.trace_notifications);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: RelayConfig = serde_json::from_str("{\"trace_notifications\": true}").unwrap();
        assert!(config.trace_notifications);
        assert_eq!(config.history_capacity, 64);
    }

    #[test]
    fn load_from_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("relay-config-{}.json", std::process::id()));
        let config = RelayConfig {
            history_capacity: 8,
            trace_notifications: true,
        };
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = RelayConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.history_capacity, 8);
        assert!(loaded.trace_notifications);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_from_missing_file_reports_read_error() {
        let err = RelayConfig::load_from_file("/nonexistent/relay.json").unwrap_err();
        assert!(matches!(err, RelayError::ConfigReadFailed { .. }));
    }

    #[test]
    fn load_from_malformed_file_reports_parse_error() {
        let path = std::env::temp_dir().join(format!("relay-bad-{}.json", std::process::id()));
        fs::write(&path, "not json").unwrap();

        let err = RelayConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, RelayError::ConfigInvalid { .. }));

        let _ = fs::remove_file(&path);
    }
}
