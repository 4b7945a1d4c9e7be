use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Instantaneous state of one call as reported by the telephony subsystem.
///
/// The relay observes these flags but never owns the call itself; the host
/// framework decides when and how often a snapshot is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSnapshot {
    pub id: Uuid,
    pub is_outgoing: bool,
    pub has_connected: bool,
    pub has_ended: bool,
    pub is_on_hold: bool,
}

/// Per-call derived timestamps, each set at most once.
///
/// An entry exists only between the first sighting of a call id and the
/// notification that reports it ended; it is purged immediately after the
/// ended record has been built.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CallTimestamps {
    /// Epoch seconds of the first notification with `has_connected` set.
    pub connected_at: Option<f64>,
    /// Epoch seconds of the first notification with `has_ended` set.
    pub ended_at: Option<f64>,
}

/// Flat record delivered through the registered sink for every processed
/// notification, and returned by the active-call query.
///
/// Serializes with camelCase keys; absent timestamps and duration are
/// explicit `null`, never omitted keys. All times are floating-point
/// seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: String,
    pub is_outgoing: bool,
    pub has_connected: bool,
    pub has_ended: bool,
    pub is_on_hold: bool,
    pub connected_timestamp: Option<f64>,
    pub ended_timestamp: Option<f64>,
    pub duration: Option<f64>,
}

impl CallRecord {
    /// Build a record from a snapshot plus whatever derived state is known.
    ///
    /// `duration` is computed by the caller because its presence depends on
    /// which path is emitting: the notification path reports it only for
    /// ended calls, the query path also reports live elapsed time.
    pub fn from_snapshot(
        snapshot: &CallSnapshot,
        timestamps: CallTimestamps,
        duration: Option<f64>,
    ) -> Self {
        Self {
            id: snapshot.id.to_string(),
            is_outgoing: snapshot.is_outgoing,
            has_connected: snapshot.has_connected,
            has_ended: snapshot.has_ended,
            is_on_hold: snapshot.is_on_hold,
            connected_timestamp: timestamps.connected_at,
            ended_timestamp: timestamps.ended_at,
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_camel_case_and_explicit_nulls() {
        let snapshot = CallSnapshot {
            id: Uuid::new_v4(),
            is_outgoing: true,
            has_connected: false,
            has_ended: false,
            is_on_hold: false,
        };
        let record = CallRecord::from_snapshot(&snapshot, CallTimestamps::default(), None);
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"isOutgoing\":true"));
        assert!(json.contains("\"hasConnected\":false"));
        assert!(json.contains("\"hasEnded\":false"));
        assert!(json.contains("\"isOnHold\":false"));
        assert!(json.contains("\"connectedTimestamp\":null"));
        assert!(json.contains("\"endedTimestamp\":null"));
        assert!(json.contains("\"duration\":null"));
    }

    #[test]
    fn record_carries_timestamps_and_duration() {
        let snapshot = CallSnapshot {
            id: Uuid::new_v4(),
            is_outgoing: false,
            has_connected: true,
            has_ended: true,
            is_on_hold: false,
        };
        let timestamps = CallTimestamps {
            connected_at: Some(10.0),
            ended_at: Some(15.0),
        };
        let record = CallRecord::from_snapshot(&snapshot, timestamps, Some(5.0));

        assert_eq!(record.id, snapshot.id.to_string());
        assert_eq!(record.connected_timestamp, Some(10.0));
        assert_eq!(record.ended_timestamp, Some(15.0));
        assert_eq!(record.duration, Some(5.0));
    }
}
