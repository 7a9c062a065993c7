//! Event payload types carried across the application.

use chrono::{DateTime, Utc};

/// Identifier assigned to each event emitted by the application.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Status text published once every kick-start task has settled.
pub const READY_STATUS: &str = "READY";

/// Typed events surfaced during application bootstrap.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The human-readable bootstrap status changed.
    StatusChanged {
        /// Label of the earliest unfinished task, or [`READY_STATUS`].
        message: String,
    },
    /// Every kick-start task settled; the application may proceed.
    SequenceComplete,
    /// An error was disclosed to the user.
    ErrorDisclosed {
        /// Sanitized, user-facing message.
        client_message: String,
        /// Accumulated "attempting to" trail.
        attempting_to: Vec<String>,
        /// Whether the failure was classified as unexpected.
        unexpected: bool,
    },
}

impl Event {
    /// Machine-friendly discriminator for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StatusChanged { .. } => "status_changed",
            Self::SequenceComplete => "sequence_complete",
            Self::ErrorDisclosed { .. } => "error_disclosed",
        }
    }

    /// Convenience constructor for status events.
    #[must_use]
    pub fn status(message: impl Into<String>) -> Self {
        Self::StatusChanged {
            message: message.into(),
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Monotonic identifier assigned to the wrapped event.
    pub id: EventId,
    /// Timestamp recording when the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event payload.
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_maps_variants() {
        assert_event_kind(&Event::status("Loading"), "status_changed");
        assert_event_kind(&Event::SequenceComplete, "sequence_complete");
        assert_event_kind(
            &Event::ErrorDisclosed {
                client_message: "oops".into(),
                attempting_to: vec!["sign in".into()],
                unexpected: false,
            },
            "error_disclosed",
        );
    }

    #[test]
    fn events_serialize_with_type_tag() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(Event::status(READY_STATUS))?;
        assert_eq!(value["type"], "status_changed");
        assert_eq!(value["message"], "READY");

        let value = serde_json::to_value(Event::SequenceComplete)?;
        assert_eq!(value["type"], "sequence_complete");
        Ok(())
    }

    #[test]
    fn envelope_carries_fields() {
        let event = Event::status("Waiting for location permission");
        let envelope = EventEnvelope {
            id: 42,
            timestamp: Utc::now(),
            event: event.clone(),
        };
        assert_eq!(envelope.id, 42);
        assert_eq!(envelope.event, event);
    }

    fn assert_event_kind(event: &Event, expected: &str) {
        assert_eq!(event.kind(), expected);
    }
}
