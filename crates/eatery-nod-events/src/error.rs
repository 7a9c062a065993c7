//! Publish failures.

use thiserror::Error;

use crate::payloads::EventId;

/// Result wrapper for event bus operations.
pub type EventBusResult<T> = Result<T, EventBusError>;

/// Error returned by [`crate::EventBus::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventBusError {
    /// Nobody was listening; the event only reached the replay ring.
    #[error("event bus has no live subscribers")]
    NoSubscribers {
        /// Identifier the event was assigned.
        event_id: EventId,
        /// Kind of the undelivered event.
        event_kind: &'static str,
    },
}

impl EventBusError {
    /// Identifier of the undelivered event.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        let Self::NoSubscribers { event_id, .. } = self;
        *event_id
    }

    /// Kind of the undelivered event, for log fields.
    #[must_use]
    pub const fn event_kind(&self) -> &'static str {
        let Self::NoSubscribers { event_kind, .. } = self;
        event_kind
    }
}
