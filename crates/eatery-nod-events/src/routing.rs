//! Broadcast bus with a bounded replay journal.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::error::{EventBusError, EventBusResult};
use crate::payloads::{DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId};

/// Live subscription to the bus.
pub type EventStream = BroadcastStream<EventEnvelope>;

/// Cloneable handle on a shared event bus.
///
/// Ids are assigned and journaled under one lock, so the journal is always
/// in id order and live subscribers see the same order.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    journal: Arc<Mutex<Journal>>,
}

struct Journal {
    last_id: EventId,
    capacity: usize,
    ring: VecDeque<EventEnvelope>,
}

impl Journal {
    fn record(&mut self, event: Event) -> EventEnvelope {
        self.last_id = self.last_id.saturating_add(1);
        let envelope = EventEnvelope {
            id: self.last_id,
            timestamp: Utc::now(),
            event,
        };
        if self.ring.len() == self.capacity {
            self.ring.pop_front();
        }
        self.ring.push_back(envelope.clone());
        envelope
    }
}

impl EventBus {
    /// Bus keeping the last `capacity` events; zero is treated as one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            journal: Arc::new(Mutex::new(Journal {
                last_id: 0,
                capacity,
                ring: VecDeque::with_capacity(capacity),
            })),
        }
    }

    /// Bus with [`DEFAULT_REPLAY_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> EventStream {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Journal `event` and deliver it to live subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::NoSubscribers`] when nobody is subscribed.
    /// The event is journaled and its id consumed regardless.
    #[allow(clippy::significant_drop_tightening)]
    pub fn publish(&self, event: Event) -> EventBusResult<EventId> {
        let event_kind = event.kind();
        let (event_id, delivered) = {
            let mut journal = self.journal();
            let envelope = journal.record(event);
            let event_id = envelope.id;
            // Sent under the journal lock to keep delivery in id order.
            (event_id, self.sender.send(envelope).is_ok())
        };
        if delivered {
            Ok(event_id)
        } else {
            Err(EventBusError::NoSubscribers {
                event_id,
                event_kind,
            })
        }
    }

    /// Id of the most recently published event.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        let journal = self.journal();
        (journal.last_id > 0).then_some(journal.last_id)
    }

    /// Journaled events with an id greater than `after`; `None` returns all of them.
    #[must_use]
    pub fn backlog_since(&self, after: Option<EventId>) -> Vec<EventEnvelope> {
        let after = after.unwrap_or_default();
        self.journal()
            .ring
            .iter()
            .filter(|envelope| envelope.id > after)
            .cloned()
            .collect()
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
