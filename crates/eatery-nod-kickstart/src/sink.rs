//! Status sinks receiving the sequencer's two event kinds.

use std::sync::Arc;

use eatery_nod_events::{Event, EventBus, EventBusError};
use tracing::debug;

/// Destination for status-change and completion signals.
pub trait StatusSink: Send + Sync {
    /// The human-readable bootstrap status changed.
    fn status_changed(&self, message: &str);

    /// Every kick-start task settled; emitted once per run.
    fn sequence_complete(&self);
}

impl StatusSink for EventBus {
    fn status_changed(&self, message: &str) {
        log_unheard(self.publish(Event::status(message)));
    }

    fn sequence_complete(&self) {
        log_unheard(self.publish(Event::SequenceComplete));
    }
}

fn log_unheard(result: Result<u64, EventBusError>) {
    if let Err(err) = result {
        debug!(
            event_id = err.event_id(),
            event_kind = err.event_kind(),
            "status event kept for replay only"
        );
    }
}

/// Forwards every signal to several sinks, in registration order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn StatusSink>>,
}

impl FanoutSink {
    /// Create a fan-out with no targets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl StatusSink for FanoutSink {
    fn status_changed(&self, message: &str) {
        for sink in &self.sinks {
            sink.status_changed(message);
        }
    }

    fn sequence_complete(&self) {
        for sink in &self.sinks {
            sink.sequence_complete();
        }
    }
}
