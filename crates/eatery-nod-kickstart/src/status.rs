//! Bootstrap status projection.
//!
//! Folds the sequencer's signals into the `{status, ready}` view a splash
//! screen renders, and lets tasks or the binary observe it through a
//! `tokio::sync::watch` channel.

use eatery_nod_events::{Event, READY_STATUS};
use tokio::sync::watch;

use crate::error::{KickStartError, KickStartResult};
use crate::sink::StatusSink;

/// Current bootstrap view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootStatus {
    /// Label of the earliest unfinished task, or `READY`.
    pub status: String,
    /// Whether the terminal ready signal has been observed.
    pub ready: bool,
}

impl BootStatus {
    /// Apply a bus event to the view. Events unrelated to status are ignored.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::StatusChanged { message } => self.status.clone_from(message),
            Event::SequenceComplete => self.ready = true,
            Event::ErrorDisclosed { .. } => {}
        }
    }

    /// Whether the status text reads as ready, independent of the terminal flag.
    #[must_use]
    pub fn shows_ready(&self) -> bool {
        self.status == READY_STATUS
    }
}

/// Sink that keeps the latest [`BootStatus`] in a watch channel.
pub struct StatusProjection {
    sender: watch::Sender<BootStatus>,
}

impl StatusProjection {
    /// Create a projection and its first watcher.
    #[must_use]
    pub fn new() -> (Self, StatusWatcher) {
        let (sender, receiver) = watch::channel(BootStatus::default());
        (Self { sender }, StatusWatcher { receiver })
    }

    /// Another watcher on the same projection.
    #[must_use]
    pub fn watcher(&self) -> StatusWatcher {
        StatusWatcher {
            receiver: self.sender.subscribe(),
        }
    }

    /// Fold an arbitrary bus event into the projection.
    pub fn apply(&self, event: &Event) {
        self.sender.send_modify(|status| status.apply(event));
    }
}

impl StatusSink for StatusProjection {
    fn status_changed(&self, message: &str) {
        tracing::trace!(status = message, "status projected");
        self.apply(&Event::status(message));
    }

    fn sequence_complete(&self) {
        self.apply(&Event::SequenceComplete);
    }
}

/// Read-only handle on the bootstrap status.
#[derive(Clone)]
pub struct StatusWatcher {
    receiver: watch::Receiver<BootStatus>,
}

impl StatusWatcher {
    /// Snapshot of the current status.
    #[must_use]
    pub fn current(&self) -> BootStatus {
        self.receiver.borrow().clone()
    }

    /// Wait until the next status change and return it.
    ///
    /// # Errors
    ///
    /// Returns [`KickStartError::StatusClosed`] when the projection was dropped.
    pub async fn changed(&mut self) -> KickStartResult<BootStatus> {
        self.receiver
            .changed()
            .await
            .map_err(|_| KickStartError::StatusClosed)?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the terminal ready signal has been folded in.
    ///
    /// # Errors
    ///
    /// Returns [`KickStartError::StatusClosed`] when the projection was dropped
    /// before readiness.
    pub async fn wait_ready(&mut self) -> KickStartResult<BootStatus> {
        let status = self
            .receiver
            .wait_for(|status| status.ready)
            .await
            .map_err(|_| KickStartError::StatusClosed)?;
        Ok(status.clone())
    }
}
