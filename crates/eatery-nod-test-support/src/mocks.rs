//! Recording implementations of the sequencer's collaborators.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Result, anyhow};
use eatery_nod_kickstart::{DiscloseOptions, DisclosableError, ErrorReporter, StatusSink};
use tokio::sync::watch;
use tokio::time::timeout;

/// Default bound used when waiting for recorded signals.
pub const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// One signal observed by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkRecord {
    /// `status_changed(message)`.
    Status(String),
    /// `sequence_complete()`.
    Complete,
}

impl SinkRecord {
    /// Shorthand for a status record.
    #[must_use]
    pub fn status(message: &str) -> Self {
        Self::Status(message.to_string())
    }
}

/// Sink that keeps every signal in arrival order.
pub struct RecordingSink {
    records: Mutex<Vec<SinkRecord>>,
    count: watch::Sender<usize>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            records: Mutex::new(Vec::new()),
            count,
        }
    }
}

impl RecordingSink {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<SinkRecord> {
        self.lock().clone()
    }

    /// Number of `sequence_complete` signals observed.
    #[must_use]
    pub fn completions(&self) -> usize {
        self.lock()
            .iter()
            .filter(|record| matches!(record, SinkRecord::Complete))
            .count()
    }

    /// Wait until at least `len` signals were recorded, then return them.
    ///
    /// # Errors
    ///
    /// Returns an error if [`WAIT_LIMIT`] elapses first.
    pub async fn wait_for_len(&self, len: usize) -> Result<Vec<SinkRecord>> {
        let mut receiver = self.count.subscribe();
        timeout(WAIT_LIMIT, receiver.wait_for(|count| *count >= len))
            .await
            .map_err(|_| anyhow!("timed out waiting for {len} sink records"))?
            .map_err(|_| anyhow!("sink dropped while waiting"))?;
        Ok(self.records())
    }

    fn push(&self, record: SinkRecord) {
        let len = {
            let mut records = self.lock();
            records.push(record);
            records.len()
        };
        self.count.send_replace(len);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatusSink for RecordingSink {
    fn status_changed(&self, message: &str) {
        self.push(SinkRecord::status(message));
    }

    fn sequence_complete(&self) {
        self.push(SinkRecord::Complete);
    }
}

/// What a [`RecordingReporter`] saw for one disclosure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    /// Client message at disclosure time.
    pub client_message: String,
    /// Rendered "attempting to" trail.
    pub attempting_to: String,
    /// Raw clauses, in application order.
    pub clauses: Vec<String>,
    /// Classification flag.
    pub unexpected: bool,
    /// Whether logging was requested.
    pub log_it: bool,
}

/// Reporter that keeps every disclosure.
#[derive(Default)]
pub struct RecordingReporter {
    disclosures: Mutex<Vec<Disclosure>>,
}

impl RecordingReporter {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every disclosure so far.
    #[must_use]
    pub fn disclosures(&self) -> Vec<Disclosure> {
        self.disclosures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn disclose(&self, error: &DisclosableError, options: DiscloseOptions) {
        self.disclosures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Disclosure {
                client_message: error.client_message().to_string(),
                attempting_to: error.attempting_to_message(),
                clauses: error.clauses().to_vec(),
                unexpected: error.is_unexpected(),
                log_it: options.log_it,
            });
    }
}
