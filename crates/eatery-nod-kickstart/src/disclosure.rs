//! User-facing error context and the reporter that discloses it.
//!
//! # Design
//! - A [`DisclosableError`] carries a sanitized client message, an
//!   append-only "attempting to" trail, and an expected/unexpected flag.
//! - The trail is an owned list that starts empty; wrapping only appends.
//! - Reporters log and publish; they never decide classification.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use eatery_nod_events::{Event, EventBus};
use tracing::{debug, error, warn};

/// Client message used for unexpected errors that carry no sanitized text.
pub const UNEXPECTED_CLIENT_MESSAGE: &str = "Unexpected condition within the application";

/// Separator placed between rendered "attempting to" clauses.
pub const ATTEMPTING_TO_CONNECTIVE: &str = "\n";

const ATTEMPTING_TO_PREFIX: &str = "attempting to: ";

/// Error enriched with the context needed to tell the user what went wrong.
#[derive(Debug)]
pub struct DisclosableError {
    client_message: String,
    attempting_to: Vec<String>,
    unexpected: bool,
    source: Option<anyhow::Error>,
}

impl DisclosableError {
    /// A recognised failure (for example a denied permission) that must not block progress.
    #[must_use]
    pub fn expected(client_message: impl Into<String>) -> Self {
        Self {
            client_message: client_message.into(),
            attempting_to: Vec::new(),
            unexpected: false,
            source: None,
        }
    }

    /// An anomaly with a sanitized user-facing message.
    #[must_use]
    pub fn unexpected(client_message: impl Into<String>) -> Self {
        Self {
            client_message: client_message.into(),
            attempting_to: Vec::new(),
            unexpected: true,
            source: None,
        }
    }

    /// Wrap an arbitrary failure as unexpected, using the generic client message.
    #[must_use]
    pub fn from_source(source: impl Into<anyhow::Error>) -> Self {
        Self {
            client_message: UNEXPECTED_CLIENT_MESSAGE.to_string(),
            attempting_to: Vec::new(),
            unexpected: true,
            source: Some(source.into()),
        }
    }

    /// Attach an underlying cause for logs; the classification is unchanged.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Replace the client message, keeping the trail and classification.
    #[must_use]
    pub fn with_client_message(mut self, client_message: impl Into<String>) -> Self {
        self.client_message = client_message.into();
        self
    }

    /// Append an "attempting to" clause. Earlier clauses are preserved.
    #[must_use]
    pub fn attempting_to(mut self, clause: impl Into<String>) -> Self {
        self.attempting_to.push(clause.into());
        self
    }

    /// Sanitized, user-facing message.
    #[must_use]
    pub fn client_message(&self) -> &str {
        &self.client_message
    }

    /// Raw clauses in the order they were applied.
    #[must_use]
    pub fn clauses(&self) -> &[String] {
        &self.attempting_to
    }

    /// Rendered trail: one `attempting to: X` clause per wrap, joined by
    /// [`ATTEMPTING_TO_CONNECTIVE`]. Empty when the error was never wrapped.
    #[must_use]
    pub fn attempting_to_message(&self) -> String {
        self.attempting_to
            .iter()
            .map(|clause| format!("{ATTEMPTING_TO_PREFIX}{clause}"))
            .collect::<Vec<_>>()
            .join(ATTEMPTING_TO_CONNECTIVE)
    }

    /// Whether the failure should block readiness.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        self.unexpected
    }

    /// Underlying cause, when one was captured.
    #[must_use]
    pub const fn cause(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }
}

impl Display for DisclosableError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.client_message)?;
        if !self.attempting_to.is_empty() {
            formatter.write_str(ATTEMPTING_TO_CONNECTIVE)?;
            formatter.write_str(&self.attempting_to_message())?;
        }
        Ok(())
    }
}

impl Error for DisclosableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| AsRef::<dyn Error + 'static>::as_ref(source))
    }
}

impl From<anyhow::Error> for DisclosableError {
    fn from(source: anyhow::Error) -> Self {
        Self::from_source(source)
    }
}

/// Options accompanying a disclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscloseOptions {
    /// Also write the error to the structured log.
    pub log_it: bool,
}

impl DiscloseOptions {
    /// Disclose and log.
    #[must_use]
    pub const fn logged() -> Self {
        Self { log_it: true }
    }
}

/// Receives enriched errors for user-facing disclosure and logging.
pub trait ErrorReporter: Send + Sync {
    /// Disclose `error` to the user.
    fn disclose(&self, error: &DisclosableError, options: DiscloseOptions);
}

/// Reporter that logs through `tracing` and publishes the disclosure on the event bus.
#[derive(Clone)]
pub struct Discloser {
    events: EventBus,
}

impl Discloser {
    /// Build a discloser publishing to `events`.
    #[must_use]
    pub const fn new(events: EventBus) -> Self {
        Self { events }
    }
}

impl ErrorReporter for Discloser {
    fn disclose(&self, err: &DisclosableError, options: DiscloseOptions) {
        if options.log_it {
            let cause = err.cause().map(|cause| format!("{cause:#}"));
            if err.is_unexpected() {
                error!(
                    client_message = err.client_message(),
                    attempting_to = %err.attempting_to_message(),
                    cause = cause.as_deref(),
                    "unexpected error disclosed"
                );
            } else {
                warn!(
                    client_message = err.client_message(),
                    attempting_to = %err.attempting_to_message(),
                    cause = cause.as_deref(),
                    "expected error disclosed"
                );
            }
        }

        let event = Event::ErrorDisclosed {
            client_message: err.client_message().to_string(),
            attempting_to: err.clauses().to_vec(),
            unexpected: err.is_unexpected(),
        };
        if let Err(publish_err) = self.events.publish(event) {
            debug!(
                event_id = publish_err.event_id(),
                event_kind = publish_err.event_kind(),
                "error disclosure kept for replay only"
            );
        }
    }
}
