//! # Design
//!
//! - Configuration errors surface synchronously at registration time.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Task failures never appear here; they travel as [`crate::DisclosableError`].

use thiserror::Error;
use tokio::task::JoinError;
use uuid::Uuid;

/// Result alias for kick-start configuration operations.
pub type KickStartResult<T> = Result<T, KickStartError>;

/// Errors raised while assembling or driving a bootstrap run.
#[derive(Debug, Error)]
pub enum KickStartError {
    /// A kick-start task was registered without a label.
    #[error("kick-start label must not be empty")]
    EmptyLabel,
    /// A feature was registered without a name.
    #[error("feature name must not be empty")]
    EmptyFeatureName,
    /// Two features were registered under the same name.
    #[error("feature already registered")]
    DuplicateFeature {
        /// Name shared by both registrations.
        name: String,
    },
    /// A run with tasks was started outside of a Tokio runtime.
    #[error("no async runtime available to launch kick-start tasks")]
    RuntimeUnavailable,
    /// The run driver terminated abnormally.
    #[error("sequencer driver failed")]
    DriverJoin {
        /// Run whose driver failed.
        run_id: Uuid,
        /// Join failure reported by the runtime.
        source: JoinError,
    },
    /// The status projection was dropped while a watcher was waiting.
    #[error("status projection closed")]
    StatusClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_constant() {
        assert_eq!(
            KickStartError::EmptyLabel.to_string(),
            "kick-start label must not be empty"
        );
        assert_eq!(
            KickStartError::DuplicateFeature {
                name: "device".into()
            }
            .to_string(),
            "feature already registered"
        );
        assert_eq!(
            KickStartError::StatusClosed.to_string(),
            "status projection closed"
        );
    }
}
