//! # Design
//!
//! - Centralize application-level errors for bootstrap wiring.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Kick-start failures are not errors here; they travel as disclosures.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: eatery_nod_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: eatery_nod_telemetry::TelemetryError,
    },
    /// Feature registration or sequencing failed.
    #[error("kick-start operation failed")]
    KickStart {
        /// Operation identifier.
        operation: &'static str,
        /// Source sequencer error.
        source: eatery_nod_kickstart::KickStartError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: eatery_nod_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: eatery_nod_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn kickstart(
        operation: &'static str,
        source: eatery_nod_kickstart::KickStartError,
    ) -> Self {
        Self::KickStart { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "config.from_env",
            eatery_nod_config::ConfigError::InvalidField {
                field: "event_capacity",
                reason: "zero",
                value: Some("0".to_string()),
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config.from_env",
                ..
            }
        ));
        assert_eq!(config.to_string(), "configuration operation failed");
        assert!(config.source().is_some());

        let kickstart = AppError::kickstart(
            "registry.register",
            eatery_nod_kickstart::KickStartError::EmptyFeatureName,
        );
        assert!(matches!(kickstart, AppError::KickStart { .. }));
        assert!(kickstart.source().is_some());
    }
}
