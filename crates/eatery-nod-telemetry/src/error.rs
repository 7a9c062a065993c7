//! Telemetry failures.

use prometheus::Error as PrometheusError;
use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while wiring logging or metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global tracing subscriber is already installed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// A collector could not be built or registered.
    #[error("metrics collector setup failed")]
    MetricsCollector {
        /// Metric name.
        name: &'static str,
        /// Setup stage (`build` or `register`).
        stage: &'static str,
        /// Underlying Prometheus error.
        source: PrometheusError,
    },
    /// The registry could not be rendered in text format.
    #[error("failed to render metrics")]
    MetricsRender {
        /// Underlying Prometheus error.
        source: PrometheusError,
    },
}
