//! Subscriber installation and logging configuration.

use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Level used when neither `RUST_LOG` nor configuration provide one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEV_BUILD_SHA: &str = "dev";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Fallback filter directive (e.g. `info`, `eatery_nod_kickstart=debug`).
    pub level: &'a str,
    /// Output format.
    pub format: LogFormat,
    /// Build identifier attached to the application span.
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: build_sha(),
        }
    }
}

/// Output format for the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty in debug builds, JSON otherwise.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Parse a configured format name; unknown names fall back to [`LogFormat::infer`].
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

/// Install the global tracing subscriber and remember the build SHA.
///
/// `RUST_LOG` takes precedence over `config.level`.
///
/// # Errors
///
/// Returns [`TelemetryError::SubscriberInstall`] when a global subscriber is
/// already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    // First caller wins; later SHAs are ignored.
    let _ = BUILD_SHA.set(config.build_sha.to_string());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level));
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(false).with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Build SHA recorded by [`init_logging`], or `dev` before initialisation.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or(DEV_BUILD_SHA, String::as_str)
}
