#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across the eatery-nod workspace.
//!
//! This crate centralises logging and metrics so the sequencer, the features
//! and the binary adopt a consistent observability story.
//!
//! Layout: `init.rs` (subscriber install), `context.rs` (span guards),
//! `metrics.rs` (Prometheus registry), `error.rs` (telemetry errors).

pub mod context;
pub mod error;
pub mod init;
pub mod metrics;

pub use context::{GlobalContextGuard, record_phase};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use metrics::{KickStartOutcome, Metrics, MetricsSnapshot};
