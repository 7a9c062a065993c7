//! Process-wide application span.
//!
//! Every log line emitted while the guard is alive carries the configured
//! mode, the build SHA and the current lifecycle phase.

use tracing::field::{Empty, display};
use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Keeps the `app` span entered until dropped.
pub struct GlobalContextGuard {
    _entered: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the `app` span for `mode`, starting in the `bootstrapping` phase.
    #[must_use]
    pub fn new(mode: &str) -> Self {
        // `Entered<'static>` needs a span that is never dropped.
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "app",
            mode = %mode,
            build_sha = %build_sha(),
            phase = Empty,
        )));
        span.record("phase", "bootstrapping");
        Self {
            _entered: span.enter(),
        }
    }
}

/// Record the lifecycle phase (`ready`, `stalled`, ...) on the current span.
pub fn record_phase(phase: &str) {
    Span::current().record("phase", display(phase));
}
