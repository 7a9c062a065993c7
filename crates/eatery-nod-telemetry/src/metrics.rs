//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters and gauges the bootstrap sequencer reports.

use std::sync::Arc;

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Settlement classification of a single kick-start task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickStartOutcome {
    /// The task resolved successfully.
    Completed,
    /// The task failed with an expected (handled) error.
    ExpectedFailure,
    /// The task failed with an unexpected error and blocks readiness.
    UnexpectedFailure,
}

impl KickStartOutcome {
    /// Label value recorded on the outcome counter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::ExpectedFailure => "expected_failure",
            Self::UnexpectedFailure => "unexpected_failure",
        }
    }
}

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    kickstart_tasks_total: IntCounterVec,
    events_emitted_total: IntCounterVec,
    kickstart_outstanding: IntGauge,
    bootstrap_runs_total: IntCounter,
    bootstrap_ready_total: IntCounter,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Kick-start tasks still outstanding in the current run.
    pub kickstart_outstanding: i64,
    /// Total bootstrap runs started.
    pub bootstrap_runs_total: u64,
    /// Total bootstrap runs that reached the ready state.
    pub bootstrap_ready_total: u64,
    /// Tasks that resolved successfully.
    pub kickstart_completed_total: u64,
    /// Tasks that failed with an expected error.
    pub kickstart_expected_failures_total: u64,
    /// Tasks that failed with an unexpected error.
    pub kickstart_unexpected_failures_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let kickstart_tasks_total = IntCounterVec::new(
            Opts::new(
                "kickstart_tasks_total",
                "Kick-start tasks settled, by outcome",
            ),
            &["outcome"],
        )
        .map_err(collector_err("kickstart_tasks_total"))?;
        let events_emitted_total = IntCounterVec::new(
            Opts::new("events_emitted_total", "Bootstrap events emitted by type"),
            &["type"],
        )
        .map_err(collector_err("events_emitted_total"))?;
        let kickstart_outstanding = IntGauge::with_opts(Opts::new(
            "kickstart_outstanding",
            "Kick-start tasks not yet complete in the current run",
        ))
        .map_err(collector_err("kickstart_outstanding"))?;
        let bootstrap_runs_total = IntCounter::with_opts(Opts::new(
            "bootstrap_runs_total",
            "Bootstrap sequencing runs started",
        ))
        .map_err(collector_err("bootstrap_runs_total"))?;
        let bootstrap_ready_total = IntCounter::with_opts(Opts::new(
            "bootstrap_ready_total",
            "Bootstrap sequencing runs that reached readiness",
        ))
        .map_err(collector_err("bootstrap_ready_total"))?;

        register(&registry, "kickstart_tasks_total", &kickstart_tasks_total)?;
        register(&registry, "events_emitted_total", &events_emitted_total)?;
        register(&registry, "kickstart_outstanding", &kickstart_outstanding)?;
        register(&registry, "bootstrap_runs_total", &bootstrap_runs_total)?;
        register(&registry, "bootstrap_ready_total", &bootstrap_ready_total)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                kickstart_tasks_total,
                events_emitted_total,
                kickstart_outstanding,
                bootstrap_runs_total,
                bootstrap_ready_total,
            }),
        })
    }

    /// Count a settled kick-start task.
    pub fn inc_kickstart(&self, outcome: KickStartOutcome) {
        self.inner
            .kickstart_tasks_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Increment the emitted event counter for the specific event type.
    pub fn inc_event(&self, event_type: &str) {
        self.inner
            .events_emitted_total
            .with_label_values(&[event_type])
            .inc();
    }

    /// Set the outstanding kick-start gauge.
    pub fn set_outstanding(&self, count: usize) {
        self.inner
            .kickstart_outstanding
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Count a started bootstrap run.
    pub fn inc_bootstrap_run(&self) {
        self.inner.bootstrap_runs_total.inc();
    }

    /// Count a bootstrap run that reached readiness.
    pub fn inc_bootstrap_ready(&self) {
        self.inner.bootstrap_ready_total.inc();
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the gathered families cannot be encoded.
    pub fn render(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.inner.registry.gather())
            .map_err(|source| TelemetryError::MetricsRender { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let outcome = |kind: KickStartOutcome| {
            self.inner
                .kickstart_tasks_total
                .with_label_values(&[kind.as_str()])
                .get()
        };
        MetricsSnapshot {
            kickstart_outstanding: self.inner.kickstart_outstanding.get(),
            bootstrap_runs_total: self.inner.bootstrap_runs_total.get(),
            bootstrap_ready_total: self.inner.bootstrap_ready_total.get(),
            kickstart_completed_total: outcome(KickStartOutcome::Completed),
            kickstart_expected_failures_total: outcome(KickStartOutcome::ExpectedFailure),
            kickstart_unexpected_failures_total: outcome(KickStartOutcome::UnexpectedFailure),
        }
    }
}

fn collector_err(name: &'static str) -> impl FnOnce(prometheus::Error) -> TelemetryError {
    move |source| TelemetryError::MetricsCollector {
        name,
        stage: "build",
        source,
    }
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsCollector {
            name,
            stage: "register",
            source,
        })
}
