use std::future::Future;
use std::sync::Arc;

use eatery_nod_config::AppConfig;
use eatery_nod_events::{Event, EventBus};
use eatery_nod_kickstart::{
    BootstrapSequencer, Discloser, FanoutSink, KickStartContext, RunOutcome, ServiceRegistry,
    StatusProjection, TaskRegistry,
};
use eatery_nod_telemetry::{
    DEFAULT_LOG_LEVEL, GlobalContextGuard, LogFormat, LoggingConfig, Metrics, build_sha,
    record_phase,
};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::features::auth::{CredentialStore, InMemoryCredentialStore};
use crate::features::backend::BackendLifecycle;
use crate::features::device::{ConfiguredPermission, LocationPermission};
use crate::features::{self, FeatureDeps};

/// How the bootstrap sequence ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// Every kick-start completed and the application is ready.
    Ready,
    /// Unexpected failures left kick-starts incomplete.
    Stalled {
        /// Labels of the incomplete kick-starts, in display order.
        pending: Vec<String>,
    },
    /// Shutdown was requested before the sequence finished.
    Interrupted,
}

/// Dependencies required to bootstrap the application.
pub struct BootstrapDependencies {
    config: AppConfig,
    events: EventBus,
    metrics: Metrics,
    features: FeatureDeps,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds invalid configuration or
    /// metrics cannot be registered.
    pub fn from_env() -> AppResult<Self> {
        let config =
            AppConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        Self::from_config(config)
    }

    /// Construct dependencies from an already loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if metrics cannot be registered.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let metrics =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        let events = EventBus::with_capacity(config.event_capacity);
        let features = FeatureDeps {
            permission: Arc::new(ConfiguredPermission::new(config.location_permission)),
            backend: Arc::new(BackendLifecycle::new(config.backend.clone())),
            credentials: Arc::new(InMemoryCredentialStore::new()),
        };
        Ok(Self {
            config,
            events,
            metrics,
            features,
        })
    }

    /// Replace the credential store.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.features.credentials = credentials;
        self
    }

    /// Replace the location permission prompt.
    #[must_use]
    pub fn with_permission(mut self, permission: Arc<dyn LocationPermission>) -> Self {
        self.features.permission = permission;
        self
    }

    /// Event bus the run publishes to.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Metrics registry the run records into.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Entry point for the eatery-nod boot sequence.
///
/// Returns once the application is ready, the sequence stalled, or Ctrl-C was
/// received.
///
/// # Errors
///
/// Returns an error if configuration, logging or feature registration fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    let format = dependencies
        .config
        .log_format
        .as_deref()
        .map_or_else(LogFormat::infer, LogFormat::from_name);
    eatery_nod_telemetry::init_logging(&LoggingConfig {
        level: dependencies
            .config
            .log_level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL),
        format,
        build_sha: build_sha(),
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new(&dependencies.config.mode);

    match run_app_with(dependencies, shutdown_signal()).await? {
        BootOutcome::Ready => record_phase("ready"),
        BootOutcome::Stalled { .. } => record_phase("stalled"),
        BootOutcome::Interrupted => info!("bootstrap interrupted"),
    }
    Ok(())
}

/// Boot sequence that relies entirely on injected dependencies to simplify testing.
///
/// # Errors
///
/// Returns an error if feature registration fails or the sequencer cannot run.
pub async fn run_app_with<F>(
    dependencies: BootstrapDependencies,
    shutdown: F,
) -> AppResult<BootOutcome>
where
    F: Future<Output = ()>,
{
    let BootstrapDependencies {
        config,
        events,
        metrics,
        features,
    } = dependencies;
    info!(
        mode = %config.mode,
        project = %config.backend.project,
        "eatery-nod bootstrap starting"
    );

    let mut registry = TaskRegistry::new();
    features::register_all(&mut registry, &features)
        .map_err(|err| AppError::kickstart("registry.register", err))?;

    let (projection, watcher) = StatusProjection::new();
    let sink = FanoutSink::new()
        .with(Arc::new(events.clone()))
        .with(Arc::new(projection));
    let reporter = Arc::new(Discloser::new(events.clone()));
    let context = KickStartContext::new(events.clone(), watcher, ServiceRegistry::new());
    let status_log = spawn_status_logger(&events);

    let sequencer = BootstrapSequencer::new(Arc::new(sink), reporter, metrics.clone());
    let handle = sequencer
        .run(&registry.kick_starts(), &context)
        .map_err(|err| AppError::kickstart("sequencer.run", err))?;

    let outcome = tokio::select! {
        outcome = handle.wait() => {
            match outcome.map_err(|err| AppError::kickstart("sequencer.wait", err))? {
                RunOutcome::Ready => {
                    info!(snapshot = ?metrics.snapshot(), "application ready");
                    BootOutcome::Ready
                }
                RunOutcome::Stalled { pending } => {
                    error!(pending = ?pending, "application cannot become ready");
                    BootOutcome::Stalled { pending }
                }
            }
        }
        () = shutdown => {
            warn!(
                status = %context.status.current().status,
                "shutdown requested during bootstrap"
            );
            BootOutcome::Interrupted
        }
    };

    status_log.abort();
    Ok(outcome)
}

fn spawn_status_logger(events: &EventBus) -> JoinHandle<()> {
    let mut stream = events.subscribe();
    tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            match item {
                Ok(envelope) => match envelope.event {
                    Event::StatusChanged { message } => {
                        info!(status = %message, "bootstrap status");
                    }
                    Event::SequenceComplete => break,
                    Event::ErrorDisclosed { .. } => {}
                },
                Err(err) => warn!(error = %err, "bootstrap status log lagged"),
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
