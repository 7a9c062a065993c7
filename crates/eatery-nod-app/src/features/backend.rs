//! Backend feature: one-time SDK initialisation.
//!
//! The SDK may only be initialised once per process. `BackendLifecycle` owns
//! that state so every feature needing the backend goes through the same
//! `initialize()` entry point.

use std::fmt;
use std::sync::Arc;

use eatery_nod_config::BackendConfig;
use eatery_nod_kickstart::{
    DisclosableError, Feature, KickStartContext, KickStartResult, KickStartTask,
};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::info;

/// Label shown while the backend SDK initialises.
pub const INITIALIZING_BACKEND: &str = "Initializing the backend service";

/// Backend initialisation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// No API key was configured.
    #[error("backend api key missing")]
    MissingApiKey {
        /// Project the SDK was being initialised for.
        project: String,
    },
}

/// Handle on the initialised backend SDK.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendClient {
    project: String,
    api_key: String,
}

impl BackendClient {
    /// Project this client is bound to.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("project", &self.project)
            .field("api_key_len", &self.api_key.len())
            .finish()
    }
}

/// Owner of the process-wide backend initialisation state.
#[derive(Debug)]
pub struct BackendLifecycle {
    config: BackendConfig,
    client: OnceCell<Arc<BackendClient>>,
}

impl BackendLifecycle {
    /// Lifecycle for `config`; nothing is initialised yet.
    #[must_use]
    pub const fn new(config: BackendConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    /// Initialise the SDK, or return the client from an earlier call.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingApiKey`] when no API key is configured.
    /// A failed call leaves the lifecycle uninitialised.
    pub fn initialize(&self) -> Result<Arc<BackendClient>, BackendError> {
        self.client
            .get_or_try_init(|| {
                let api_key = self
                    .config
                    .api_key
                    .clone()
                    .ok_or_else(|| BackendError::MissingApiKey {
                        project: self.config.project.clone(),
                    })?;
                info!(project = %self.config.project, "backend SDK initialised");
                Ok(Arc::new(BackendClient {
                    project: self.config.project.clone(),
                    api_key,
                }))
            })
            .cloned()
    }

    /// Whether `initialize` has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}

/// The backend feature.
///
/// # Errors
///
/// Returns an error if the kick-start label is rejected.
pub fn feature(lifecycle: Arc<BackendLifecycle>) -> KickStartResult<Feature> {
    let task = KickStartTask::new(INITIALIZING_BACKEND, move |context| {
        let lifecycle = Arc::clone(&lifecycle);
        async move { connect(&lifecycle, &context).map(drop) }
    })?;
    Ok(Feature::new("backend").with_kick_start(task))
}

/// Initialise the backend and publish its client to the other features.
pub(crate) fn connect(
    lifecycle: &BackendLifecycle,
    context: &KickStartContext,
) -> Result<Arc<BackendClient>, DisclosableError> {
    let client = lifecycle.initialize().map_err(|err| {
        DisclosableError::from_source(err).attempting_to("connect to the backend")
    })?;
    if !context.services.contains::<BackendClient>() {
        context.services.insert(BackendClient::clone(&client));
    }
    Ok(client)
}
