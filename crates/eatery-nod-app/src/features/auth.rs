//! Auth feature: restore the previously signed-in user.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use eatery_nod_kickstart::{
    DisclosableError, Feature, KickStartContext, KickStartResult, KickStartTask,
};
use tracing::info;

use super::backend::{BackendLifecycle, connect};

/// Label shown while the stored session is restored.
pub const RESTORING_SIGNED_IN_USER: &str = "Restoring the signed-in user";
/// Client message when there is no session to restore.
pub const SIGN_IN_REQUIRED: &str = "Please sign in to continue";

/// Persisted sign-in credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Backend user identifier.
    pub user_id: String,
    /// Address the user signed in with.
    pub email: String,
}

/// The user restored at startup, shared with other features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    /// Backend user identifier.
    pub user_id: String,
    /// Address the user signed in with.
    pub email: String,
    /// Backend project the session belongs to.
    pub project: String,
}

/// Storage for persisted credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load stored credentials, if any.
    async fn load(&self) -> anyhow::Result<Option<Credentials>>;
}

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<Option<Credentials>>,
}

impl InMemoryCredentialStore {
    /// Store holding nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: RwLock::new(Some(credentials)),
        }
    }

    /// Replace the stored credentials.
    pub fn store(&self, credentials: Credentials) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
    }

    /// Forget the stored credentials.
    pub fn clear(&self) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> anyhow::Result<Option<Credentials>> {
        Ok(self
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// The auth feature.
///
/// # Errors
///
/// Returns an error if the kick-start label is rejected.
pub fn feature(
    backend: Arc<BackendLifecycle>,
    store: Arc<dyn CredentialStore>,
) -> KickStartResult<Feature> {
    let task = KickStartTask::new(RESTORING_SIGNED_IN_USER, move |context| {
        let backend = Arc::clone(&backend);
        let store = Arc::clone(&store);
        async move { restore(&backend, store.as_ref(), &context).await }
    })?;
    Ok(Feature::new("auth").with_kick_start(task))
}

async fn restore(
    backend: &BackendLifecycle,
    store: &dyn CredentialStore,
    context: &KickStartContext,
) -> Result<(), DisclosableError> {
    let client = connect(backend, context)?;
    let credentials = store.load().await.map_err(|err| {
        DisclosableError::from_source(err).attempting_to("read stored credentials")
    })?;
    let Some(credentials) = credentials else {
        return Err(DisclosableError::expected(SIGN_IN_REQUIRED));
    };

    info!(user_id = %credentials.user_id, "signed-in user restored");
    context.services.insert(SignedInUser {
        user_id: credentials.user_id,
        email: credentials.email,
        project: client.project().to_string(),
    });
    Ok(())
}
