//! Features contributing kick-start tasks.
//!
//! Registration order (device, backend, auth) fixes the order in which their
//! labels are reported while bootstrapping.

pub mod auth;
pub mod backend;
pub mod device;

use std::sync::Arc;

use eatery_nod_kickstart::{KickStartResult, TaskRegistry};

use self::auth::CredentialStore;
use self::backend::BackendLifecycle;
use self::device::LocationPermission;

/// Collaborators the application features are built from.
#[derive(Clone)]
pub struct FeatureDeps {
    /// Answers the device location permission prompt.
    pub permission: Arc<dyn LocationPermission>,
    /// Backend SDK lifecycle shared by backend and auth.
    pub backend: Arc<BackendLifecycle>,
    /// Storage for persisted sign-in credentials.
    pub credentials: Arc<dyn CredentialStore>,
}

/// Register every application feature, in display order.
///
/// # Errors
///
/// Returns an error when a feature or one of its kick-starts is malformed.
pub fn register_all(registry: &mut TaskRegistry, deps: &FeatureDeps) -> KickStartResult<()> {
    registry.register(device::feature(Arc::clone(&deps.permission))?)?;
    registry.register(backend::feature(Arc::clone(&deps.backend))?)?;
    registry.register(auth::feature(
        Arc::clone(&deps.backend),
        Arc::clone(&deps.credentials),
    )?)?;
    Ok(())
}
