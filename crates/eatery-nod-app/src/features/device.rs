//! Device feature: local resources and the location permission prompt.

use std::sync::Arc;

use async_trait::async_trait;
use eatery_nod_config::LocationPermissionSetting;
use eatery_nod_kickstart::{
    DisclosableError, Feature, KickStartContext, KickStartResult, KickStartTask,
};
use tracing::{debug, info};

/// Label shown while device resources load.
pub const LOADING_DEVICE_RESOURCES: &str = "Loading device resources";
/// Label shown while the location permission prompt is open.
pub const WAITING_FOR_LOCATION_PERMISSION: &str = "Waiting for location permission";
/// Client message when location access is refused.
pub const LOCATION_REQUIRED: &str = "Location permission is required to find nearby eateries";

/// Facts about the host collected while loading device resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Operating system family.
    pub os: &'static str,
    /// CPU architecture.
    pub arch: &'static str,
}

impl DeviceProfile {
    /// Profile of the current host.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

/// Answer to a location permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Location may be used.
    Granted,
    /// The user refused.
    Denied,
}

/// Registered once location access has been granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationAccess;

/// Source of the location permission answer.
#[async_trait]
pub trait LocationPermission: Send + Sync {
    /// Ask for location access.
    async fn request(&self) -> anyhow::Result<PermissionStatus>;
}

/// Permission prompt answered from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredPermission {
    setting: LocationPermissionSetting,
}

impl ConfiguredPermission {
    /// Answer every request with `setting`.
    #[must_use]
    pub const fn new(setting: LocationPermissionSetting) -> Self {
        Self { setting }
    }
}

#[async_trait]
impl LocationPermission for ConfiguredPermission {
    async fn request(&self) -> anyhow::Result<PermissionStatus> {
        Ok(match self.setting {
            LocationPermissionSetting::Granted => PermissionStatus::Granted,
            LocationPermissionSetting::Denied => PermissionStatus::Denied,
        })
    }
}

/// The device feature with its two kick-starts.
///
/// # Errors
///
/// Returns an error if a kick-start label is rejected.
pub fn feature(permission: Arc<dyn LocationPermission>) -> KickStartResult<Feature> {
    let resources = KickStartTask::new(LOADING_DEVICE_RESOURCES, |context| async move {
        load_resources(&context);
        Ok(())
    })?;
    let location = KickStartTask::new(WAITING_FOR_LOCATION_PERMISSION, move |context| {
        let permission = Arc::clone(&permission);
        async move { await_permission(permission.as_ref(), &context).await }
    })?;
    Ok(Feature::new("device")
        .with_kick_start(resources)
        .with_kick_start(location))
}

fn load_resources(context: &KickStartContext) {
    let profile = DeviceProfile::current();
    debug!(os = profile.os, arch = profile.arch, "device profile prepared");
    context.services.insert(profile);
}

async fn await_permission(
    permission: &dyn LocationPermission,
    context: &KickStartContext,
) -> Result<(), DisclosableError> {
    let status = permission.request().await.map_err(|err| {
        DisclosableError::from_source(err).attempting_to("request location access")
    })?;
    match status {
        PermissionStatus::Granted => {
            info!("location permission granted");
            context.services.insert(LocationAccess);
            Ok(())
        }
        PermissionStatus::Denied => Err(DisclosableError::expected(LOCATION_REQUIRED)),
    }
}
