//! Typed configuration models.

use serde::Serialize;

use crate::defaults::{DEFAULT_BACKEND_PROJECT, DEFAULT_EVENT_CAPACITY, DEFAULT_MODE};

/// Fully validated application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    /// Filter directives handed to the tracing filter; `None` keeps the logging default.
    pub log_level: Option<String>,
    /// Requested log format (`json` or `pretty`); `None` infers from the build.
    pub log_format: Option<String>,
    /// Mode recorded on the application span.
    pub mode: String,
    /// Backend SDK settings.
    pub backend: BackendConfig,
    /// Simulated answer to the device location permission prompt.
    pub location_permission: LocationPermissionSetting,
    /// Event bus replay capacity.
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            log_format: None,
            mode: DEFAULT_MODE.to_string(),
            backend: BackendConfig::default(),
            location_permission: LocationPermissionSetting::Granted,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Backend SDK settings.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct BackendConfig {
    /// API key used to initialise the SDK; absent keys fail initialisation.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Backend project identifier.
    pub project: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project: DEFAULT_BACKEND_PROJECT.to_string(),
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("project", &self.project)
            .finish()
    }
}

/// Answer the device gives to the location permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPermissionSetting {
    /// The user grants access.
    Granted,
    /// The user denies access.
    Denied,
}
