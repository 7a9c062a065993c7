//! Default configuration values and environment variable names.

/// Span mode used when `EATERY_NOD_MODE` is unset.
pub const DEFAULT_MODE: &str = "app";
/// Backend project identifier used when `EATERY_NOD_BACKEND_PROJECT` is unset.
pub const DEFAULT_BACKEND_PROJECT: &str = "eatery-nod";
/// Event bus replay capacity used when `EATERY_NOD_EVENT_CAPACITY` is unset.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;
/// Largest accepted event bus replay capacity.
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// Environment variable naming the log level.
pub const ENV_LOG_LEVEL: &str = "EATERY_NOD_LOG_LEVEL";
/// Environment variable naming the log format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "EATERY_NOD_LOG_FORMAT";
/// Environment variable naming the application span mode.
pub const ENV_MODE: &str = "EATERY_NOD_MODE";
/// Environment variable carrying the backend API key.
pub const ENV_BACKEND_API_KEY: &str = "EATERY_NOD_BACKEND_API_KEY";
/// Environment variable naming the backend project.
pub const ENV_BACKEND_PROJECT: &str = "EATERY_NOD_BACKEND_PROJECT";
/// Environment variable simulating the device location permission answer.
pub const ENV_LOCATION_PERMISSION: &str = "EATERY_NOD_LOCATION_PERMISSION";
/// Environment variable sizing the event bus replay ring.
pub const ENV_EVENT_CAPACITY: &str = "EATERY_NOD_EVENT_CAPACITY";
