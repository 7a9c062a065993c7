//! Environment loader for [`AppConfig`].
//!
//! # Design
//! - Parsing takes an injected lookup so tests never mutate the process environment.
//! - Blank values are treated as unset.

use crate::defaults::{
    ENV_BACKEND_API_KEY, ENV_BACKEND_PROJECT, ENV_EVENT_CAPACITY, ENV_LOCATION_PERMISSION,
    ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_MODE, MAX_EVENT_CAPACITY,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{AppConfig, LocationPermissionSetting};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a variable holds an invalid value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = Some(parse_log_level(&level)?);
        }
        if let Some(format) = read(ENV_LOG_FORMAT) {
            config.log_format = Some(parse_log_format(&format)?);
        }
        if let Some(mode) = read(ENV_MODE) {
            config.mode = mode;
        }
        config.backend.api_key = read(ENV_BACKEND_API_KEY);
        if let Some(project) = read(ENV_BACKEND_PROJECT) {
            config.backend.project = project;
        }
        if let Some(permission) = read(ENV_LOCATION_PERMISSION) {
            config.location_permission = parse_location_permission(&permission)?;
        }
        if let Some(capacity) = read(ENV_EVENT_CAPACITY) {
            config.event_capacity = parse_event_capacity(&capacity)?;
        }

        Ok(config)
    }
}

/// Accepts a comma-separated list of `level` or `target=level` directives.
fn parse_log_level(value: &str) -> ConfigResult<String> {
    let directives = value
        .split(',')
        .map(|directive| match directive.split_once('=') {
            Some((target, level)) => normalize_level(level)
                .filter(|_| is_target(target))
                .map(|level| format!("{}={level}", target.trim())),
            None => normalize_level(directive),
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| invalid(ENV_LOG_LEVEL, "unknown_level", value))?;
    Ok(directives.join(","))
}

fn normalize_level(level: &str) -> Option<String> {
    let normalized = level.trim().to_ascii_lowercase();
    LOG_LEVELS
        .contains(&normalized.as_str())
        .then_some(normalized)
}

fn is_target(target: &str) -> bool {
    let target = target.trim();
    !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-'))
}

fn parse_log_format(value: &str) -> ConfigResult<String> {
    let normalized = value.to_ascii_lowercase();
    match normalized.as_str() {
        "json" | "pretty" => Ok(normalized),
        _ => Err(invalid(ENV_LOG_FORMAT, "unknown_format", value)),
    }
}

fn parse_location_permission(value: &str) -> ConfigResult<LocationPermissionSetting> {
    match value.to_ascii_lowercase().as_str() {
        "granted" | "1" | "true" | "yes" => Ok(LocationPermissionSetting::Granted),
        "denied" | "0" | "false" | "no" => Ok(LocationPermissionSetting::Denied),
        _ => Err(invalid(
            ENV_LOCATION_PERMISSION,
            "unknown_permission",
            value,
        )),
    }
}

fn parse_event_capacity(value: &str) -> ConfigResult<usize> {
    let capacity = value
        .parse::<usize>()
        .map_err(|_| invalid(ENV_EVENT_CAPACITY, "not_an_integer", value))?;
    if capacity == 0 {
        return Err(invalid(ENV_EVENT_CAPACITY, "zero", value));
    }
    if capacity > MAX_EVENT_CAPACITY {
        return Err(invalid(ENV_EVENT_CAPACITY, "too_large", value));
    }
    Ok(capacity)
}

fn invalid(field: &'static str, reason: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidField {
        field,
        reason,
        value: Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() -> ConfigResult<()> {
        let config = AppConfig::from_lookup(lookup_from(&[]))?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn values_are_parsed_and_normalized() -> ConfigResult<()> {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_LOG_LEVEL, "DEBUG"),
            (ENV_LOG_FORMAT, " Json "),
            (ENV_MODE, "splash"),
            (ENV_BACKEND_API_KEY, "key-123"),
            (ENV_BACKEND_PROJECT, "nod-prod"),
            (ENV_LOCATION_PERMISSION, "denied"),
            (ENV_EVENT_CAPACITY, "32"),
        ]))?;
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_format.as_deref(), Some("json"));
        assert_eq!(config.mode, "splash");
        assert_eq!(config.backend.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.backend.project, "nod-prod");
        assert_eq!(config.location_permission, LocationPermissionSetting::Denied);
        assert_eq!(config.event_capacity, 32);
        Ok(())
    }

    #[test]
    fn log_level_accepts_target_directives() -> ConfigResult<()> {
        let config = AppConfig::from_lookup(lookup_from(&[(
            ENV_LOG_LEVEL,
            "WARN, eatery_nod_kickstart=Debug,tokio::task=trace",
        )]))?;
        assert_eq!(
            config.log_level.as_deref(),
            Some("warn,eatery_nod_kickstart=debug,tokio::task=trace")
        );
        Ok(())
    }

    #[test]
    fn blank_values_are_treated_as_unset() -> ConfigResult<()> {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_BACKEND_API_KEY, "   "),
            (ENV_LOG_LEVEL, ""),
        ]))?;
        assert!(config.backend.api_key.is_none());
        assert!(config.log_level.is_none());
        Ok(())
    }

    #[test]
    fn invalid_values_report_field_and_reason() {
        let cases = [
            (ENV_LOG_LEVEL, "loud", "unknown_level"),
            (ENV_LOG_LEVEL, "info,=debug", "unknown_level"),
            (ENV_LOG_LEVEL, "eatery_nod_kickstart=chatty", "unknown_level"),
            (ENV_LOG_LEVEL, "warn,", "unknown_level"),
            (ENV_LOG_FORMAT, "xml", "unknown_format"),
            (ENV_LOCATION_PERMISSION, "maybe", "unknown_permission"),
            (ENV_EVENT_CAPACITY, "lots", "not_an_integer"),
            (ENV_EVENT_CAPACITY, "0", "zero"),
            (ENV_EVENT_CAPACITY, "1000000", "too_large"),
        ];
        for (field, value, reason) in cases {
            let err = AppConfig::from_lookup(lookup_from(&[(field, value)]))
                .expect_err("value should be rejected");
            assert_eq!(
                err,
                ConfigError::InvalidField {
                    field,
                    reason,
                    value: Some(value.to_string()),
                }
            );
        }
    }
}
