//! Consistency checks applied after every layer has been merged.

use crate::error::{ConfigError, ConfigResult};
use crate::model::IntakeConfig;

/// Check the merged configuration, reporting the first offending field.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] naming the section and field at fault.
pub fn validate(config: &IntakeConfig) -> ConfigResult<()> {
    config.endpoint_url()?;
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "intake",
            "request_timeout_secs",
            Some("0".into()),
            "must be positive",
        ));
    }

    let policy = &config.policy;
    if policy.allowed_media_types.iter().all(|value| value.trim().is_empty()) {
        return Err(ConfigError::invalid(
            "policy",
            "allowed_media_types",
            None,
            "must list at least one media type",
        ));
    }
    if policy.max_byte_size == 0 {
        return Err(ConfigError::invalid(
            "policy",
            "max_byte_size",
            Some("0".into()),
            "must be positive",
        ));
    }

    let notifications = &config.notifications;
    for (field, value) in [
        ("success_ms", notifications.success_ms),
        ("error_ms", notifications.error_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::invalid(
                "notifications",
                field,
                Some("0".into()),
                "must be positive",
            ));
        }
    }
    Ok(())
}

impl IntakeConfig {
    /// See [`validate`].
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> ConfigResult<()> {
        validate(self)
    }
}
