//! Typed settings for the intake.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use intake_core::{
    DEFAULT_ALLOWED_MEDIA_TYPES, DEFAULT_MAX_BYTE_SIZE, NotificationWindows, ValidationPolicy,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};

/// Which transport submissions go through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Multipart POST to the configured endpoint.
    #[default]
    Network,
    /// Fixed delay, then accept.
    Simulated,
}

impl TransportMode {
    /// Stable identifier used in YAML and environment values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Simulated => "simulated",
        }
    }
}

impl Display for TransportMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "network" => Ok(Self::Network),
            "simulated" | "simulate" => Ok(Self::Simulated),
            _ => Err(ConfigError::invalid(
                "intake",
                "transport",
                Some(value.to_string()),
                "must be 'network' or 'simulated'",
            )),
        }
    }
}

/// Validation policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySettings {
    /// Accepted declared media types.
    pub allowed_media_types: Vec<String>,
    /// Inclusive upper bound in bytes.
    pub max_byte_size: u64,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            allowed_media_types: DEFAULT_ALLOWED_MEDIA_TYPES
                .iter()
                .map(|media_type| (*media_type).to_string())
                .collect(),
            max_byte_size: DEFAULT_MAX_BYTE_SIZE,
        }
    }
}

impl PolicySettings {
    /// Build the core validation policy.
    #[must_use]
    pub fn to_policy(&self) -> ValidationPolicy {
        ValidationPolicy::new(&self.allowed_media_types, self.max_byte_size)
    }
}

/// Notification auto-clear windows in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationSettings {
    /// Visible time for success messages.
    pub success_ms: u64,
    /// Visible time for error messages.
    pub error_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        let windows = NotificationWindows::default();
        Self {
            success_ms: duration_ms(windows.success),
            error_ms: duration_ms(windows.error),
        }
    }
}

impl NotificationSettings {
    /// Build the core notification windows.
    #[must_use]
    pub const fn windows(&self) -> NotificationWindows {
        NotificationWindows {
            success: Duration::from_millis(self.success_ms),
            error: Duration::from_millis(self.error_ms),
        }
    }
}

/// Effective intake configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    /// Endpoint base URL; uploads go to `{endpoint}/upload`.
    pub endpoint: String,
    /// Client-wide request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Transport used for submissions.
    pub transport: TransportMode,
    /// Delay of the simulated transport in milliseconds.
    pub simulated_delay_ms: u64,
    /// Validation policy.
    pub policy: PolicySettings,
    /// Notification windows.
    pub notifications: NotificationSettings,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::ENDPOINT.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            transport: TransportMode::default(),
            simulated_delay_ms: defaults::SIMULATED_DELAY_MS,
            policy: PolicySettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl IntakeConfig {
    /// Parsed endpoint base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is not an absolute `http`/`https` URL.
    pub fn endpoint_url(&self) -> ConfigResult<Url> {
        let invalid = |reason| {
            ConfigError::invalid("intake", "endpoint", Some(self.endpoint.clone()), reason)
        };
        let url = Url::parse(self.endpoint.trim()).map_err(|_| invalid("must be an absolute URL"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("must include a host"));
        }
        Ok(url)
    }

    /// Request timeout as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Simulated transport delay as a duration.
    #[must_use]
    pub const fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
