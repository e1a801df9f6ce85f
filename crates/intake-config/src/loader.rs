//! Layering of defaults, a YAML file, environment variables, and flags.
//!
//! # Design
//! - Precedence, lowest first: defaults, file, environment, flags.
//! - Environment access goes through a lookup closure so tests stay hermetic.
//! - The merged result is validated once, after the last layer.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{IntakeConfig, TransportMode};

/// Path of a YAML configuration file.
pub const ENV_CONFIG: &str = "INTAKE_CONFIG";
/// Endpoint base URL.
pub const ENV_ENDPOINT: &str = "INTAKE_ENDPOINT";
/// Request timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "INTAKE_HTTP_TIMEOUT_SECS";
/// `network` or `simulated`.
pub const ENV_TRANSPORT: &str = "INTAKE_TRANSPORT";
/// Size limit in bytes.
pub const ENV_MAX_BYTES: &str = "INTAKE_MAX_BYTES";
/// Comma-separated allowed media types.
pub const ENV_ALLOWED_TYPES: &str = "INTAKE_ALLOWED_TYPES";

/// Values supplied on the command line; `None` leaves lower layers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Endpoint base URL.
    pub endpoint: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Transport selection.
    pub transport: Option<TransportMode>,
}

/// Builds an [`IntakeConfig`] from its layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    /// Loader with no explicit file and no flag overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this YAML file instead of the one named by `INTAKE_CONFIG`.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Apply command-line overrides as the last layer.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load using the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, an environment
    /// value is malformed, or the merged configuration fails validation.
    pub fn load(&self) -> ConfigResult<IntakeConfig> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn load_with<F>(&self, lookup: F) -> ConfigResult<IntakeConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = self
            .file
            .clone()
            .or_else(|| lookup(ENV_CONFIG).filter(|value| !value.trim().is_empty()).map(PathBuf::from));
        let mut config = match file {
            Some(path) => read_file(&path)?,
            None => IntakeConfig::default(),
        };

        apply_env(&mut config, &lookup)?;
        apply_overrides(&mut config, &self.overrides);
        config.validate()?;

        debug!(
            endpoint = %config.endpoint,
            transport = %config.transport,
            max_byte_size = config.policy.max_byte_size,
            "configuration loaded"
        );
        Ok(config)
    }
}

fn read_file(path: &Path) -> ConfigResult<IntakeConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(IntakeConfig::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env<F>(config: &mut IntakeConfig, lookup: &F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(endpoint) = read(ENV_ENDPOINT) {
        config.endpoint = endpoint.trim().to_string();
    }
    if let Some(raw) = read(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs = parse_u64(ENV_TIMEOUT_SECS, &raw)?;
    }
    if let Some(raw) = read(ENV_TRANSPORT) {
        config.transport = raw.parse()?;
    }
    if let Some(raw) = read(ENV_MAX_BYTES) {
        config.policy.max_byte_size = parse_u64(ENV_MAX_BYTES, &raw)?;
    }
    if let Some(raw) = read(ENV_ALLOWED_TYPES) {
        config.policy.allowed_media_types = raw
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
    }
    Ok(())
}

fn apply_overrides(config: &mut IntakeConfig, overrides: &ConfigOverrides) {
    if let Some(endpoint) = &overrides.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(timeout) = overrides.request_timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if let Some(transport) = overrides.transport {
        config.transport = transport;
    }
}

fn parse_u64(key: &str, raw: &str) -> ConfigResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid("env", key, Some(raw.to_string()), "must be an unsigned integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn yaml_file(contents: &str) -> anyhow::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn no_layers_yields_defaults() -> anyhow::Result<()> {
        let config = ConfigLoader::new().load_with(env_of(&[]))?;
        assert_eq!(config, IntakeConfig::default());
        Ok(())
    }

    #[test]
    fn precedence_is_file_then_env_then_flags() -> anyhow::Result<()> {
        let file = yaml_file(
            "endpoint: http://file.example:9000\nrequest_timeout_secs: 10\ntransport: simulated\npolicy:\n  max_byte_size: 100\n",
        )?;
        let env = env_of(&[
            (ENV_TIMEOUT_SECS, "20"),
            (ENV_MAX_BYTES, "200"),
            (ENV_ALLOWED_TYPES, "image/png, application/pdf"),
        ]);
        let overrides = ConfigOverrides {
            request_timeout_secs: Some(40),
            ..ConfigOverrides::default()
        };

        let config = ConfigLoader::new()
            .with_file(file.path())
            .with_overrides(overrides)
            .load_with(env)?;

        assert_eq!(config.endpoint, "http://file.example:9000");
        assert_eq!(config.transport, TransportMode::Simulated);
        assert_eq!(config.request_timeout_secs, 40);
        assert_eq!(config.policy.max_byte_size, 200);
        assert_eq!(
            config.policy.allowed_media_types,
            vec!["image/png".to_string(), "application/pdf".to_string()]
        );
        Ok(())
    }

    #[test]
    fn config_path_can_come_from_env() -> anyhow::Result<()> {
        let file = yaml_file("transport: simulated\n")?;
        let path = file.path().to_string_lossy().into_owned();
        let config = ConfigLoader::new().load_with(env_of(&[(ENV_CONFIG, path.as_str())]))?;
        assert_eq!(config.transport, TransportMode::Simulated);
        Ok(())
    }

    #[test]
    fn malformed_env_number_names_the_variable() {
        let err = ConfigLoader::new()
            .load_with(env_of(&[(ENV_MAX_BYTES, "fifty")]))
            .expect_err("parse failure expected");
        assert!(matches!(
            err,
            ConfigError::InvalidField { ref field, .. } if field == ENV_MAX_BYTES
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ConfigLoader::new()
            .with_file("/definitely/missing/intake.yaml")
            .load_with(env_of(&[]))
            .expect_err("io failure expected");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() -> anyhow::Result<()> {
        let file = yaml_file("policy: [not, a, map]\n")?;
        let err = ConfigLoader::new()
            .with_file(file.path())
            .load_with(env_of(&[]))
            .expect_err("parse failure expected");
        assert!(matches!(err, ConfigError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn merged_result_is_validated() {
        let err = ConfigLoader::new()
            .load_with(env_of(&[(ENV_TIMEOUT_SECS, "0")]))
            .expect_err("validation failure expected");
        assert!(matches!(
            err,
            ConfigError::InvalidField { ref field, .. } if field == "request_timeout_secs"
        ));
    }
}
