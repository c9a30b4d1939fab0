//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

use serde::Deserialize;

use crate::distribution::DistributionConfig;
use crate::registration::RegistrationConfig;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const CONFIG_ENV_VAR: &str = "LOGFEED_CONFIG";
pub const CONFIG_ENV_PREFIX: &str = "LOGFEED";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub distribution: DistributionConfig,
    pub registration: RegistrationConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. `LOGFEED__*` environment variables (`__` separates sections)
    /// 2. File named by `LOGFEED_CONFIG`
    /// 3. File at `path`
    /// 4. `config.yaml` in the working directory, if present
    /// 5. Defaults
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the distributor or registrar cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.distribution.max_read_count == 0 {
            return Err(ConfigError::Invalid {
                field: "distribution.max_read_count",
                reason: "must be at least 1".to_string(),
            });
        }
        let progress = self.distribution.unknown_tail_progress;
        if !(0.0..=100.0).contains(&progress) {
            return Err(ConfigError::Invalid {
                field: "distribution.unknown_tail_progress",
                reason: format!("must be within 0..=100, got {}", progress),
            });
        }
        if self.registration.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "registration.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.registration.catalog_stream.is_empty() {
            return Err(ConfigError::Invalid {
                field: "registration.catalog_stream",
                reason: "must not be empty".to_string(),
            });
        }
        if self.registration.retry_delay_ms > self.registration.max_retry_delay_ms {
            return Err(ConfigError::Invalid {
                field: "registration.retry_delay_ms",
                reason: "must not exceed max_retry_delay_ms".to_string(),
            });
        }
        Ok(())
    }

    pub fn for_test() -> Self {
        Self::default()
    }
}
