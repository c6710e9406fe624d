//! Explicit runtime configuration.
//!
//! # Responsibility
//! - Describe database location, operation timeout and logging settings.
//! - Read overrides from the process environment.
//!
//! # Invariants
//! - Configuration is a plain value passed to constructors; nothing in core
//!   reads the environment after `from_env` returns.
//! - Invalid override values are rejected, never silently replaced.

use crate::db::StoreConfig;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "DB_PATH";
pub const ENV_DEFAULT_TIMEOUT: &str = "DEFAULT_TIMEOUT";
pub const ENV_BUSY_TIMEOUT_MS: &str = "PKMC_BUSY_TIMEOUT_MS";
pub const ENV_POOL_SIZE: &str = "PKMC_POOL_SIZE";
pub const ENV_LOG_LEVEL: &str = "PKMC_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PKMC_LOG_DIR";

const DEFAULT_DB_PATH: &str = "pkmc.db";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_POOL_SIZE: u32 = 8;

/// An environment override could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid value `{}` for {}: {}",
            self.value, self.key, self.reason
        )
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    /// Deadline applied to each top-level operation.
    pub default_timeout: Duration,
    pub busy_timeout: Duration,
    pub pool_size: u32,
    pub log_level: String,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            default_timeout: DEFAULT_TIMEOUT,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(value) = read(ENV_DEFAULT_TIMEOUT) {
            config.default_timeout = Duration::from_secs(parse_positive(ENV_DEFAULT_TIMEOUT, &value)?);
        }
        if let Some(value) = read(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout = Duration::from_millis(parse_positive(ENV_BUSY_TIMEOUT_MS, &value)?);
        }
        if let Some(value) = read(ENV_POOL_SIZE) {
            let size = parse_positive(ENV_POOL_SIZE, &value)?;
            config.pool_size = u32::try_from(size).map_err(|_| ConfigError {
                key: ENV_POOL_SIZE,
                value: value.clone(),
                reason: "pool size too large",
            })?;
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level.trim().to_ascii_lowercase();
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Store settings derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            path: self.db_path.clone(),
            pool_size: self.pool_size,
            busy_timeout: self.busy_timeout,
            checkout_timeout: self.default_timeout,
        }
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "must be greater than zero",
        }),
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "expected a positive integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ENV_DB_PATH, ENV_DEFAULT_TIMEOUT, ENV_LOG_LEVEL, ENV_POOL_SIZE};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CoreConfig, super::ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = config_from(&[]).expect("defaults should load");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.db_path, PathBuf::from("pkmc.db"));
        assert_eq!(config.default_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            (ENV_DB_PATH, "/tmp/catalog.db"),
            (ENV_DEFAULT_TIMEOUT, "5"),
            (ENV_POOL_SIZE, "2"),
            (ENV_LOG_LEVEL, " WARN "),
        ])
        .expect("overrides should load");

        assert_eq!(config.db_path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.default_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.store_config().checkout_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let error = config_from(&[(ENV_DEFAULT_TIMEOUT, "soon")]).expect_err("should fail");
        assert_eq!(error.key, ENV_DEFAULT_TIMEOUT);
        assert!(error.to_string().contains("soon"));

        let zero = config_from(&[(ENV_POOL_SIZE, "0")]).expect_err("zero pool should fail");
        assert_eq!(zero.reason, "must be greater than zero");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[(ENV_DB_PATH, "   ")]).expect("blank should be ignored");
        assert_eq!(config.db_path, PathBuf::from("pkmc.db"));
    }
}
