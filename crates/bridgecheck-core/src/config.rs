//! Harness Configuration Management
//!
//! Configuration is layered with figment, lowest priority first:
//! 1. Default values
//! 2. TOML file given with `--config`
//! 3. Environment variables (`BRIDGECHECK_*`, `__` separates nested keys)
//!
//! The `[harness]` table is shared by every binary. The `[transport]` table is
//! owned by the adapter and deserialized into its own config type.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "BRIDGECHECK_";

// ----------------------------------------------------------------------------
// Configuration Types
// ----------------------------------------------------------------------------

/// Settings shared by every transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// Deadline used when no timeout argument is given
    pub default_timeout_secs: u64,

    /// How long teardown may take before the harness exits anyway
    pub shutdown_grace_ms: u64,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            default_timeout_secs: 5,
            shutdown_grace_ms: 1000,
        }
    }
}

/// Complete configuration for one harness binary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "C: Deserialize<'de> + Default"))]
pub struct HarnessConfig<C> {
    pub harness: HarnessSettings,
    pub transport: C,
}

// ----------------------------------------------------------------------------
// Configuration Loading Logic
// ----------------------------------------------------------------------------

impl<C> HarnessConfig<C>
where
    C: Serialize + DeserializeOwned + Default,
{
    /// Load defaults, then `path` if given, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Loading(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the shared settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.harness.default_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "harness.default_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.harness.default_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.harness.shutdown_grace_ms)
    }
}

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Configuration loading error: {0}")]
    Loading(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
