//! Configuration loading for nif-bridge.
//!
//! Configuration is loaded from a TOML file. Every section and field is
//! optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [api]
//! version = 710
//!
//! [network]
//! thread_name = "fdb-network"
//! ready_timeout_ms = 5000
//!
//! [[network.options]]
//! name = "trace_enable"
//! value = "/var/log/foundationdb"
//!
//! [logging]
//! filter = "info"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nif_client::NetworkThreadConfig;
use nif_types::{NetworkOption, OptionValue, TermError};

/// Root configuration for nif-bridge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    /// API version negotiation.
    #[serde(default)]
    pub api: ApiConfig,
    /// Network thread and options.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API version negotiation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Runtime API version to select at boot (default: highest supported).
    pub version: Option<i32>,
}

/// Network thread and options.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Name of the network thread (default: `fdb-network`).
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
    /// How long setup waits for the network thread (default: 5000ms).
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
    /// Options applied at boot, in order, before network setup.
    #[serde(default)]
    pub options: Vec<OptionSetting>,
}

/// One network option applied at boot.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionSetting {
    /// Option name (snake_case).
    pub name: NetworkOption,
    /// Value, if the option takes one.
    #[serde(default)]
    pub value: Option<SettingValue>,
}

/// A value as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Integer value.
    Int(i64),
    /// String value.
    Text(String),
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence (default: `info`).
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions
fn default_thread_name() -> String {
    nif_client::network::DEFAULT_THREAD_NAME.to_string()
}

fn default_ready_timeout_ms() -> u64 {
    nif_client::network::duration_millis(nif_client::network::DEFAULT_READY_TIMEOUT)
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
            ready_timeout_ms: default_ready_timeout_ms(),
            options: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl OptionSetting {
    /// Encode the configured value for the native call.
    pub fn encode(&self) -> Result<Option<OptionValue>, TermError> {
        let value = self.value.as_ref().map(|v| match v {
            SettingValue::Int(i) => OptionValue::Int(*i),
            SettingValue::Text(s) => OptionValue::Bytes(s.as_bytes().to_vec()),
        });
        self.name.encode(value)
    }
}

impl NetworkConfig {
    /// Thread settings for the client.
    pub fn thread_config(&self) -> NetworkThreadConfig {
        NetworkThreadConfig {
            thread_name: self.thread_name.clone(),
            ready_timeout: Duration::from_millis(self.ready_timeout_ms),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every configured option value matches the option's kind.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for setting in &self.network.options {
            setting.encode().map_err(|e| ConfigError::InvalidOption {
                name: setting.name.name(),
                source: e,
            })?;
        }
        if self.network.ready_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "network.ready_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// An option value does not match the option's kind.
    #[error("invalid value for network option {name}: {source}")]
    InvalidOption {
        /// Option name.
        name: &'static str,
        /// Why the value was rejected.
        source: TermError,
    },
    /// Some other field is out of range.
    #[error("invalid config: {0}")]
    InvalidValue(String),
}
