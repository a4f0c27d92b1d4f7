//! Configuration types for tronpay.
//!
//! Configuration covers which TRON network to talk to, how the gateway is
//! reached, how transfers are guarded, and how logs are written.
//!
//! # Configuration File
//!
//! Configuration is stored in TOML format at `~/.tronpay/config.toml`.
//!
//! # Examples
//!
//! ```
//! use tronpay_core::config::{Config, Network};
//!
//! let config = Config::default();
//! assert_eq!(config.gateway.network, Network::Shasta);
//! assert_eq!(config.gateway.timeout_secs, 30);
//! assert_eq!(config.base_url(), "https://api.shasta.trongrid.io");
//! ```
//!
//! # Default TOML Output
//!
//! ```toml
//! [gateway]
//! network = "shasta"
//! # base_url = "https://api.shasta.trongrid.io"
//! # api_key = "your-trongrid-api-key"
//! api_key_header = "TRON-PRO-API-KEY"
//! timeout_secs = 30
//!
//! [transfer]
//! # explorer_base_url = "https://shasta.tronscan.org/#/transaction/"
//! verify_sender_key = true
//! verify_tx_id = false
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! # file = "~/.tronpay/logs/tronpay.log"
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// TronGrid's API key header.
pub const DEFAULT_API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

/// Log levels accepted in `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log formats accepted in `logging.format`.
pub const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

// ============================================================================
// Network
// ============================================================================

/// A TRON network with known public endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Shasta test network.
    #[default]
    Shasta,
    /// Nile test network.
    Nile,
}

impl Network {
    /// TronGrid base URL for this network.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.trongrid.io",
            Self::Shasta => "https://api.shasta.trongrid.io",
            Self::Nile => "https://nile.trongrid.io",
        }
    }

    /// Tronscan transaction link prefix for this network.
    #[must_use]
    pub const fn explorer_base_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://tronscan.org/#/transaction/",
            Self::Shasta => "https://shasta.tronscan.org/#/transaction/",
            Self::Nile => "https://nile.tronscan.org/#/transaction/",
        }
    }

    /// Lowercase network name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Shasta => "shasta",
            Self::Nile => "nile",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Config
// ============================================================================

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use tronpay_core::config::{Config, Network};
///
/// let toml_str = r#"
/// [gateway]
/// network = "mainnet"
/// api_key = "abc"
/// timeout_secs = 10
///
/// [transfer]
/// verify_tx_id = true
/// "#;
///
/// let config: Config = toml::from_str(toml_str).expect("valid TOML");
/// assert_eq!(config.gateway.network, Network::Mainnet);
/// assert!(config.transfer.verify_tx_id);
/// assert_eq!(config.explorer_base_url(), "https://tronscan.org/#/transaction/");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// How the ledger gateway is reached.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Transfer pipeline settings.
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_timeout() -> u64 {
    30
}

fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

/// Ledger gateway settings.
///
/// The API key is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Network preset; supplies the base URL unless `base_url` is set.
    #[serde(default)]
    pub network: Network,

    /// Explicit gateway base URL, overriding the network preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key sent with every request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Header that carries the API key.
    ///
    /// Default: `TRON-PRO-API-KEY`
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Per-call timeout in seconds. Must be non-zero.
    ///
    /// Default: 30 seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// The base URL in effect.
    #[must_use]
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.network.base_url())
    }

    /// The per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            base_url: None,
            api_key: None,
            api_key_header: default_api_key_header(),
            timeout_secs: default_timeout(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("network", &self.network)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_header", &self.api_key_header)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

const fn default_true() -> bool {
    true
}

/// Transfer pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferConfig {
    /// Explorer link prefix, overriding the network preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_base_url: Option<String>,

    /// Refuse to sign when the key does not derive the sender address.
    ///
    /// Default: `true`
    #[serde(default = "default_true")]
    pub verify_sender_key: bool,

    /// Refuse to sign when `txID` is not the SHA-256 of `raw_data_hex`.
    ///
    /// Default: `false` (the gateway's `txID` is signed as given)
    #[serde(default)]
    pub verify_tx_id: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            explorer_base_url: None,
            verify_sender_key: true,
            verify_tx_id: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// One of `pretty`, `json`, `compact`.
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional log file; rotated daily. Supports `~` expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The gateway base URL in effect.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.gateway.resolved_base_url()
    }

    /// The explorer link prefix in effect.
    #[must_use]
    pub fn explorer_base_url(&self) -> &str {
        self.transfer
            .explorer_base_url
            .as_deref()
            .unwrap_or_else(|| self.gateway.network.explorer_base_url())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `gateway.timeout_secs` is zero
    /// - `gateway.api_key_header` is empty
    /// - `gateway.base_url` or `transfer.explorer_base_url` is not an http(s) URL
    /// - `gateway.api_key` is set but empty
    /// - `logging.level` or `logging.format` is not a known value
    ///
    /// # Examples
    ///
    /// ```
    /// use tronpay_core::config::Config;
    ///
    /// let config = Config::default();
    /// assert!(config.validate().is_ok());
    ///
    /// let mut invalid = Config::default();
    /// invalid.gateway.timeout_secs = 0;
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::invalid_value("gateway.timeout_secs", "0"));
        }

        if self.gateway.api_key_header.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "gateway.api_key_header",
                "<empty>",
            ));
        }

        if matches!(&self.gateway.api_key, Some(key) if key.trim().is_empty()) {
            return Err(ConfigError::invalid_value("gateway.api_key", "<empty>"));
        }

        if let Some(url) = &self.gateway.base_url {
            validate_http_url("gateway.base_url", url)?;
        }

        if let Some(url) = &self.transfer.explorer_base_url {
            validate_http_url("transfer.explorer_base_url", url)?;
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                &self.logging.level,
            ));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.format",
                &self.logging.format,
            ));
        }

        Ok(())
    }

    /// Generates the default configuration as a TOML string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tronpay_core::config::Config;
    ///
    /// let toml = Config::default_toml();
    /// assert!(toml.contains("[gateway]"));
    /// assert!(toml.contains("[transfer]"));
    /// assert!(toml.contains("[logging]"));
    /// ```
    #[must_use]
    pub fn default_toml() -> String {
        r#"[gateway]
network = "shasta"
# base_url = "https://api.shasta.trongrid.io"
# api_key = "your-trongrid-api-key"
api_key_header = "TRON-PRO-API-KEY"
timeout_secs = 30

[transfer]
# explorer_base_url = "https://shasta.tronscan.org/#/transaction/"
verify_sender_key = true
verify_tx_id = false

[logging]
level = "info"
format = "pretty"
# file = "~/.tronpay/logs/tronpay.log"
"#
        .to_string()
    }

    /// Creates a configuration builder for customizing values.
    ///
    /// # Examples
    ///
    /// ```
    /// use tronpay_core::config::{Config, Network};
    ///
    /// let config = Config::builder()
    ///     .network(Network::Mainnet)
    ///     .timeout_secs(10)
    ///     .build();
    ///
    /// assert_eq!(config.base_url(), "https://api.trongrid.io");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

fn validate_http_url(field: &str, url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ConfigError::invalid_value(field, url)),
    }
}

/// Builder for creating customized [`Config`] instances.
///
/// # Examples
///
/// ```
/// use tronpay_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .base_url("http://127.0.0.1:8090")
///     .api_key("secret")
///     .explorer_base_url("https://example.org/tx/")
///     .verify_tx_id(true)
///     .build();
///
/// assert_eq!(config.base_url(), "http://127.0.0.1:8090");
/// assert_eq!(config.explorer_base_url(), "https://example.org/tx/");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new configuration builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Sets the network preset.
    #[must_use]
    pub const fn network(mut self, network: Network) -> Self {
        self.config.gateway.network = network;
        self
    }

    /// Overrides the gateway base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gateway.base_url = Some(url.into());
        self
    }

    /// Sets the gateway API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.gateway.api_key = Some(key.into());
        self
    }

    /// Sets the header that carries the API key.
    #[must_use]
    pub fn api_key_header(mut self, header: impl Into<String>) -> Self {
        self.config.gateway.api_key_header = header.into();
        self
    }

    /// Sets the per-call timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.gateway.timeout_secs = secs;
        self
    }

    /// Overrides the explorer link prefix.
    #[must_use]
    pub fn explorer_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.transfer.explorer_base_url = Some(url.into());
        self
    }

    /// Enables or disables the sender key check.
    #[must_use]
    pub const fn verify_sender_key(mut self, enabled: bool) -> Self {
        self.config.transfer.verify_sender_key = enabled;
        self
    }

    /// Enables or disables the `txID` digest check.
    #[must_use]
    pub const fn verify_tx_id(mut self, enabled: bool) -> Self {
        self.config.transfer.verify_tx_id = enabled;
        self
    }

    /// Sets the log level.
    #[must_use]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Sets the log format.
    #[must_use]
    pub fn log_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    /// Sets the log file.
    #[must_use]
    pub fn log_file(mut self, path: impl Into<String>) -> Self {
        self.config.logging.file = Some(path.into());
        self
    }

    /// Builds the final configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
