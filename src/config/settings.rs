//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Space-Track catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = &self.catalog;

        if !(catalog.base_url.starts_with("https://") || catalog.base_url.starts_with("http://")) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid catalog base_url '{}'. Must start with http:// or https://",
                    catalog.base_url
                ),
            });
        }

        let positive = [
            ("request_timeout_secs", catalog.request_timeout_secs),
            ("connect_timeout_secs", catalog.connect_timeout_secs),
            ("default_limit", u64::from(catalog.default_limit)),
            (
                "default_epoch_window_days",
                u64::from(catalog.default_epoch_window_days),
            ),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::ValidationError {
                    message: format!("catalog.{name} must be greater than zero"),
                });
            }
        }

        Ok(())
    }
}

/// Space-Track catalog client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Base URL of the catalog service.
    /// Default: `https://www.space-track.org`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TCP/TLS connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum number of element sets returned by `get_tles`.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Epoch window (days before now) applied when no epoch bounds are given.
    #[serde(default = "default_epoch_window")]
    pub default_epoch_window_days: u32,

    /// Log in while starting up instead of on the first tool call.
    #[serde(default)]
    pub login_on_startup: bool,
}

impl CatalogConfig {
    /// Returns the request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            default_limit: default_limit(),
            default_epoch_window_days: default_epoch_window(),
            login_on_startup: false,
        }
    }
}

fn default_base_url() -> String {
    "https://www.space-track.org".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_limit() -> u32 {
    10
}

const fn default_epoch_window() -> u32 {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
