//! Server configuration parsing and validation.

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;

use crate::{AppError, Result};

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_http_port() -> u16 {
    3000
}

fn default_max_port_retries() -> u16 {
    10
}

fn default_log_capacity() -> usize {
    10_000
}

fn default_max_request_bytes() -> usize {
    1024 * 1024
}

/// Server configuration parsed from `config.toml`.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface address the listener binds to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Preferred HTTP port; `0` lets the OS pick an ephemeral port.
    #[serde(default = "default_http_port")]
    pub port: u16,
    /// Number of `port + n` attempts made after the preferred port fails.
    #[serde(default = "default_max_port_retries")]
    pub max_port_retries: u16,
    /// Maximum number of lines retained in the log buffer.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    /// Upper bound on a single buffered HTTP request (headers + body).
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
            max_port_retries: default_max_port_retries(),
            log_capacity: default_log_capacity(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

impl ServerConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host` is not an IP address.
    pub fn host_addr(&self) -> Result<IpAddr> {
        self.host
            .parse()
            .map_err(|err| AppError::Config(format!("host '{}' invalid: {err}", self.host)))
    }

    fn validate(&self) -> Result<()> {
        if self.log_capacity == 0 {
            return Err(AppError::Config(
                "log_capacity must be greater than zero".into(),
            ));
        }

        if self.max_request_bytes == 0 {
            return Err(AppError::Config(
                "max_request_bytes must be greater than zero".into(),
            ));
        }

        self.host_addr()?;
        Ok(())
    }
}
