//! Configuration loading.
//!
//! The HAL daemon reads a single `hal.toml` (see [`crate::hal::config`]).
//! Any `Deserialize` type gets [`ConfigLoader`], so sections can also be
//! loaded on their own in tools and tests.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wifi_common::config::ConfigLoader;
//! use wifi_common::hal::config::HalConfig;
//!
//! let config = HalConfig::load_or_default(Path::new("/etc/wifi_hal/hal.toml"))?;
//! println!("vendor: {}", config.hal.vendor);
//! # Ok::<(), wifi_common::config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consts::HAL_SERVICE_NAME;

/// Configuration loading error.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("Failed to read {}: {message}", path.display())]
    ReadError {
        /// File that failed
        path: PathBuf,
        /// I/O error text
        message: String,
    },

    /// The TOML is malformed or does not match the expected shape.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Parsed values are inconsistent.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Logging verbosity, written in lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-task dispatcher traces.
    Trace,
    /// Lifecycle internals (barrier flags, vendor call steps).
    Debug,
    /// Lifecycle transitions.
    #[default]
    Info,
    /// Degraded operation (failed name or version queries, failing subscribers).
    Warn,
    /// Failed starts and fatal errors only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// `[shared]` section: logging and service identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Default log level when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name the daemon logs under.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    HAL_SERVICE_NAME.to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Reject an empty `service_name`.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` on violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared.service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// TOML loading for any deserializable configuration type.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Parse TOML text.
    ///
    /// # Errors
    /// Returns `ConfigError::ParseError` if the text is not valid for `Self`.
    fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Read and parse the file at `path`.
    ///
    /// # Errors
    /// - `ConfigError::FileNotFound` if there is no such file
    /// - `ConfigError::ReadError` if it cannot be read
    /// - `ConfigError::ParseError` if its contents are invalid
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::ReadError {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;
        Self::parse(&text)
    }

    /// Like [`load`](Self::load), but a missing file yields `Self::default()`.
    ///
    /// # Errors
    /// Same as `load`, except `FileNotFound`.
    fn load_or_default(path: &Path) -> Result<Self, ConfigError>
    where
        Self: Default,
    {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
