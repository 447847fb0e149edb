//! HAL daemon configuration.
//!
//! `HalConfig` is loaded from `hal.toml`:
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "wifi_hal"
//!
//! [hal]
//! vendor = "simulation"
//! interface_name = "wlan0"
//!
//! [properties]
//! "wifi.interface" = "wlan0"
//!
//! [vendor_config.simulation]
//! driver_version = "sim-driver 1.0"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{ConfigError, SharedConfig};
use crate::consts::DEFAULT_VENDOR;

/// Default function for the vendor backend name
fn default_vendor() -> String {
    DEFAULT_VENDOR.to_string()
}

/// Main configuration loaded from `hal.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HalConfig {
    /// Logging and service identity.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Lifecycle core settings.
    #[serde(default)]
    pub hal: HalSection,

    /// Static system properties (e.g., `"wifi.interface"`).
    #[serde(default)]
    pub properties: HashMap<String, String>,

    /// Per-vendor configuration sections.
    /// Key = vendor name, Value = vendor-specific TOML table.
    #[serde(default)]
    pub vendor_config: HashMap<String, toml::Value>,
}

/// `[hal]` section of `hal.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HalSection {
    /// Vendor backend to load (e.g., "simulation").
    #[serde(default = "default_vendor")]
    pub vendor: String,

    /// Interface bound to the chip. Takes precedence over system properties.
    #[serde(default)]
    pub interface_name: Option<String>,
}

impl Default for HalSection {
    fn default() -> Self {
        Self {
            vendor: default_vendor(),
            interface_name: None,
        }
    }
}

impl HalConfig {
    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// 1. `shared` is valid
    /// 2. `hal.vendor` is not empty
    /// 3. `hal.interface_name`, if set, is not empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.hal.vendor.is_empty() {
            return Err(ConfigError::ValidationError(
                "hal.vendor cannot be empty".to_string(),
            ));
        }

        if self.hal.interface_name.as_deref() == Some("") {
            return Err(ConfigError::ValidationError(
                "hal.interface_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Vendor-specific table for `vendor`, if configured.
    pub fn vendor_section(&self, vendor: &str) -> Option<&toml::Value> {
        self.vendor_config.get(vendor)
    }
}
