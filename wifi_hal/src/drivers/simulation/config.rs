//! Simulation vendor configuration (`[vendor_config.simulation]`).

use serde::{Deserialize, Serialize};
use wifi_common::consts::DEFAULT_INTERFACE_NAME;
use wifi_common::hal::vendor::LegacyError;

/// Default function for the interface list
fn default_interfaces() -> Vec<SimulatedIface> {
    vec![SimulatedIface::new(DEFAULT_INTERFACE_NAME)]
}

/// Default function for the driver version
fn default_driver_version() -> String {
    format!("simulated-driver {}", env!("CARGO_PKG_VERSION"))
}

/// Default function for the firmware version
fn default_firmware_version() -> String {
    format!("simulated-firmware {}", env!("CARGO_PKG_VERSION"))
}

/// Behavior of the simulated vendor library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Interfaces reported by `get_ifaces`, in order.
    #[serde(default = "default_interfaces")]
    pub interfaces: Vec<SimulatedIface>,

    /// String returned by `get_driver_version`.
    #[serde(default = "default_driver_version")]
    pub driver_version: String,

    /// String returned by `get_firmware_version`.
    #[serde(default = "default_firmware_version")]
    pub firmware_version: String,

    /// Make `initialize` fail with this status.
    #[serde(default)]
    pub init_error: Option<LegacyError>,

    /// Make `get_ifaces` fail with this status.
    #[serde(default)]
    pub enumeration_error: Option<LegacyError>,

    /// Make `get_driver_version` fail with this status.
    #[serde(default)]
    pub driver_version_error: Option<LegacyError>,

    /// Make `get_firmware_version` fail with this status.
    #[serde(default)]
    pub firmware_version_error: Option<LegacyError>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interfaces: default_interfaces(),
            driver_version: default_driver_version(),
            firmware_version: default_firmware_version(),
            init_error: None,
            enumeration_error: None,
            driver_version_error: None,
            firmware_version_error: None,
        }
    }
}

/// One simulated network interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedIface {
    /// Interface name (e.g., "wlan0").
    pub name: String,

    /// Make `get_iface_name` fail for this interface.
    #[serde(default)]
    pub name_error: Option<LegacyError>,
}

impl SimulatedIface {
    /// An interface whose name query succeeds.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            name_error: None,
        }
    }

    /// An interface whose name query fails with `error`.
    pub fn failing(name: &str, error: LegacyError) -> Self {
        Self {
            name: name.to_string(),
            name_error: Some(error),
        }
    }
}
