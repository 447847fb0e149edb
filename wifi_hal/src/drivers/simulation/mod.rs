//! Simulation vendor module.
//!
//! Emulates a vendor Wi-Fi HAL library for development and testing without
//! hardware: a blocking event loop torn down by `cleanup`, a configurable
//! interface list, and version queries that can be made to fail.

mod config;
mod vendor;

pub use config::{SimulatedIface, SimulationConfig};
pub use vendor::{SimulatedVendor, VendorCallCounts};

use std::sync::Arc;
use wifi_common::error::WifiError;
use wifi_common::hal::vendor::VendorHal;

/// Factory function to create a simulation vendor instance.
///
/// # Errors
/// Returns `WifiError::VendorInit` if the `[vendor_config.simulation]`
/// table does not describe a valid `SimulationConfig`.
pub fn create_vendor(section: Option<&toml::Value>) -> Result<Arc<dyn VendorHal>, WifiError> {
    let config = match section {
        Some(value) => value
            .clone()
            .try_into::<SimulationConfig>()
            .map_err(|e| WifiError::VendorInit(format!("simulation config: {e}")))?,
        None => SimulationConfig::default(),
    };
    Ok(Arc::new(SimulatedVendor::new(config)))
}
