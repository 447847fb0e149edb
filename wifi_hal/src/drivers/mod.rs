//! Vendor HAL backends.
//!
//! - [`simulation`] - Software stand-in for the vendor library
//!
//! # Adding New Vendors
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `VendorHal` trait from `wifi_common::hal::vendor`
//! 3. Register its factory in [`register_builtin_vendors`]

pub mod simulation;

use crate::vendor_registry::VendorRegistry;

/// Register all built-in vendor backends.
pub fn register_builtin_vendors(registry: &mut VendorRegistry) {
    registry.register("simulation", simulation::create_vendor);
}
