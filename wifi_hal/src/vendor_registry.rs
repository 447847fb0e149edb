//! Vendor registry for HAL backends.
//!
//! Provides a `VendorRegistry` struct for registering and creating vendor
//! backends by name. Constructed at startup and passed where needed; there
//! is no global registry.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use wifi_common::error::WifiError;
use wifi_common::hal::vendor::{VendorFactory, VendorHal};

/// Registry of available vendor backends.
pub struct VendorRegistry {
    factories: HashMap<&'static str, VendorFactory>,
}

impl VendorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in backend.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_builtin_vendors(&mut registry);
        registry
    }

    /// Register a vendor factory.
    ///
    /// # Panics
    /// Panics if a vendor with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: VendorFactory) {
        if self.factories.contains_key(name) {
            panic!("Vendor '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a vendor factory by name.
    pub fn get_factory(&self, name: &str) -> Option<VendorFactory> {
        self.factories.get(name).copied()
    }

    /// Create a vendor instance by name.
    ///
    /// `section` is the vendor's `[vendor_config.<name>]` table, if any.
    ///
    /// # Errors
    /// - `WifiError::VendorNotFound` if no vendor with the given name is registered
    /// - whatever the factory reports for an invalid `section`
    pub fn create(
        &self,
        name: &str,
        section: Option<&toml::Value>,
    ) -> Result<Arc<dyn VendorHal>, WifiError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| WifiError::VendorNotFound(name.to_string()))?;
        let vendor = factory(section)?;
        info!("Created vendor: {} v{}", vendor.name(), vendor.version());
        Ok(vendor)
    }

    /// List all registered vendor names.
    pub fn list(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for VendorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
