//! System property lookup.
//!
//! The HAL binds its chip to the interface named by the `wifi.interface`
//! property. Properties come from a chain of [`PropertyStore`]s; the first
//! store that knows a key wins.

use std::collections::HashMap;

use crate::consts::{DEFAULT_INTERFACE_NAME, INTERFACE_NAME_PROPERTY};

/// Read-only source of system properties.
pub trait PropertyStore {
    /// Value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Properties backed by a fixed map (e.g., the `[properties]` table).
#[derive(Debug, Clone, Default)]
pub struct StaticProperties {
    values: HashMap<String, String>,
}

impl StaticProperties {
    /// Create a store from key/value pairs.
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl PropertyStore for StaticProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Properties backed by environment variables.
///
/// `wifi.interface` is read from `WIFI_INTERFACE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProperties;

impl EnvProperties {
    /// Environment variable name for a property key.
    pub fn var_name(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

impl PropertyStore for EnvProperties {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::var_name(key)).ok().filter(|v| !v.is_empty())
    }
}

/// Look `key` up in each store in order.
pub fn lookup(stores: &[&dyn PropertyStore], key: &str) -> Option<String> {
    stores.iter().find_map(|store| store.get(key))
}

/// Interface name bound to the chip, `"wlan0"` when unset.
pub fn interface_name(stores: &[&dyn PropertyStore]) -> String {
    lookup(stores, INTERFACE_NAME_PROPERTY).unwrap_or_else(|| DEFAULT_INTERFACE_NAME.to_string())
}
