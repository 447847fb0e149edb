//! Workspace-wide constants.

/// Canonical HAL service name (used for logging and thread names).
pub const HAL_SERVICE_NAME: &str = "wifi_hal";

/// System property holding the interface name bound to the chip.
pub const INTERFACE_NAME_PROPERTY: &str = "wifi.interface";

/// Interface name used when the property is unset.
pub const DEFAULT_INTERFACE_NAME: &str = "wlan0";

/// Size of the buffers handed to vendor version queries.
pub const DEBUG_INFO_BUFFER_LEN: usize = 256;

/// Placeholder reported when a debug-info field cannot be queried.
pub const UNKNOWN_DESCRIPTION: &str = "<unknown>";

/// Vendor backend used when none is configured.
pub const DEFAULT_VENDOR: &str = "simulation";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/wifi_hal/hal.toml";
