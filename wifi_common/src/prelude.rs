//! Prelude module for common re-exports.
//!
//! ```rust
//! use wifi_common::prelude::*;
//! ```

// ─── Logging / Configuration ────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::hal::config::{HalConfig, HalSection};
pub use crate::properties::{EnvProperties, PropertyStore, StaticProperties};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{FatalError, WifiError};

// ─── Vendor Boundary ────────────────────────────────────────────────
pub use crate::hal::vendor::{
    CleanupHandler, IfaceHandle, LegacyError, VendorFactory, VendorHal, WifiHandle,
};

// ─── Lifecycle Types ────────────────────────────────────────────────
pub use crate::hal::callback::{
    CallbackError, CallbackResult, WifiChipEventCallback, WifiEventCallback,
};
pub use crate::hal::types::{
    ChipDebugInfo, ChipMode, CommandFailureReason, CommandId, FailureReason, RunState,
};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_INTERFACE_NAME, HAL_SERVICE_NAME, UNKNOWN_DESCRIPTION};
