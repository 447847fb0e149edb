//! Vendor HAL trait and status types.
//!
//! This module defines:
//! - `VendorHal` trait - The function table exposed by a vendor HAL library
//! - `WifiHandle` / `IfaceHandle` - Opaque tokens issued by the vendor
//! - `LegacyError` enum - Vendor status codes
//! - `VendorFactory` type alias - Factory function type
//! - Bounded C-string buffer helpers used by version queries

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::WifiError;

/// Status codes returned by the vendor library.
///
/// `WIFI_SUCCESS` has no variant: success is `Ok(..)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyError {
    /// Unspecified failure
    #[error("unknown error")]
    Unknown,
    /// Library not initialized
    #[error("uninitialized")]
    Uninitialized,
    /// Operation not supported by the driver
    #[error("not supported")]
    NotSupported,
    /// Resource temporarily unavailable
    #[error("not available")]
    NotAvailable,
    /// Invalid arguments
    #[error("invalid arguments")]
    InvalidArgs,
    /// Invalid request identifier
    #[error("invalid request id")]
    InvalidRequestId,
    /// Operation timed out
    #[error("timed out")]
    TimedOut,
    /// Too many outstanding requests
    #[error("too many requests")]
    TooManyRequests,
    /// Vendor allocation failure
    #[error("out of memory")]
    OutOfMemory,
    /// Device or resource busy
    #[error("busy")]
    Busy,
}

/// Opaque handle returned by vendor initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WifiHandle(u64);

impl WifiHandle {
    /// Wrap a raw vendor token.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw vendor token.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WifiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wifi_handle({:#x})", self.0)
    }
}

/// Opaque handle identifying one vendor network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IfaceHandle(u64);

impl IfaceHandle {
    /// Wrap a raw vendor token.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw vendor token.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "iface_handle({:#x})", self.0)
    }
}

/// Completion handler passed to [`VendorHal::cleanup`].
///
/// The vendor may invoke it from any thread, typically from the event loop
/// thread once teardown has finished.
pub type CleanupHandler = Box<dyn FnOnce(WifiHandle) + Send>;

/// Factory function type for creating vendor instances.
///
/// Receives the vendor-specific TOML table from `[vendor_config.<name>]`,
/// if present.
pub type VendorFactory =
    fn(Option<&toml::Value>) -> Result<std::sync::Arc<dyn VendorHal>, WifiError>;

/// Function table exposed by a vendor Wi-Fi HAL library.
///
/// The lifecycle core drives a vendor through this trait. Every call is
/// blocking from the caller's point of view.
///
/// # Lifecycle
///
/// 1. `initialize()` - Called once per session, returns the session handle
/// 2. `event_loop()` - Called on a dedicated thread, blocks for the session
/// 3. `cleanup()` - Requests teardown; `event_loop()` returns afterwards
///
/// # Threading
///
/// | Operation | Caller |
/// |-----------|--------|
/// | `event_loop()` | event loop worker thread |
/// | everything else | control thread |
pub trait VendorHal: Send + Sync {
    /// Returns the vendor backend's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the vendor backend's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the library and return a session handle.
    ///
    /// # Errors
    /// Returns the vendor status code if initialization fails.
    fn initialize(&self) -> Result<WifiHandle, LegacyError>;

    /// Submit the teardown command for `handle`.
    ///
    /// Returns once the command is submitted. The library finishes teardown
    /// asynchronously, makes `event_loop()` return, and calls `on_complete`.
    fn cleanup(&self, handle: WifiHandle, on_complete: CleanupHandler);

    /// Process vendor events until teardown completes.
    ///
    /// Blocks for the whole session.
    fn event_loop(&self, handle: WifiHandle);

    /// Enumerate the interfaces known to the library.
    ///
    /// # Errors
    /// Returns the vendor status code if enumeration fails.
    fn get_ifaces(&self, handle: WifiHandle) -> Result<Vec<IfaceHandle>, LegacyError>;

    /// Query the name of one interface (e.g., "wlan0").
    ///
    /// # Errors
    /// Returns the vendor status code if the query fails.
    fn get_iface_name(&self, iface: IfaceHandle) -> Result<String, LegacyError>;

    /// Write the driver version into `buffer` as a NUL-terminated string.
    ///
    /// # Errors
    /// Returns the vendor status code if the query fails.
    fn get_driver_version(&self, iface: IfaceHandle, buffer: &mut [u8])
    -> Result<(), LegacyError>;

    /// Write the firmware version into `buffer` as a NUL-terminated string.
    ///
    /// # Errors
    /// Returns the vendor status code if the query fails.
    fn get_firmware_version(
        &self,
        iface: IfaceHandle,
        buffer: &mut [u8],
    ) -> Result<(), LegacyError>;
}

/// Copy `value` into a bounded C buffer, truncating and NUL-terminating.
///
/// Returns the number of bytes copied, excluding the terminator.
pub fn write_c_buffer(buffer: &mut [u8], value: &str) -> usize {
    let Some(capacity) = buffer.len().checked_sub(1) else {
        return 0;
    };
    let len = value.len().min(capacity);
    buffer[..len].copy_from_slice(&value.as_bytes()[..len]);
    buffer[len] = 0;
    len
}

/// Read a NUL-terminated string out of a bounded C buffer.
///
/// A buffer without terminator is read in full. Invalid UTF-8 is replaced.
pub fn read_c_buffer(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).into_owned()
}
