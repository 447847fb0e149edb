//! Chip proxy for one resolved radio interface.
//!
//! A `ChipLifecycleProxy` lives on the control thread, owned by the
//! controller for one session. It holds a weak back-reference to the vendor
//! library that `invalidate` clears; every operation on an invalidated proxy
//! is a no-op.

use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};
use wifi_common::consts::{DEBUG_INFO_BUFFER_LEN, UNKNOWN_DESCRIPTION};
use wifi_common::hal::callback::WifiChipEventCallback;
use wifi_common::hal::types::{ChipDebugInfo, ChipMode};
use wifi_common::hal::vendor::{IfaceHandle, LegacyError, VendorHal, read_c_buffer};

use crate::callbacks::CallbackRegistry;

/// Identity of one chip proxy; never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipId(pub u64);

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip#{}", self.0)
    }
}

/// Control-thread side of a chip.
pub struct ChipLifecycleProxy {
    id: ChipId,
    vendor: Option<Weak<dyn VendorHal>>,
    iface: IfaceHandle,
    callbacks: CallbackRegistry<dyn WifiChipEventCallback>,
}

impl ChipLifecycleProxy {
    /// Bind a proxy to `iface` of `vendor`.
    pub fn new(id: ChipId, vendor: &Arc<dyn VendorHal>, iface: IfaceHandle) -> Self {
        debug!("Created {} for {}", id, iface);
        Self {
            id,
            vendor: Some(Arc::downgrade(vendor)),
            iface,
            callbacks: CallbackRegistry::new(),
        }
    }

    /// Proxy identity.
    pub fn id(&self) -> ChipId {
        self.id
    }

    /// Drop the back-reference and every subscriber.
    pub fn invalidate(&mut self) {
        if self.vendor.take().is_some() {
            info!("Invalidated {}", self.id);
        }
        self.callbacks.clear();
    }

    /// Whether the proxy still accepts operations.
    pub fn is_valid(&self) -> bool {
        self.vendor.is_some()
    }

    /// Add a chip subscriber. Returns `false` if invalidated or already present.
    pub fn register_event_callback(&mut self, callback: Arc<dyn WifiChipEventCallback>) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.callbacks.register(callback)
    }

    /// Remove a chip subscriber. Returns `false` if invalidated or not present.
    pub fn unregister_event_callback(&mut self, callback: &Arc<dyn WifiChipEventCallback>) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.callbacks.unregister(callback)
    }

    /// Query driver and firmware versions and broadcast them.
    ///
    /// A field whose query fails is reported as `"<unknown>"`. Returns the
    /// broadcast record, or `None` if the proxy is invalidated.
    pub fn request_debug_info(&self) -> Option<ChipDebugInfo> {
        let vendor = self.vendor.as_ref()?.upgrade()?;

        let driver_description = query_version(|buf| vendor.get_driver_version(self.iface, buf))
            .unwrap_or_else(|e| {
                warn!("Failed to get driver version: {}", e);
                UNKNOWN_DESCRIPTION.to_string()
            });
        let firmware_description =
            query_version(|buf| vendor.get_firmware_version(self.iface, buf)).unwrap_or_else(|e| {
                warn!("Failed to get firmware version: {}", e);
                UNKNOWN_DESCRIPTION.to_string()
            });

        let info = ChipDebugInfo {
            driver_description,
            firmware_description,
        };
        self.callbacks.broadcast("on_chip_debug_info_available", |cb| {
            cb.on_chip_debug_info_available(&info)
        });
        Some(info)
    }

    /// Supported chip modes. None are advertised.
    pub fn get_available_modes(&self) -> Vec<ChipMode> {
        Vec::new()
    }

    /// Switch to mode `mode_id`. Mode switching is not supported; this only logs.
    pub fn configure_chip(&self, mode_id: u32) {
        if self.is_valid() {
            debug!("{}: ignoring configure_chip({})", self.id, mode_id);
        }
    }

    /// Current mode id.
    pub fn get_mode(&self) -> u32 {
        0
    }
}

fn query_version<F>(query: F) -> Result<String, LegacyError>
where
    F: FnOnce(&mut [u8]) -> Result<(), LegacyError>,
{
    let mut buffer = [0u8; DEBUG_INFO_BUFFER_LEN];
    query(&mut buffer)?;
    Ok(read_c_buffer(&buffer))
}
