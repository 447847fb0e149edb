//! Interface lookup by name.

use tracing::{debug, warn};
use wifi_common::hal::vendor::{IfaceHandle, VendorHal, WifiHandle};

/// Finds the vendor interface handle carrying a given name.
pub struct InterfaceResolver<'a> {
    vendor: &'a dyn VendorHal,
}

impl<'a> InterfaceResolver<'a> {
    /// Create a resolver over a vendor library.
    pub fn new(vendor: &'a dyn VendorHal) -> Self {
        Self { vendor }
    }

    /// Return the first interface of `handle` whose name equals `name`.
    ///
    /// An interface whose name cannot be read is skipped. Failure to list
    /// the interfaces at all is reported as not found.
    pub fn resolve(&self, handle: WifiHandle, name: &str) -> Option<IfaceHandle> {
        let ifaces = match self.vendor.get_ifaces(handle) {
            Ok(ifaces) => ifaces,
            Err(e) => {
                warn!("Failed to enumerate interfaces of {}: {}", handle, e);
                return None;
            }
        };

        for iface in ifaces {
            match self.vendor.get_iface_name(iface) {
                Ok(found) if found == name => {
                    debug!("Resolved interface '{}' to {}", name, iface);
                    return Some(iface);
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to get name of {}: {}", iface, e),
            }
        }

        warn!("Interface '{}' not found", name);
        None
    }
}
