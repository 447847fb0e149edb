//! Owned vendor session handle.

use tracing::debug;
use wifi_common::error::WifiError;
use wifi_common::hal::vendor::{LegacyError, VendorHal, WifiHandle};

/// Exclusive owner of the `WifiHandle` issued by vendor initialization.
///
/// Empty before `acquire` and after `release`; an empty session refuses to
/// hand out its handle, so a released handle cannot reach the vendor again.
#[derive(Debug, Default)]
pub struct HalSession {
    handle: Option<WifiHandle>,
}

impl HalSession {
    /// An empty session.
    pub const fn empty() -> Self {
        Self { handle: None }
    }

    /// Initialize the vendor library and take ownership of its handle.
    ///
    /// # Errors
    /// Returns the vendor status code if initialization fails.
    pub fn acquire(vendor: &dyn VendorHal) -> Result<Self, LegacyError> {
        let handle = vendor.initialize()?;
        debug!("Acquired {}", handle);
        Ok(Self {
            handle: Some(handle),
        })
    }

    /// The live handle.
    ///
    /// # Errors
    /// Returns `WifiError::HandleReleased` if the session is empty.
    pub fn handle(&self) -> Result<WifiHandle, WifiError> {
        self.handle.ok_or(WifiError::HandleReleased)
    }

    /// Give up the handle; the session is empty afterwards.
    pub fn release(&mut self) -> Option<WifiHandle> {
        let handle = self.handle.take();
        if let Some(h) = handle {
            debug!("Released {}", h);
        }
        handle
    }

    /// Whether the session holds a handle.
    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }
}
