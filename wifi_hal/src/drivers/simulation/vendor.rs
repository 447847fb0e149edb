//! Simulated vendor library.
//!
//! The `SimulatedVendor` implements the `VendorHal` trait. Its event loop
//! parks on a condition variable until `cleanup` is requested, then runs
//! the cleanup completion handler on the event loop thread, the way vendor
//! libraries report teardown.

use super::config::{SimulatedIface, SimulationConfig};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, info, warn};
use wifi_common::hal::vendor::{
    CleanupHandler, IfaceHandle, LegacyError, VendorHal, WifiHandle, write_c_buffer,
};

/// Snapshot of how often each vendor entry point was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VendorCallCounts {
    /// `initialize` calls
    pub initialize: usize,
    /// `cleanup` calls
    pub cleanup: usize,
    /// `event_loop` entries
    pub event_loop: usize,
    /// `get_ifaces` calls
    pub get_ifaces: usize,
    /// `get_iface_name` calls
    pub get_iface_name: usize,
    /// `get_driver_version` calls
    pub get_driver_version: usize,
    /// `get_firmware_version` calls
    pub get_firmware_version: usize,
}

#[derive(Debug, Default)]
struct CallCounters {
    initialize: AtomicUsize,
    cleanup: AtomicUsize,
    event_loop: AtomicUsize,
    get_ifaces: AtomicUsize,
    get_iface_name: AtomicUsize,
    get_driver_version: AtomicUsize,
    get_firmware_version: AtomicUsize,
}

impl CallCounters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> VendorCallCounts {
        VendorCallCounts {
            initialize: self.initialize.load(Ordering::SeqCst),
            cleanup: self.cleanup.load(Ordering::SeqCst),
            event_loop: self.event_loop.load(Ordering::SeqCst),
            get_ifaces: self.get_ifaces.load(Ordering::SeqCst),
            get_iface_name: self.get_iface_name.load(Ordering::SeqCst),
            get_driver_version: self.get_driver_version.load(Ordering::SeqCst),
            get_firmware_version: self.get_firmware_version.load(Ordering::SeqCst),
        }
    }
}

/// Event loop control block, guarded by `SimulatedVendor::control`.
#[derive(Default)]
struct LoopControl {
    /// `cleanup` was called for the current session
    cleanup_requested: bool,
    /// Keep the loop alive after cleanup until released
    exit_held: bool,
    /// Leave the loop without a cleanup request
    terminate: bool,
    /// A thread is inside `event_loop`
    in_loop: bool,
    /// Handler passed to the last `cleanup` call
    on_cleanup_complete: Option<CleanupHandler>,
}

/// Simulation vendor implementing the `VendorHal` trait.
pub struct SimulatedVendor {
    config: SimulationConfig,
    next_handle: AtomicU64,
    control: Mutex<LoopControl>,
    wake: Condvar,
    calls: CallCounters,
}

impl SimulatedVendor {
    /// Create a simulated vendor library.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            next_handle: AtomicU64::new(1),
            control: Mutex::new(LoopControl::default()),
            wake: Condvar::new(),
            calls: CallCounters::default(),
        }
    }

    /// Keep the event loop running after cleanup until
    /// [`release_event_loop_exit`](Self::release_event_loop_exit).
    pub fn hold_event_loop_exit(&self) {
        self.control.lock().exit_held = true;
    }

    /// Let a held event loop finish its teardown.
    pub fn release_event_loop_exit(&self) {
        self.control.lock().exit_held = false;
        self.wake.notify_all();
    }

    /// Make the event loop return without a cleanup request.
    pub fn terminate_event_loop(&self) {
        self.control.lock().terminate = true;
        self.wake.notify_all();
    }

    /// Whether a thread is currently inside `event_loop`.
    pub fn is_in_event_loop(&self) -> bool {
        self.control.lock().in_loop
    }

    /// Call counts per entry point.
    pub fn calls(&self) -> VendorCallCounts {
        self.calls.snapshot()
    }

    fn iface_config(&self, iface: IfaceHandle) -> Result<&SimulatedIface, LegacyError> {
        usize::try_from(iface.as_raw())
            .ok()
            .and_then(|raw| raw.checked_sub(1))
            .and_then(|idx| self.config.interfaces.get(idx))
            .ok_or(LegacyError::InvalidArgs)
    }
}

impl VendorHal for SimulatedVendor {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn initialize(&self) -> Result<WifiHandle, LegacyError> {
        CallCounters::bump(&self.calls.initialize);
        if let Some(err) = self.config.init_error {
            warn!("Simulated initialize failing with {}", err);
            return Err(err);
        }

        let mut control = self.control.lock();
        control.cleanup_requested = false;
        control.terminate = false;
        control.on_cleanup_complete = None;
        drop(control);

        let handle = WifiHandle::from_raw(self.next_handle.fetch_add(1, Ordering::SeqCst));
        info!(
            "Simulated vendor initialized {} with {} interfaces",
            handle,
            self.config.interfaces.len()
        );
        Ok(handle)
    }

    fn cleanup(&self, handle: WifiHandle, on_complete: CleanupHandler) {
        CallCounters::bump(&self.calls.cleanup);
        debug!("Simulated cleanup requested for {}", handle);
        let mut control = self.control.lock();
        control.cleanup_requested = true;
        control.on_cleanup_complete = Some(on_complete);
        drop(control);
        self.wake.notify_all();
    }

    fn event_loop(&self, handle: WifiHandle) {
        CallCounters::bump(&self.calls.event_loop);
        let mut control = self.control.lock();
        control.in_loop = true;
        debug!("Simulated event loop running for {}", handle);

        loop {
            if control.terminate {
                warn!("Simulated event loop for {} terminated without cleanup", handle);
                break;
            }
            if control.cleanup_requested && !control.exit_held {
                break;
            }
            self.wake.wait(&mut control);
        }

        control.in_loop = false;
        let on_complete = control.on_cleanup_complete.take();
        drop(control);

        if let Some(done) = on_complete {
            done(handle);
        }
        debug!("Simulated event loop for {} returned", handle);
    }

    fn get_ifaces(&self, _handle: WifiHandle) -> Result<Vec<IfaceHandle>, LegacyError> {
        CallCounters::bump(&self.calls.get_ifaces);
        if let Some(err) = self.config.enumeration_error {
            return Err(err);
        }
        Ok((1..=self.config.interfaces.len() as u64)
            .map(IfaceHandle::from_raw)
            .collect())
    }

    fn get_iface_name(&self, iface: IfaceHandle) -> Result<String, LegacyError> {
        CallCounters::bump(&self.calls.get_iface_name);
        let iface = self.iface_config(iface)?;
        match iface.name_error {
            Some(err) => Err(err),
            None => Ok(iface.name.clone()),
        }
    }

    fn get_driver_version(
        &self,
        iface: IfaceHandle,
        buffer: &mut [u8],
    ) -> Result<(), LegacyError> {
        CallCounters::bump(&self.calls.get_driver_version);
        self.iface_config(iface)?;
        if let Some(err) = self.config.driver_version_error {
            return Err(err);
        }
        write_c_buffer(buffer, &self.config.driver_version);
        Ok(())
    }

    fn get_firmware_version(
        &self,
        iface: IfaceHandle,
        buffer: &mut [u8],
    ) -> Result<(), LegacyError> {
        CallCounters::bump(&self.calls.get_firmware_version);
        self.iface_config(iface)?;
        if let Some(err) = self.config.firmware_version_error {
            return Err(err);
        }
        write_c_buffer(buffer, &self.config.firmware_version);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::Duration;
    use wifi_common::hal::vendor::read_c_buffer;

    #[test]
    fn test_event_loop_returns_after_cleanup() {
        let vendor = Arc::new(SimulatedVendor::new(SimulationConfig::default()));
        let handle = vendor.initialize().unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        let worker = {
            let vendor = Arc::clone(&vendor);
            std::thread::spawn(move || vendor.event_loop(handle))
        };

        vendor.cleanup(
            handle,
            Box::new(move |h| {
                done_tx.send(h).unwrap();
            }),
        );
        worker.join().unwrap();

        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), handle);
        assert!(!vendor.is_in_event_loop());
        let calls = vendor.calls();
        assert_eq!(calls.initialize, 1);
        assert_eq!(calls.cleanup, 1);
        assert_eq!(calls.event_loop, 1);
    }

    #[test]
    fn test_held_exit_waits_for_release() {
        let vendor = Arc::new(SimulatedVendor::new(SimulationConfig::default()));
        let handle = vendor.initialize().unwrap();
        vendor.hold_event_loop_exit();

        let worker = {
            let vendor = Arc::clone(&vendor);
            std::thread::spawn(move || vendor.event_loop(handle))
        };
        vendor.cleanup(handle, Box::new(|_| {}));

        std::thread::sleep(Duration::from_millis(50));
        assert!(!worker.is_finished());

        vendor.release_event_loop_exit();
        worker.join().unwrap();
    }

    #[test]
    fn test_terminate_leaves_loop_without_cleanup() {
        let vendor = Arc::new(SimulatedVendor::new(SimulationConfig::default()));
        let handle = vendor.initialize().unwrap();
        let worker = {
            let vendor = Arc::clone(&vendor);
            std::thread::spawn(move || vendor.event_loop(handle))
        };
        vendor.terminate_event_loop();
        worker.join().unwrap();
        assert_eq!(vendor.calls().cleanup, 0);
    }

    #[test]
    fn test_initialize_issues_fresh_handles() {
        let vendor = SimulatedVendor::new(SimulationConfig::default());
        let a = vendor.initialize().unwrap();
        let b = vendor.initialize().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_iface_queries() {
        let vendor = SimulatedVendor::new(SimulationConfig {
            interfaces: vec![
                SimulatedIface::failing("p2p0", LegacyError::Busy),
                SimulatedIface::new("wlan0"),
            ],
            firmware_version_error: Some(LegacyError::NotSupported),
            driver_version: "drv 3.1".to_string(),
            ..SimulationConfig::default()
        });
        let handle = vendor.initialize().unwrap();
        let ifaces = vendor.get_ifaces(handle).unwrap();
        assert_eq!(ifaces.len(), 2);
        assert_eq!(vendor.get_iface_name(ifaces[0]), Err(LegacyError::Busy));
        assert_eq!(vendor.get_iface_name(ifaces[1]).unwrap(), "wlan0");
        assert_eq!(
            vendor.get_iface_name(IfaceHandle::from_raw(99)),
            Err(LegacyError::InvalidArgs)
        );

        let mut buf = [0u8; 32];
        vendor.get_driver_version(ifaces[1], &mut buf).unwrap();
        assert_eq!(read_c_buffer(&buf), "drv 3.1");
        assert_eq!(
            vendor.get_firmware_version(ifaces[1], &mut buf),
            Err(LegacyError::NotSupported)
        );
    }
}
