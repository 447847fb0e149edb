//! Public HAL facade.
//!
//! `WifiHal` owns the control thread and its `HalLifecycleController`.
//! Every method marshals onto the control thread: commands are posted and
//! report through callbacks, queries block until the control thread
//! answers. Queries issued from the control thread itself (e.g., from
//! inside a subscriber) return `WifiError::ReentrantCall`.

use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};
use wifi_common::consts::{DEFAULT_INTERFACE_NAME, HAL_SERVICE_NAME};
use wifi_common::error::WifiError;
use wifi_common::hal::callback::{WifiChipEventCallback, WifiEventCallback};
use wifi_common::hal::types::{ChipMode, CommandId, RunState};
use wifi_common::hal::vendor::VendorHal;

use crate::chip::ChipId;
use crate::core::{FatalHandler, HalLifecycleController, abort_on_fatal};
use crate::dispatcher::TaskDispatcher;

/// Options for [`WifiHal::spawn`].
#[derive(Clone)]
pub struct HalOptions {
    /// Interface bound to the chip on start
    pub interface_name: String,
    /// Sink for invariant violations; aborts the process by default
    pub fatal_handler: FatalHandler,
}

impl HalOptions {
    /// Options binding `interface_name`, with the aborting fatal handler.
    pub fn new(interface_name: impl Into<String>) -> Self {
        Self {
            interface_name: interface_name.into(),
            fatal_handler: abort_on_fatal(),
        }
    }

    /// Replace the fatal handler.
    pub fn with_fatal_handler(mut self, handler: FatalHandler) -> Self {
        self.fatal_handler = handler;
        self
    }
}

impl Default for HalOptions {
    fn default() -> Self {
        Self::new(DEFAULT_INTERFACE_NAME)
    }
}

impl fmt::Debug for HalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalOptions")
            .field("interface_name", &self.interface_name)
            .finish_non_exhaustive()
    }
}

/// Handle to a running HAL.
///
/// Dropping it stops the control thread; a live vendor session is not
/// cleaned up, call [`stop`](Self::stop) first.
pub struct WifiHal {
    dispatcher: TaskDispatcher<HalLifecycleController>,
    control: Option<JoinHandle<()>>,
}

impl WifiHal {
    /// Start the control thread with a stopped controller.
    ///
    /// # Errors
    /// Returns `WifiError::ThreadSpawn` if the control thread cannot be created.
    pub fn spawn(vendor: Arc<dyn VendorHal>, options: HalOptions) -> Result<Self, WifiError> {
        let HalOptions {
            interface_name,
            fatal_handler,
        } = options;
        let (dispatcher, control) = TaskDispatcher::spawn(HAL_SERVICE_NAME, move |d| {
            HalLifecycleController::new(vendor, interface_name, d, fatal_handler)
        })?;
        info!("HAL control thread running");
        Ok(Self {
            dispatcher,
            control: Some(control),
        })
    }

    /// Add a lifecycle subscriber.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn register_event_callback(
        &self,
        callback: Arc<dyn WifiEventCallback>,
    ) -> Result<(), WifiError> {
        self.dispatcher.post(move |ctrl| {
            if !ctrl.register_event_callback(callback) {
                debug!("Lifecycle subscriber already registered");
            }
        })
    }

    /// Remove a lifecycle subscriber.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn unregister_event_callback(
        &self,
        callback: &Arc<dyn WifiEventCallback>,
    ) -> Result<(), WifiError> {
        let callback = Arc::clone(callback);
        self.dispatcher.post(move |ctrl| {
            if !ctrl.unregister_event_callback(&callback) {
                debug!("Lifecycle subscriber was not registered");
            }
        })
    }

    /// Whether a session exists (started or stopping).
    ///
    /// # Errors
    /// - `WifiError::ReentrantCall` when called from the control thread
    /// - `WifiError::ControlThreadGone` if the control thread has exited
    pub fn is_started(&self) -> Result<bool, WifiError> {
        self.dispatcher.call(|ctrl| ctrl.is_started())
    }

    /// Session state.
    ///
    /// # Errors
    /// Same as [`is_started`](Self::is_started).
    pub fn state(&self) -> Result<RunState, WifiError> {
        self.dispatcher.call(|ctrl| ctrl.state())
    }

    /// Request a start; the outcome is delivered to lifecycle subscribers.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn start(&self, cmd: CommandId) -> Result<(), WifiError> {
        self.dispatcher.post(move |ctrl| ctrl.start(cmd))
    }

    /// Request a stop; completion is delivered to lifecycle subscribers.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn stop(&self, cmd: CommandId) -> Result<(), WifiError> {
        self.dispatcher.post(move |ctrl| ctrl.stop(cmd))
    }

    /// Run `f` on the control thread with the current chip, if any.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn get_chip<F>(&self, f: F) -> Result<(), WifiError>
    where
        F: FnOnce(Option<WifiChip>) + Send + 'static,
    {
        let dispatcher = self.dispatcher.clone();
        self.dispatcher.post(move |ctrl| {
            f(ctrl.current_chip_id().map(|id| WifiChip::new(id, dispatcher)));
        })
    }

    /// The current chip, if any.
    ///
    /// # Errors
    /// Same as [`is_started`](Self::is_started).
    pub fn chip(&self) -> Result<Option<WifiChip>, WifiError> {
        let dispatcher = self.dispatcher.clone();
        self.dispatcher
            .call(move |ctrl| ctrl.current_chip_id().map(|id| WifiChip::new(id, dispatcher)))
    }

    /// Stop the control thread and wait for it.
    ///
    /// Tasks queued before this call still run. Idempotent.
    ///
    /// # Errors
    /// Returns `WifiError::ReentrantCall` when called from the control thread.
    pub fn shutdown(&mut self) -> Result<(), WifiError> {
        if self.dispatcher.is_control_thread() {
            return Err(WifiError::ReentrantCall);
        }
        let Some(control) = self.control.take() else {
            return Ok(());
        };
        if self.dispatcher.shutdown().is_err() {
            debug!("Control thread already stopped");
        }
        if control.join().is_err() {
            warn!("Control thread panicked");
        }
        info!("HAL control thread stopped");
        Ok(())
    }
}

impl Drop for WifiHal {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("HAL not shut down on drop: {}", e);
        }
    }
}

/// Handle to one chip of a running HAL.
///
/// Names its chip by id; once that chip has been invalidated (the session
/// stopped) every operation is a no-op and queries return defaults.
#[derive(Clone)]
pub struct WifiChip {
    id: ChipId,
    dispatcher: TaskDispatcher<HalLifecycleController>,
}

impl WifiChip {
    fn new(id: ChipId, dispatcher: TaskDispatcher<HalLifecycleController>) -> Self {
        Self { id, dispatcher }
    }

    /// Chip identity.
    pub fn id(&self) -> ChipId {
        self.id
    }

    /// Whether the chip is still live.
    ///
    /// # Errors
    /// Same as [`WifiHal::is_started`].
    pub fn is_valid(&self) -> Result<bool, WifiError> {
        let id = self.id;
        self.dispatcher.call(move |ctrl| ctrl.chip(id).is_some())
    }

    /// Add a chip subscriber.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn register_event_callback(
        &self,
        callback: Arc<dyn WifiChipEventCallback>,
    ) -> Result<(), WifiError> {
        let id = self.id;
        self.dispatcher.post(move |ctrl| match ctrl.chip_mut(id) {
            Some(chip) => {
                chip.register_event_callback(callback);
            }
            None => debug!("{} is gone, subscriber not registered", id),
        })
    }

    /// Remove a chip subscriber.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn unregister_event_callback(
        &self,
        callback: &Arc<dyn WifiChipEventCallback>,
    ) -> Result<(), WifiError> {
        let id = self.id;
        let callback = Arc::clone(callback);
        self.dispatcher.post(move |ctrl| {
            if let Some(chip) = ctrl.chip_mut(id) {
                chip.unregister_event_callback(&callback);
            }
        })
    }

    /// Query driver and firmware versions; the result is delivered to chip
    /// subscribers.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn request_chip_debug_info(&self) -> Result<(), WifiError> {
        let id = self.id;
        self.dispatcher.post(move |ctrl| match ctrl.chip(id) {
            Some(chip) => {
                chip.request_debug_info();
            }
            None => debug!("{} is gone, debug info not requested", id),
        })
    }

    /// Supported chip modes.
    ///
    /// # Errors
    /// Same as [`WifiHal::is_started`].
    pub fn get_available_modes(&self) -> Result<Vec<ChipMode>, WifiError> {
        let id = self.id;
        self.dispatcher.call(move |ctrl| {
            ctrl.chip(id)
                .map(|chip| chip.get_available_modes())
                .unwrap_or_default()
        })
    }

    /// Switch the chip to mode `mode_id`.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control thread has exited.
    pub fn configure_chip(&self, mode_id: u32) -> Result<(), WifiError> {
        let id = self.id;
        self.dispatcher.post(move |ctrl| {
            if let Some(chip) = ctrl.chip(id) {
                chip.configure_chip(mode_id);
            }
        })
    }

    /// Current chip mode id.
    ///
    /// # Errors
    /// Same as [`WifiHal::is_started`].
    pub fn get_mode(&self) -> Result<u32, WifiError> {
        let id = self.id;
        self.dispatcher
            .call(move |ctrl| ctrl.chip(id).map(|chip| chip.get_mode()).unwrap_or_default())
    }
}

impl fmt::Debug for WifiChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiChip").field("id", &self.id).finish()
    }
}
