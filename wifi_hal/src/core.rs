//! HAL lifecycle controller.
//!
//! The `HalLifecycleController` is the session state machine. It lives on
//! the control thread (see [`crate::dispatcher`]) and is only ever touched
//! from there, so none of its state needs a lock.
//!
//! ```text
//!            start ok                   stop
//!   STOPPED ─────────► STARTED ─────────────────► STOPPING
//!      ▲                                              │
//!      └──── cleanup returned + event loop exited ────┘
//! ```

use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use wifi_common::error::FatalError;
use wifi_common::hal::callback::WifiEventCallback;
use wifi_common::hal::types::{CommandFailureReason, CommandId, FailureReason, RunState};
use wifi_common::hal::vendor::{IfaceHandle, VendorHal, WifiHandle};

use crate::barrier::{ShutdownBarrier, TeardownEvent};
use crate::callbacks::CallbackRegistry;
use crate::chip::{ChipId, ChipLifecycleProxy};
use crate::dispatcher::TaskDispatcher;
use crate::event_loop::EventLoopRunner;
use crate::iface::InterfaceResolver;
use crate::session::HalSession;

/// Invoked on the control thread when the session invariants are violated.
///
/// The control loop stops processing tasks once the handler returns.
pub type FatalHandler = Arc<dyn Fn(&FatalError) + Send + Sync>;

/// Fatal handler that aborts the process.
pub fn abort_on_fatal() -> FatalHandler {
    Arc::new(|err: &FatalError| {
        error!("Aborting: {}", err);
        std::process::abort();
    })
}

/// HAL session state machine.
pub struct HalLifecycleController {
    /// Vendor library
    vendor: Arc<dyn VendorHal>,
    /// Interface bound to the chip on start
    interface_name: String,
    /// Handle to our own control thread, passed to the event loop worker
    dispatcher: TaskDispatcher<HalLifecycleController>,
    /// Session state
    state: RunState,
    /// Vendor handle of the current session
    session: HalSession,
    /// Event loop worker of the current session
    event_loop: Option<EventLoopRunner>,
    /// Chip of the current session, if the interface was found
    chip: Option<ChipLifecycleProxy>,
    /// Id for the next chip proxy
    next_chip_id: u64,
    /// Lifecycle subscribers
    callbacks: CallbackRegistry<dyn WifiEventCallback>,
    /// Teardown conditions of the running stop
    barrier: ShutdownBarrier,
    /// Command that began the running stop
    pending_stop: Option<CommandId>,
    /// Fatal error sink
    on_fatal: FatalHandler,
}

impl HalLifecycleController {
    /// Create a stopped controller.
    ///
    /// Must be built on the control thread owning `dispatcher`.
    pub fn new(
        vendor: Arc<dyn VendorHal>,
        interface_name: impl Into<String>,
        dispatcher: TaskDispatcher<HalLifecycleController>,
        on_fatal: FatalHandler,
    ) -> Self {
        let interface_name = interface_name.into();
        info!(
            "HAL controller created for vendor {} v{}, interface '{}'",
            vendor.name(),
            vendor.version(),
            interface_name
        );
        Self {
            vendor,
            interface_name,
            dispatcher,
            state: RunState::Stopped,
            session: HalSession::empty(),
            event_loop: None,
            chip: None,
            next_chip_id: 1,
            callbacks: CallbackRegistry::new(),
            barrier: ShutdownBarrier::default(),
            pending_stop: None,
            on_fatal,
        }
    }

    /// Session state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether a session exists (started or stopping).
    pub fn is_started(&self) -> bool {
        self.state != RunState::Stopped
    }

    /// Teardown conditions still pending.
    pub fn barrier(&self) -> ShutdownBarrier {
        self.barrier
    }

    /// Add a lifecycle subscriber. Returns `false` if already present.
    pub fn register_event_callback(&mut self, callback: Arc<dyn WifiEventCallback>) -> bool {
        self.callbacks.register(callback)
    }

    /// Remove a lifecycle subscriber. Returns `false` if not present.
    pub fn unregister_event_callback(&mut self, callback: &Arc<dyn WifiEventCallback>) -> bool {
        self.callbacks.unregister(callback)
    }

    /// Start the session.
    ///
    /// The outcome is broadcast: `on_start` if started (or already running),
    /// `on_start_failure` otherwise.
    pub fn start(&mut self, cmd: CommandId) {
        match self.state {
            RunState::Started => {
                debug!("start {}: already started", cmd);
                self.broadcast_start(cmd);
            }
            RunState::Stopping => {
                warn!("start {}: HAL is stopping", cmd);
                let reason = FailureReason::new(CommandFailureReason::NotAvailable, "HAL is stopping");
                self.broadcast_start_failure(cmd, &reason);
            }
            RunState::Stopped => match self.begin_session() {
                Ok(()) => {
                    info!("HAL started ({})", cmd);
                    self.broadcast_start(cmd);
                }
                Err(reason) => self.broadcast_start_failure(cmd, &reason),
            },
        }
    }

    /// Stop the session.
    ///
    /// `on_stop` is broadcast once both the vendor cleanup command has
    /// returned and the event loop has exited. A stop while already
    /// stopping is absorbed; the eventual `on_stop` carries the id of the
    /// stop that began the teardown.
    pub fn stop(&mut self, cmd: CommandId) {
        match self.state {
            RunState::Stopped => {
                debug!("stop {}: already stopped", cmd);
                self.broadcast_stop(cmd);
            }
            RunState::Stopping => {
                debug!("stop {}: teardown already in progress", cmd);
            }
            RunState::Started => {
                let handle = match self.session.handle() {
                    Ok(handle) => handle,
                    Err(e) => {
                        error!("stop {}: {}", cmd, e);
                        return;
                    }
                };

                info!("Cleaning up HAL ({})", cmd);
                self.pending_stop = Some(cmd);
                self.barrier.arm();
                self.state = RunState::Stopping;
                if let Some(mut chip) = self.chip.take() {
                    chip.invalidate();
                }
                if let Some(runner) = &self.event_loop {
                    runner.request_teardown();
                }

                self.vendor.cleanup(
                    handle,
                    Box::new(|h| debug!("Vendor cleanup handler ran for {}", h)),
                );
                debug!("HAL cleanup command complete");
                self.barrier.observe(TeardownEvent::CleanupCommandComplete);
                self.finish();
            }
        }
    }

    /// Handle the event loop worker's exit notice.
    ///
    /// `teardown_requested` is what the worker saw when the vendor loop
    /// returned. An exit no stop asked for is fatal even if a stop was
    /// processed since: the fatal handler runs and the control loop ends.
    pub fn on_event_loop_exited(&mut self, teardown_requested: bool) -> ControlFlow<()> {
        if !teardown_requested || self.state != RunState::Stopping {
            // Unrequested means no stop had run yet, so the session was STARTED.
            let state = if teardown_requested {
                self.state
            } else {
                RunState::Started
            };
            let err = FatalError::EventLoopTerminated { state };
            error!("{}", err);
            (self.on_fatal)(&err);
            return ControlFlow::Break(());
        }

        debug!("HAL event loop terminated");
        if let Some(runner) = self.event_loop.take() {
            runner.detach();
        }
        self.barrier.observe(TeardownEvent::EventLoopExited);
        self.finish();
        ControlFlow::Continue(())
    }

    /// Id of the live chip, if any.
    pub fn current_chip_id(&self) -> Option<ChipId> {
        self.chip.as_ref().map(ChipLifecycleProxy::id)
    }

    /// The live chip, if it is the one named by `id`.
    pub fn chip(&self, id: ChipId) -> Option<&ChipLifecycleProxy> {
        self.chip.as_ref().filter(|chip| chip.id() == id && chip.is_valid())
    }

    /// Mutable access to the live chip, if it is the one named by `id`.
    pub fn chip_mut(&mut self, id: ChipId) -> Option<&mut ChipLifecycleProxy> {
        self.chip.as_mut().filter(|chip| chip.id() == id && chip.is_valid())
    }

    /// Initialize the vendor, spawn the event loop and bind the chip.
    fn begin_session(&mut self) -> Result<(), FailureReason> {
        info!("Initializing HAL");
        let session = HalSession::acquire(self.vendor.as_ref()).map_err(|e| {
            error!("Failed to initialize HAL: {}", e);
            FailureReason::from_legacy(e, "Failed to initialize HAL")
        })?;
        let handle = session
            .handle()
            .map_err(|e| FailureReason::new(CommandFailureReason::Unknown, e.to_string()))?;

        let runner = EventLoopRunner::spawn(
            Arc::clone(&self.vendor),
            handle,
            self.dispatcher.clone(),
            |ctrl: &mut HalLifecycleController, requested| ctrl.on_event_loop_exited(requested),
        )
        .map_err(|e| {
            error!("Failed to start event loop: {}", e);
            self.abandon_session(handle);
            FailureReason::new(CommandFailureReason::Unknown, e.to_string())
        })?;

        self.session = session;
        self.event_loop = Some(runner);
        self.state = RunState::Started;

        match InterfaceResolver::new(self.vendor.as_ref()).resolve(handle, &self.interface_name) {
            Some(iface) => self.bind_chip(iface),
            None => warn!(
                "Interface '{}' not found, running without a chip",
                self.interface_name
            ),
        }
        Ok(())
    }

    /// Release a session whose event loop never started.
    fn abandon_session(&self, handle: WifiHandle) {
        self.vendor.cleanup(
            handle,
            Box::new(|h| debug!("Vendor cleanup handler ran for {}", h)),
        );
    }

    fn bind_chip(&mut self, iface: IfaceHandle) {
        let id = ChipId(self.next_chip_id);
        self.next_chip_id += 1;
        self.chip = Some(ChipLifecycleProxy::new(id, &self.vendor, iface));
        info!("Bound {} to interface '{}'", id, self.interface_name);
    }

    /// Resolve the barrier if both teardown conditions cleared.
    fn finish(&mut self) {
        if self.state != RunState::Stopping {
            return;
        }
        if !self.barrier.is_resolved() {
            debug!(
                "Teardown pending (cleanup command: {}, event loop: {})",
                self.barrier.cleanup_command_pending(),
                self.barrier.event_loop_running()
            );
            return;
        }

        self.session.release();
        self.state = RunState::Stopped;
        info!("HAL cleanup complete");

        let cmd = self.pending_stop.take().unwrap_or_default();
        self.broadcast_stop(cmd);
    }

    fn broadcast_start(&self, cmd: CommandId) {
        self.callbacks.broadcast("on_start", |cb| cb.on_start(cmd));
    }

    fn broadcast_start_failure(&self, cmd: CommandId, reason: &FailureReason) {
        self.callbacks
            .broadcast("on_start_failure", |cb| cb.on_start_failure(cmd, reason));
    }

    fn broadcast_stop(&self, cmd: CommandId) {
        self.callbacks.broadcast("on_stop", |cb| cb.on_stop(cmd));
    }
}
