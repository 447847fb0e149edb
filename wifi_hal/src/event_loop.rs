//! Event loop worker thread.
//!
//! One `EventLoopRunner` per started session. The worker blocks inside
//! `VendorHal::event_loop`; when that returns it samples the session's
//! teardown flag, reports the exit to the control thread through the
//! dispatcher and ends.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};
use wifi_common::error::WifiError;
use wifi_common::hal::vendor::{VendorHal, WifiHandle};

use crate::dispatcher::TaskDispatcher;

/// Name of the event loop worker thread.
pub const EVENT_LOOP_THREAD_NAME: &str = "wifi-hal-event-loop";

/// Owner of the event loop worker thread.
#[derive(Debug)]
pub struct EventLoopRunner {
    worker: Option<JoinHandle<()>>,
    /// Set by the control thread before it asks the vendor to clean up
    teardown_requested: Arc<AtomicBool>,
}

impl EventLoopRunner {
    /// Start the worker for session `handle`.
    ///
    /// `on_exit` runs on the control thread after the vendor loop returned.
    /// Its flag tells whether [`request_teardown`](Self::request_teardown)
    /// had been called by the time the loop returned.
    ///
    /// # Errors
    /// Returns `WifiError::ThreadSpawn` if the OS thread cannot be created.
    pub fn spawn<C, F>(
        vendor: Arc<dyn VendorHal>,
        handle: WifiHandle,
        dispatcher: TaskDispatcher<C>,
        on_exit: F,
    ) -> Result<Self, WifiError>
    where
        C: 'static,
        F: FnOnce(&mut C, bool) -> ControlFlow<()> + Send + 'static,
    {
        let teardown_requested = Arc::new(AtomicBool::new(false));
        let requested = Arc::clone(&teardown_requested);
        let worker = thread::Builder::new()
            .name(EVENT_LOOP_THREAD_NAME.to_string())
            .spawn(move || {
                info!("Starting event loop for {}", handle);
                vendor.event_loop(handle);
                let expected = requested.load(Ordering::SeqCst);
                if expected {
                    info!("Event loop for {} returned", handle);
                } else {
                    warn!("Event loop for {} returned without a teardown request", handle);
                }
                if let Err(e) = dispatcher.post_flow(move |ctx: &mut C| on_exit(ctx, expected)) {
                    warn!("Event loop exit for {} not delivered: {}", handle, e);
                }
            })
            .map_err(|e| WifiError::ThreadSpawn(e.to_string()))?;

        Ok(Self {
            worker: Some(worker),
            teardown_requested,
        })
    }

    /// Mark the coming loop exit as expected.
    ///
    /// Must be called before the vendor is asked to clean up.
    pub fn request_teardown(&self) {
        self.teardown_requested.store(true, Ordering::SeqCst);
    }

    /// Release the worker thread without joining it.
    pub fn detach(mut self) {
        if self.worker.take().is_some() {
            debug!("Detached event loop worker");
        }
    }
}
