//! Two-condition shutdown barrier.
//!
//! `stop()` arms the barrier. It resolves once the vendor cleanup command
//! has returned and the event loop worker has exited, in either order.

/// Completion notice consumed by the barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownEvent {
    /// `VendorHal::cleanup` returned on the control thread.
    CleanupCommandComplete,
    /// The event loop worker returned from `VendorHal::event_loop`.
    EventLoopExited,
}

/// Pending teardown conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownBarrier {
    cleanup_command_pending: bool,
    event_loop_running: bool,
}

impl ShutdownBarrier {
    /// Mark both conditions pending.
    pub fn arm(&mut self) {
        self.cleanup_command_pending = true;
        self.event_loop_running = true;
    }

    /// Clear the condition matching `event`.
    pub fn observe(&mut self, event: TeardownEvent) {
        match event {
            TeardownEvent::CleanupCommandComplete => self.cleanup_command_pending = false,
            TeardownEvent::EventLoopExited => self.event_loop_running = false,
        }
    }

    /// Whether no condition is pending.
    pub fn is_resolved(&self) -> bool {
        !self.cleanup_command_pending && !self.event_loop_running
    }

    /// Whether the vendor cleanup command has not returned yet.
    pub fn cleanup_command_pending(&self) -> bool {
        self.cleanup_command_pending
    }

    /// Whether the event loop worker has not exited yet.
    pub fn event_loop_running(&self) -> bool {
        self.event_loop_running
    }
}
