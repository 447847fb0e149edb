//! Error types for control-plane operations.
//!
//! Vendor failures with a recovery path are delivered through callbacks and
//! never appear here; these errors describe the plumbing around the core.

use thiserror::Error;

use crate::hal::types::RunState;

/// Error types for HAL control-plane operations.
#[derive(Debug, Clone, Error)]
pub enum WifiError {
    /// The control thread has exited; no more tasks can run.
    #[error("Control thread is not running")]
    ControlThreadGone,

    /// A synchronous query was issued from the control thread itself.
    #[error("Synchronous call issued from the control thread")]
    ReentrantCall,

    /// The vendor handle was used after cleanup.
    #[error("Vendor handle already released")]
    HandleReleased,

    /// Vendor backend not found
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    /// Vendor backend could not be created
    #[error("Vendor initialization failed: {0}")]
    VendorInit(String),

    /// OS thread could not be spawned
    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(String),
}

/// Unrecoverable violation of the session invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// The vendor event loop returned although no teardown was in progress.
    #[error("HAL event loop terminated, but HAL was not stopping (state: {state})")]
    EventLoopTerminated {
        /// Session state when the event loop returned
        state: RunState,
    },
}
