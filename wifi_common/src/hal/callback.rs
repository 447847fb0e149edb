//! Subscriber traits for lifecycle and chip events.
//!
//! Subscribers are registered as `Arc<dyn ...>` and identified by pointer,
//! so registering the same `Arc` twice yields a single subscription.

use thiserror::Error;

use crate::hal::types::{ChipDebugInfo, CommandId, FailureReason};

/// Error a subscriber returns when it could not take delivery.
#[derive(Debug, Clone, Error)]
pub enum CallbackError {
    /// The subscriber's peer is gone (e.g., a closed remote connection).
    #[error("Subscriber disconnected")]
    Disconnected,
}

/// Result of delivering one event to one subscriber.
pub type CallbackResult = Result<(), CallbackError>;

/// Subscriber for HAL lifecycle events.
pub trait WifiEventCallback: Send + Sync {
    /// The HAL is started (or was already started).
    fn on_start(&self, cmd_id: CommandId) -> CallbackResult;

    /// A start command could not be completed.
    fn on_start_failure(&self, cmd_id: CommandId, reason: &FailureReason) -> CallbackResult;

    /// The HAL is fully stopped.
    fn on_stop(&self, cmd_id: CommandId) -> CallbackResult;
}

/// Subscriber for chip events.
pub trait WifiChipEventCallback: Send + Sync {
    /// Result of a `request_chip_debug_info` call.
    fn on_chip_debug_info_available(&self, info: &ChipDebugInfo) -> CallbackResult;
}
