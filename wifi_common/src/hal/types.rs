//! Lifecycle and chip types.
//!
//! This module defines the data exchanged between the lifecycle core and
//! its subscribers:
//! - `RunState` - Session state
//! - `CommandId` - Caller-chosen id echoed in lifecycle callbacks
//! - `FailureReason` / `CommandFailureReason` - Start failure details
//! - `ChipDebugInfo` - Driver and firmware descriptions
//! - `ChipMode` - Chip mode descriptor

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hal::vendor::LegacyError;

/// Session state of the HAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// No vendor session exists.
    #[default]
    Stopped,
    /// Vendor session initialized and event loop running.
    Started,
    /// Teardown submitted, waiting for cleanup and event loop exit.
    Stopping,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stopped => "STOPPED",
            Self::Started => "STARTED",
            Self::Stopping => "STOPPING",
        };
        f.write_str(s)
    }
}

/// Identifier of a `start`/`stop` command, echoed in its callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CommandId(pub u32);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd#{}", self.0)
    }
}

/// Failure category reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandFailureReason {
    /// Unclassified failure
    Unknown,
    /// HAL or resource not available right now
    NotAvailable,
    /// Operation not supported
    NotSupported,
    /// Invalid arguments
    InvalidArgs,
}

/// Failure delivered with `on_start_failure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    /// Failure category
    pub reason: CommandFailureReason,
    /// Human-readable description
    pub description: String,
}

impl FailureReason {
    /// Create a failure reason.
    pub fn new(reason: CommandFailureReason, description: impl Into<String>) -> Self {
        Self {
            reason,
            description: description.into(),
        }
    }

    /// Translate a vendor status code into a failure reason.
    ///
    /// Codes without a dedicated category are reported as `Unknown`; the
    /// transient ones keep `description` with the cause appended.
    pub fn from_legacy(error: LegacyError, description: &str) -> Self {
        use CommandFailureReason as R;
        match error {
            LegacyError::Uninitialized | LegacyError::NotAvailable => {
                Self::new(R::NotAvailable, description)
            }
            LegacyError::NotSupported => Self::new(R::NotSupported, description),
            LegacyError::InvalidArgs | LegacyError::InvalidRequestId => {
                Self::new(R::InvalidArgs, description)
            }
            LegacyError::TimedOut => Self::new(R::Unknown, format!("{description}, timed out")),
            LegacyError::TooManyRequests => {
                Self::new(R::Unknown, format!("{description}, too many requests"))
            }
            LegacyError::OutOfMemory => {
                Self::new(R::Unknown, format!("{description}, out of memory"))
            }
            LegacyError::Unknown | LegacyError::Busy => Self::new(R::Unknown, "unknown"),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.reason, self.description)
    }
}

/// Driver and firmware descriptions of a chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipDebugInfo {
    /// Driver version string
    pub driver_description: String,
    /// Firmware version string
    pub firmware_description: String,
}

/// One operating mode a chip can be configured into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipMode {
    /// Mode identifier passed to `configure_chip`
    pub id: u32,
}
