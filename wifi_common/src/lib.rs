//! Wi-Fi HAL Common Library
//!
//! This crate provides the types shared between the HAL lifecycle core and
//! the vendor backends it drives.
//!
//! # Module Structure
//!
//! - [`hal`] - Vendor boundary, opaque handles, status codes, callback traits
//! - [`config`] - Configuration loading traits and types
//! - [`properties`] - System property lookup (interface name resolution)
//! - [`error`] - Error types for control-plane operations
//! - [`consts`] - Workspace-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use wifi_common::prelude::*;
//!
//! let reason = FailureReason::from_legacy(LegacyError::TimedOut, "Failed to initialize HAL");
//! assert_eq!(reason.reason, CommandFailureReason::Unknown);
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod hal;
pub mod prelude;
pub mod properties;
