//! Vendor boundary and lifecycle types.
//!
//! This module contains the contract between the lifecycle core and a
//! vendor-supplied HAL library, plus the types exchanged with subscribers.

pub mod callback;
pub mod config;
pub mod types;
pub mod vendor;
