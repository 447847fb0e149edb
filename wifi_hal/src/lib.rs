//! # Wi-Fi HAL Library
//!
//! Lifecycle core for a blocking vendor Wi-Fi library.
//!
//! This crate turns the vendor's `initialize` / `cleanup` / `event_loop`
//! primitives into an asynchronous start/stop protocol. Vendors implement
//! the `VendorHal` trait defined in `wifi_common::hal::vendor`.
//!
//! # Module Structure
//!
//! - [`service`] - `WifiHal` facade and `WifiChip` handle
//! - [`core`] - `HalLifecycleController` state machine
//! - [`dispatcher`] - Control thread task queue
//! - [`event_loop`] - Vendor event loop worker thread
//! - [`barrier`] - Two-condition shutdown barrier
//! - [`callbacks`] - Subscriber registry with isolated fan-out
//! - [`iface`] - Interface lookup by name
//! - [`chip`] - Chip proxy for the resolved interface
//! - [`session`] - Owned vendor handle
//! - [`vendor_registry`] - Vendor factory registration
//! - [`drivers`] - Vendor backend implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          wifi_hal                                │
//! │  ┌─────────────┐  post/call  ┌───────────────────────────────┐   │
//! │  │  WifiHal /  │────────────►│ control thread                │   │
//! │  │  WifiChip   │             │  HalLifecycleController       │   │
//! │  └─────────────┘             │   ├─ CallbackRegistry         │   │
//! │                              │   ├─ ChipLifecycleProxy       │   │
//! │  ┌─────────────┐  exit task  │   └─ ShutdownBarrier          │   │
//! │  │ event loop  │────────────►│                               │   │
//! │  │   worker    │             └──────────────┬────────────────┘   │
//! │  └──────┬──────┘                            │                    │
//! │         ▼                                   ▼                    │
//! │                 ┌────────────────────────┐                       │
//! │                 │  VendorHal (trait obj) │                       │
//! │                 └────────────────────────┘                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod barrier;
pub mod callbacks;
pub mod chip;
pub mod core;
pub mod dispatcher;
pub mod drivers;
pub mod event_loop;
pub mod iface;
pub mod service;
pub mod session;
pub mod vendor_registry;

// Re-export key types for convenience
pub use crate::core::{FatalHandler, HalLifecycleController, abort_on_fatal};
pub use crate::service::{HalOptions, WifiChip, WifiHal};
pub use crate::vendor_registry::VendorRegistry;
