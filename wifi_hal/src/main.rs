//! # Wi-Fi HAL Binary
//!
//! Starts the HAL lifecycle core on a vendor backend, reports the chip's
//! debug info, and stops the HAL again on Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! # Run with the simulation vendor on wlan0
//! wifi_hal
//!
//! # Use a configuration file and another interface
//! wifi_hal --config /etc/wifi_hal/hal.toml --interface wlan1
//!
//! # Verbose JSON logging
//! wifi_hal -v --json
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;
use wifi_common::consts::DEFAULT_CONFIG_PATH;
use wifi_common::prelude::*;
use wifi_common::properties;
use wifi_hal::{HalOptions, VendorRegistry, WifiHal};

const START_CMD: CommandId = CommandId(1);
const STOP_CMD: CommandId = CommandId(2);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wi-Fi HAL - lifecycle core for a blocking vendor Wi-Fi library
#[derive(Parser, Debug)]
#[command(name = "wifi_hal")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Wi-Fi HAL lifecycle core with pluggable vendor backends")]
#[command(long_about = None)]
struct Args {
    /// Path to hal.toml. Defaults to /etc/wifi_hal/hal.toml when present.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vendor backend to load (overrides [hal].vendor)
    #[arg(long)]
    vendor: Option<String>,

    /// Interface to bind the chip to (overrides config and properties)
    #[arg(short, long)]
    interface: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

/// Lifecycle and chip subscriber that logs every event.
#[derive(Default)]
struct LoggingListener {
    start_failed: AtomicBool,
}

impl WifiEventCallback for LoggingListener {
    fn on_start(&self, cmd: CommandId) -> CallbackResult {
        info!("HAL started ({})", cmd);
        Ok(())
    }

    fn on_start_failure(&self, cmd: CommandId, reason: &FailureReason) -> CallbackResult {
        error!("HAL failed to start ({}): {}", cmd, reason);
        self.start_failed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn on_stop(&self, cmd: CommandId) -> CallbackResult {
        info!("HAL stopped ({})", cmd);
        Ok(())
    }
}

impl WifiChipEventCallback for LoggingListener {
    fn on_chip_debug_info_available(&self, info: &ChipDebugInfo) -> CallbackResult {
        match serde_json::to_string(info) {
            Ok(json) => info!("Chip debug info: {}", json),
            Err(e) => warn!("Chip debug info not serializable: {}", e),
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("HAL failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref());
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("Wi-Fi HAL v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = config?;
    config.validate()?;

    let vendor_name = args.vendor.clone().unwrap_or_else(|| config.hal.vendor.clone());
    let registry = VendorRegistry::with_builtin();
    let vendor = registry.create(&vendor_name, config.vendor_section(&vendor_name))?;

    let interface_name = select_interface_name(&args, &config);
    info!("Binding chip to interface '{}'", interface_name);

    let mut hal = WifiHal::spawn(vendor, HalOptions::new(interface_name))?;
    let listener = Arc::new(LoggingListener::default());
    hal.register_event_callback(listener.clone())?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    hal.start(START_CMD)?;
    let chip_listener = Arc::clone(&listener);
    hal.get_chip(move |chip| match chip {
        Some(chip) => {
            let posted = chip
                .register_event_callback(chip_listener)
                .and_then(|()| chip.request_chip_debug_info());
            if let Err(e) = posted {
                warn!("Chip debug info not requested: {}", e);
            }
        }
        None => warn!("No chip available"),
    })?;

    while running.load(Ordering::SeqCst) && !listener.start_failed.load(Ordering::SeqCst) {
        std::thread::sleep(POLL_INTERVAL);
    }

    hal.stop(STOP_CMD)?;
    while hal.is_started()? {
        std::thread::sleep(POLL_INTERVAL);
    }
    hal.shutdown()?;

    info!("Wi-Fi HAL shutdown complete");
    Ok(())
}

/// Load `hal.toml` from `path`, or from the default location if present.
fn load_config(path: Option<&Path>) -> Result<HalConfig, ConfigError> {
    match path {
        Some(path) => HalConfig::load(path),
        None => HalConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    }
}

/// Interface name: `--interface`, then `[hal].interface_name`, then the
/// `wifi.interface` property (environment before `[properties]`).
fn select_interface_name(args: &Args, config: &HalConfig) -> String {
    if let Some(name) = args.interface.clone().or_else(|| config.hal.interface_name.clone()) {
        return name;
    }
    let env = EnvProperties;
    let table = StaticProperties::new(config.properties.clone());
    properties::interface_name(&[&env, &table])
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.as_directive()))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
