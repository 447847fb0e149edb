//! # Lifecycle Integration Tests
//!
//! Drive `WifiHal` end to end on the simulation vendor. These tests cover:
//!
//! - start/stop state table, including repeated and conflicting commands
//! - the shutdown barrier waiting for the event loop worker
//! - fatal handling of an unexpected event loop exit
//! - chip lookup, debug info, and invalidation on stop
//! - subscriber identity, deregistration, and failure isolation

use parking_lot::{Condvar, Mutex};
use proptest::prelude::*;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use wifi_common::prelude::*;
use wifi_hal::drivers::simulation::{
    SimulatedIface, SimulatedVendor, SimulationConfig, VendorCallCounts,
};
use wifi_hal::{FatalHandler, HalOptions, WifiChip, WifiHal};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_PERIOD: Duration = Duration::from_millis(100);

// ─── Helpers ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum LifecycleEvent {
    Start(CommandId),
    StartFailure(CommandId, FailureReason),
    Stop(CommandId),
}

/// Thread-safe event log with blocking waits.
struct Recorder<E> {
    events: Mutex<Vec<E>>,
    changed: Condvar,
}

impl<E: Clone + Debug> Recorder<E> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            changed: Condvar::new(),
        })
    }

    fn push(&self, event: E) {
        self.events.lock().push(event);
        self.changed.notify_all();
    }

    fn events(&self) -> Vec<E> {
        self.events.lock().clone()
    }

    /// Block until `pred` holds for the log, panicking after `WAIT_TIMEOUT`.
    fn wait_for<F>(&self, pred: F) -> Vec<E>
    where
        F: Fn(&[E]) -> bool,
    {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        let mut events = self.events.lock();
        while !pred(&events) {
            if self.changed.wait_until(&mut events, deadline).timed_out() {
                panic!("timed out waiting for events, got {:?}", *events);
            }
        }
        events.clone()
    }
}

impl WifiEventCallback for Recorder<LifecycleEvent> {
    fn on_start(&self, cmd: CommandId) -> CallbackResult {
        self.push(LifecycleEvent::Start(cmd));
        Ok(())
    }

    fn on_start_failure(&self, cmd: CommandId, reason: &FailureReason) -> CallbackResult {
        self.push(LifecycleEvent::StartFailure(cmd, reason.clone()));
        Ok(())
    }

    fn on_stop(&self, cmd: CommandId) -> CallbackResult {
        self.push(LifecycleEvent::Stop(cmd));
        Ok(())
    }
}

impl WifiChipEventCallback for Recorder<ChipDebugInfo> {
    fn on_chip_debug_info_available(&self, info: &ChipDebugInfo) -> CallbackResult {
        self.push(info.clone());
        Ok(())
    }
}

/// Subscriber that always panics.
struct Panicking;

impl WifiEventCallback for Panicking {
    fn on_start(&self, _cmd: CommandId) -> CallbackResult {
        panic!("subscriber bug");
    }

    fn on_start_failure(&self, _cmd: CommandId, _reason: &FailureReason) -> CallbackResult {
        panic!("subscriber bug");
    }

    fn on_stop(&self, _cmd: CommandId) -> CallbackResult {
        panic!("subscriber bug");
    }
}

struct Fixture {
    hal: WifiHal,
    sim: Arc<SimulatedVendor>,
    events: Arc<Recorder<LifecycleEvent>>,
    fatal: Arc<Recorder<FatalError>>,
}

impl Fixture {
    fn new(config: SimulationConfig) -> Self {
        let sim = Arc::new(SimulatedVendor::new(config));
        let fatal = Recorder::<FatalError>::new();
        let sink = Arc::clone(&fatal);
        let handler: FatalHandler = Arc::new(move |e: &FatalError| sink.push(e.clone()));

        let hal = WifiHal::spawn(
            sim.clone(),
            HalOptions::new("wlan0").with_fatal_handler(handler),
        )
        .expect("spawn HAL");

        let events = Recorder::<LifecycleEvent>::new();
        hal.register_event_callback(events.clone()).expect("register");

        Self {
            hal,
            sim,
            events,
            fatal,
        }
    }

    fn simple() -> Self {
        Self::new(SimulationConfig::default())
    }

    /// Wait until every task posted so far has run.
    fn sync(&self) {
        self.hal.is_started().expect("control thread alive");
    }

    fn chip(&self) -> WifiChip {
        self.hal.chip().expect("query").expect("chip present")
    }

    fn wait_stopped(&self, cmd: CommandId) {
        self.events
            .wait_for(|ev| ev.contains(&LifecycleEvent::Stop(cmd)));
        assert!(!self.hal.is_started().unwrap());
    }
}

fn count_of(events: &[LifecycleEvent], target: &LifecycleEvent) -> usize {
    events.iter().filter(|e| *e == target).count()
}

// ─── Start ──────────────────────────────────────────────────────────

#[test]
fn test_start_reports_on_start_and_binds_chip() {
    let f = Fixture::simple();
    f.hal.start(CommandId(1)).unwrap();

    assert!(f.hal.is_started().unwrap());
    assert_eq!(f.hal.state().unwrap(), RunState::Started);
    assert_eq!(f.events.events(), vec![LifecycleEvent::Start(CommandId(1))]);
    assert!(f.hal.chip().unwrap().is_some());
    assert_eq!(f.sim.calls().initialize, 1);
}

#[test]
fn test_repeated_start_reconfirms_without_reinitializing() {
    let f = Fixture::simple();
    for i in 1..=3 {
        f.hal.start(CommandId(i)).unwrap();
    }
    f.sync();

    assert_eq!(
        f.events.events(),
        vec![
            LifecycleEvent::Start(CommandId(1)),
            LifecycleEvent::Start(CommandId(2)),
            LifecycleEvent::Start(CommandId(3)),
        ]
    );
    assert_eq!(f.sim.calls().initialize, 1);
}

#[test]
fn test_init_failure_reports_reason_and_stays_stopped() {
    let f = Fixture::new(SimulationConfig {
        init_error: Some(LegacyError::TimedOut),
        ..SimulationConfig::default()
    });
    f.hal.start(CommandId(4)).unwrap();

    assert!(!f.hal.is_started().unwrap());
    assert_eq!(
        f.events.events(),
        vec![LifecycleEvent::StartFailure(
            CommandId(4),
            FailureReason::new(
                CommandFailureReason::Unknown,
                "Failed to initialize HAL, timed out"
            )
        )]
    );
    let calls = f.sim.calls();
    assert_eq!(calls.event_loop, 0);
    assert_eq!(calls.get_ifaces, 0);
}

#[test]
fn test_start_while_stopping_is_rejected() {
    let f = Fixture::simple();
    f.sim.hold_event_loop_exit();
    f.hal.start(CommandId(1)).unwrap();
    f.hal.stop(CommandId(2)).unwrap();
    f.hal.start(CommandId(3)).unwrap();

    assert_eq!(f.hal.state().unwrap(), RunState::Stopping);
    assert_eq!(f.sim.calls().initialize, 1);
    assert_eq!(
        f.events.events(),
        vec![
            LifecycleEvent::Start(CommandId(1)),
            LifecycleEvent::StartFailure(
                CommandId(3),
                FailureReason::new(CommandFailureReason::NotAvailable, "HAL is stopping")
            ),
        ]
    );

    f.sim.release_event_loop_exit();
    f.wait_stopped(CommandId(2));
}

#[test]
fn test_missing_interface_starts_without_chip() {
    let f = Fixture::new(SimulationConfig {
        interfaces: vec![SimulatedIface::new("p2p0")],
        ..SimulationConfig::default()
    });
    f.hal.start(CommandId(1)).unwrap();

    assert!(f.hal.is_started().unwrap());
    assert!(f.hal.chip().unwrap().is_none());

    let (tx, rx) = mpsc::channel();
    f.hal
        .get_chip(move |chip| tx.send(chip.is_some()).unwrap())
        .unwrap();
    assert!(!rx.recv_timeout(WAIT_TIMEOUT).unwrap());
}

#[test]
fn test_enumeration_failure_starts_without_chip() {
    let f = Fixture::new(SimulationConfig {
        enumeration_error: Some(LegacyError::Busy),
        ..SimulationConfig::default()
    });
    f.hal.start(CommandId(1)).unwrap();
    assert!(f.hal.is_started().unwrap());
    assert!(f.hal.chip().unwrap().is_none());
}

// ─── Stop ───────────────────────────────────────────────────────────

#[test]
fn test_stop_when_stopped_reports_immediately() {
    let f = Fixture::simple();
    f.hal.stop(CommandId(9)).unwrap();
    f.sync();

    assert_eq!(f.events.events(), vec![LifecycleEvent::Stop(CommandId(9))]);
    assert_eq!(f.sim.calls(), VendorCallCounts::default());
}

#[test]
fn test_start_then_stop_round_trip() {
    let f = Fixture::simple();
    f.hal.start(CommandId(1)).unwrap();
    assert!(f.hal.is_started().unwrap());

    f.hal.stop(CommandId(2)).unwrap();
    f.wait_stopped(CommandId(2));

    let calls = f.sim.calls();
    assert_eq!(calls.initialize, 1);
    assert_eq!(calls.cleanup, 1);
    assert!(!f.sim.is_in_event_loop());
}

#[test]
fn test_on_stop_waits_for_event_loop_exit() {
    let f = Fixture::simple();
    f.sim.hold_event_loop_exit();
    f.hal.start(CommandId(1)).unwrap();
    f.hal.stop(CommandId(2)).unwrap();

    // Cleanup command returned, event loop still running.
    assert_eq!(f.hal.state().unwrap(), RunState::Stopping);
    assert!(f.hal.is_started().unwrap());
    assert_eq!(f.sim.calls().cleanup, 1);
    std::thread::sleep(QUIET_PERIOD);
    assert!(f.hal.is_started().unwrap());
    assert_eq!(f.events.events(), vec![LifecycleEvent::Start(CommandId(1))]);

    f.sim.release_event_loop_exit();
    f.wait_stopped(CommandId(2));

    std::thread::sleep(QUIET_PERIOD);
    f.sync();
    assert_eq!(
        count_of(&f.events.events(), &LifecycleEvent::Stop(CommandId(2))),
        1
    );
}

#[test]
fn test_duplicate_stop_is_absorbed() {
    let f = Fixture::simple();
    f.sim.hold_event_loop_exit();
    f.hal.start(CommandId(1)).unwrap();
    f.hal.stop(CommandId(2)).unwrap();
    f.hal.stop(CommandId(3)).unwrap();
    f.sync();
    assert_eq!(f.sim.calls().cleanup, 1);

    f.sim.release_event_loop_exit();
    f.wait_stopped(CommandId(2));
    std::thread::sleep(QUIET_PERIOD);
    f.sync();

    assert_eq!(
        f.events.events(),
        vec![
            LifecycleEvent::Start(CommandId(1)),
            LifecycleEvent::Stop(CommandId(2)),
        ]
    );
}

#[test]
fn test_restart_after_stop_opens_a_new_session() {
    let f = Fixture::simple();
    f.hal.start(CommandId(1)).unwrap();
    f.hal.stop(CommandId(2)).unwrap();
    f.wait_stopped(CommandId(2));

    f.hal.start(CommandId(3)).unwrap();
    assert!(f.hal.is_started().unwrap());
    assert_eq!(f.sim.calls().initialize, 2);
    assert!(f.hal.chip().unwrap().is_some());

    f.hal.stop(CommandId(4)).unwrap();
    f.wait_stopped(CommandId(4));
}

// ─── Fatal ──────────────────────────────────────────────────────────

#[test]
fn test_unexpected_event_loop_exit_is_fatal() {
    let f = Fixture::simple();
    f.hal.start(CommandId(1)).unwrap();
    f.sync();

    f.sim.terminate_event_loop();
    let fatal = f.fatal.wait_for(|errs| !errs.is_empty());
    assert_eq!(
        fatal,
        vec![FatalError::EventLoopTerminated {
            state: RunState::Started
        }]
    );

    assert!(matches!(
        f.hal.is_started(),
        Err(WifiError::ControlThreadGone)
    ));
    assert!(matches!(
        f.hal.start(CommandId(2)),
        Err(WifiError::ControlThreadGone)
    ));
    assert_eq!(f.events.events(), vec![LifecycleEvent::Start(CommandId(1))]);
}

// ─── Chip ───────────────────────────────────────────────────────────

#[test]
fn test_get_chip_delivers_live_chip() {
    let f = Fixture::simple();
    f.hal.start(CommandId(1)).unwrap();

    let (tx, rx) = mpsc::channel();
    f.hal.get_chip(move |chip| tx.send(chip).unwrap()).unwrap();
    let chip = rx.recv_timeout(WAIT_TIMEOUT).unwrap().expect("chip present");
    assert!(chip.is_valid().unwrap());
}

#[test]
fn test_debug_info_falls_back_to_unknown_driver() {
    let f = Fixture::new(SimulationConfig {
        driver_version_error: Some(LegacyError::NotSupported),
        firmware_version: "fw 7.35.180".to_string(),
        ..SimulationConfig::default()
    });
    f.hal.start(CommandId(1)).unwrap();

    let chip = f.chip();
    let infos = Recorder::<ChipDebugInfo>::new();
    chip.register_event_callback(infos.clone()).unwrap();
    chip.request_chip_debug_info().unwrap();

    let delivered = infos.wait_for(|i| !i.is_empty());
    assert_eq!(
        delivered,
        vec![ChipDebugInfo {
            driver_description: UNKNOWN_DESCRIPTION.to_string(),
            firmware_description: "fw 7.35.180".to_string(),
        }]
    );
}

#[test]
fn test_stale_chip_makes_no_vendor_calls() {
    let f = Fixture::simple();
    f.hal.start(CommandId(1)).unwrap();
    let chip = f.chip();
    let infos = Recorder::<ChipDebugInfo>::new();
    chip.register_event_callback(infos.clone()).unwrap();

    f.hal.stop(CommandId(2)).unwrap();
    f.wait_stopped(CommandId(2));

    chip.request_chip_debug_info().unwrap();
    assert!(!chip.is_valid().unwrap());

    // A new session does not revive the old handle.
    f.hal.start(CommandId(3)).unwrap();
    chip.request_chip_debug_info().unwrap();
    f.sync();

    let calls = f.sim.calls();
    assert_eq!(calls.get_driver_version, 0);
    assert_eq!(calls.get_firmware_version, 0);
    assert!(infos.events().is_empty());
    assert_ne!(f.chip().id(), chip.id());
}

#[test]
fn test_chip_mode_defaults() {
    let f = Fixture::simple();
    f.hal.start(CommandId(1)).unwrap();
    let chip = f.chip();

    assert!(chip.get_available_modes().unwrap().is_empty());
    chip.configure_chip(1).unwrap();
    assert_eq!(chip.get_mode().unwrap(), 0);
}

#[test]
fn test_query_from_control_thread_is_rejected() {
    let f = Fixture::simple();
    f.hal.start(CommandId(1)).unwrap();

    let (tx, rx) = mpsc::channel();
    f.hal
        .get_chip(move |chip| {
            let chip = chip.expect("chip present");
            tx.send(chip.get_mode()).unwrap();
        })
        .unwrap();
    assert!(matches!(
        rx.recv_timeout(WAIT_TIMEOUT).unwrap(),
        Err(WifiError::ReentrantCall)
    ));
}

// ─── Subscribers ────────────────────────────────────────────────────

#[test]
fn test_same_subscriber_registered_twice_gets_one_delivery() {
    let f = Fixture::simple();
    let extra = Recorder::<LifecycleEvent>::new();
    f.hal.register_event_callback(extra.clone()).unwrap();
    f.hal.register_event_callback(extra.clone()).unwrap();

    f.hal.stop(CommandId(5)).unwrap();
    f.sync();
    assert_eq!(extra.events(), vec![LifecycleEvent::Stop(CommandId(5))]);
}

#[test]
fn test_distinct_subscribers_each_get_delivery() {
    let f = Fixture::simple();
    let a = Recorder::<LifecycleEvent>::new();
    let b = Recorder::<LifecycleEvent>::new();
    f.hal.register_event_callback(a.clone()).unwrap();
    f.hal.register_event_callback(b.clone()).unwrap();

    f.hal.stop(CommandId(5)).unwrap();
    f.sync();
    assert_eq!(a.events(), vec![LifecycleEvent::Stop(CommandId(5))]);
    assert_eq!(b.events(), vec![LifecycleEvent::Stop(CommandId(5))]);
}

#[test]
fn test_unregistered_subscriber_gets_nothing() {
    let f = Fixture::simple();
    let extra = Recorder::<LifecycleEvent>::new();
    let cb: Arc<dyn WifiEventCallback> = extra.clone();
    f.hal.register_event_callback(cb.clone()).unwrap();
    f.hal.unregister_event_callback(&cb).unwrap();

    f.hal.start(CommandId(1)).unwrap();
    f.sync();
    assert!(extra.events().is_empty());
    assert_eq!(f.events.events(), vec![LifecycleEvent::Start(CommandId(1))]);
}

#[test]
fn test_panicking_subscriber_does_not_block_others() {
    let f = Fixture::simple();
    f.hal.register_event_callback(Arc::new(Panicking)).unwrap();
    let after = Recorder::<LifecycleEvent>::new();
    f.hal.register_event_callback(after.clone()).unwrap();

    f.hal.start(CommandId(1)).unwrap();
    f.sync();
    assert_eq!(f.events.events(), vec![LifecycleEvent::Start(CommandId(1))]);
    assert_eq!(after.events(), vec![LifecycleEvent::Start(CommandId(1))]);
    assert!(f.hal.is_started().unwrap());
}

// ─── Properties ─────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn repeated_starts_initialize_once(ids in prop::collection::vec(any::<u32>(), 1..6)) {
        let f = Fixture::simple();
        for id in &ids {
            f.hal.start(CommandId(*id)).unwrap();
        }
        f.sync();

        let expected: Vec<_> = ids.iter().map(|id| LifecycleEvent::Start(CommandId(*id))).collect();
        prop_assert_eq!(f.events.events(), expected);
        prop_assert_eq!(f.sim.calls().initialize, 1);

        f.hal.stop(CommandId(0)).unwrap();
        f.wait_stopped(CommandId(0));
    }
}
