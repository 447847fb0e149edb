//! Subscriber registry with isolated fan-out.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};
use wifi_common::hal::callback::CallbackResult;

/// Set of subscribers keyed by `Arc` pointer identity.
///
/// Lives on the control thread; broadcasting is synchronous. A subscriber
/// that returns an error or panics is logged and skipped, delivery to the
/// others continues.
pub struct CallbackRegistry<T: ?Sized> {
    subscribers: Vec<Arc<T>>,
}

impl<T: ?Sized> CallbackRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Add a subscriber. Returns `false` if this exact `Arc` is already present.
    pub fn register(&mut self, subscriber: Arc<T>) -> bool {
        if self.contains(&subscriber) {
            return false;
        }
        self.subscribers.push(subscriber);
        true
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unregister(&mut self, subscriber: &Arc<T>) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| !same_subscriber(s, subscriber));
        self.subscribers.len() != before
    }

    /// Whether this exact `Arc` is registered.
    pub fn contains(&self, subscriber: &Arc<T>) -> bool {
        self.subscribers.iter().any(|s| same_subscriber(s, subscriber))
    }

    /// Drop every subscriber.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver one event to every subscriber.
    ///
    /// Returns the number of subscribers that accepted the event.
    pub fn broadcast<F>(&self, event: &str, deliver: F) -> usize
    where
        F: Fn(&T) -> CallbackResult,
    {
        let mut delivered = 0;
        for subscriber in &self.subscribers {
            match panic::catch_unwind(AssertUnwindSafe(|| deliver(&**subscriber))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => warn!("Subscriber failed to handle {}: {}", event, e),
                Err(_) => error!("Subscriber panicked while handling {}", event),
            }
        }
        delivered
    }
}

impl<T: ?Sized> Default for CallbackRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn same_subscriber<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use wifi_common::hal::callback::CallbackError;

    trait Probe: Send + Sync {
        fn ping(&self, n: u32) -> CallbackResult;
    }

    #[derive(Default)]
    struct Counter {
        seen: Mutex<Vec<u32>>,
    }

    impl Probe for Counter {
        fn ping(&self, n: u32) -> CallbackResult {
            self.seen.lock().push(n);
            Ok(())
        }
    }

    struct Failing;

    impl Probe for Failing {
        fn ping(&self, _n: u32) -> CallbackResult {
            Err(CallbackError::Disconnected)
        }
    }

    struct Panicking;

    impl Probe for Panicking {
        fn ping(&self, _n: u32) -> CallbackResult {
            panic!("subscriber bug");
        }
    }

    #[test]
    fn test_same_arc_registers_once() {
        let mut reg: CallbackRegistry<dyn Probe> = CallbackRegistry::new();
        let counter = Arc::new(Counter::default());
        let sub: Arc<dyn Probe> = counter.clone();

        assert!(reg.register(sub.clone()));
        assert!(!reg.register(sub.clone()));
        assert_eq!(reg.len(), 1);

        assert_eq!(reg.broadcast("ping", |s| s.ping(7)), 1);
        assert_eq!(*counter.seen.lock(), vec![7]);
    }

    #[test]
    fn test_distinct_arcs_are_distinct_subscribers() {
        let mut reg: CallbackRegistry<dyn Probe> = CallbackRegistry::new();
        reg.register(Arc::new(Counter::default()));
        reg.register(Arc::new(Counter::default()));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.broadcast("ping", |s| s.ping(1)), 2);
    }

    #[test]
    fn test_unregister() {
        let mut reg: CallbackRegistry<dyn Probe> = CallbackRegistry::new();
        let a: Arc<dyn Probe> = Arc::new(Counter::default());
        let b: Arc<dyn Probe> = Arc::new(Counter::default());
        reg.register(a.clone());
        reg.register(b.clone());

        assert!(reg.unregister(&a));
        assert!(!reg.unregister(&a));
        assert!(!reg.contains(&a));
        assert!(reg.contains(&b));
    }

    #[test]
    fn test_failures_do_not_block_delivery() {
        let mut reg: CallbackRegistry<dyn Probe> = CallbackRegistry::new();
        let before = Arc::new(Counter::default());
        let after = Arc::new(Counter::default());
        reg.register(before.clone());
        reg.register(Arc::new(Failing));
        reg.register(Arc::new(Panicking));
        reg.register(after.clone());

        assert_eq!(reg.broadcast("ping", |s| s.ping(3)), 2);
        assert_eq!(*before.seen.lock(), vec![3]);
        assert_eq!(*after.seen.lock(), vec![3]);
    }

    #[test]
    fn test_clear() {
        let mut reg: CallbackRegistry<dyn Probe> = CallbackRegistry::default();
        reg.register(Arc::new(Counter::default()));
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.broadcast("ping", |s| s.ping(0)), 0);
    }
}
