//! Control thread task dispatcher.
//!
//! A `TaskDispatcher<C>` owns one OS thread (the control thread) and one
//! context value `C` that lives on it. Tasks are closures over `&mut C`,
//! executed one at a time in submission order, so `C` needs no locks.
//! Any thread may submit; the event loop worker uses the same queue to
//! report its exit.

use std::ops::ControlFlow;
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle, ThreadId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use wifi_common::error::WifiError;

/// Unit of work executed on the control thread.
///
/// Returning `ControlFlow::Break` ends the control loop after this task.
pub type Task<C> = Box<dyn FnOnce(&mut C) -> ControlFlow<()> + Send>;

/// Handle for submitting tasks to a control thread.
pub struct TaskDispatcher<C> {
    tx: mpsc::UnboundedSender<Task<C>>,
    control_thread: Arc<OnceLock<ThreadId>>,
}

impl<C> Clone for TaskDispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            control_thread: Arc::clone(&self.control_thread),
        }
    }
}

impl<C: 'static> TaskDispatcher<C> {
    /// Spawn the control thread.
    ///
    /// `init` runs on the new thread and builds the context; it receives a
    /// dispatcher for the context to keep (e.g., to hand to worker threads).
    ///
    /// # Errors
    /// Returns `WifiError::ThreadSpawn` if the OS thread cannot be created.
    pub fn spawn<F>(name: &str, init: F) -> Result<(Self, JoinHandle<()>), WifiError>
    where
        F: FnOnce(TaskDispatcher<C>) -> C + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Task<C>>();
        let dispatcher = Self {
            tx,
            control_thread: Arc::new(OnceLock::new()),
        };
        let inner = dispatcher.clone();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _ = inner.control_thread.set(thread::current().id());
                let mut ctx = init(inner);
                let mut executed: u64 = 0;
                while let Some(task) = rx.blocking_recv() {
                    executed += 1;
                    if task(&mut ctx).is_break() {
                        break;
                    }
                }
                info!("Control thread exiting after {} tasks", executed);
            })
            .map_err(|e| WifiError::ThreadSpawn(e.to_string()))?;

        debug!("Control thread '{}' spawned", name);
        Ok((dispatcher, handle))
    }

    /// Submit a task; it runs later, after every task submitted before it.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control loop has ended.
    pub fn post<F>(&self, task: F) -> Result<(), WifiError>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.post_flow(move |ctx| {
            task(ctx);
            ControlFlow::Continue(())
        })
    }

    /// Submit a task that decides whether the control loop continues.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control loop has ended.
    pub fn post_flow<F>(&self, task: F) -> Result<(), WifiError>
    where
        F: FnOnce(&mut C) -> ControlFlow<()> + Send + 'static,
    {
        self.tx
            .send(Box::new(task))
            .map_err(|_| WifiError::ControlThreadGone)
    }

    /// Run `f` on the control thread and wait for its result.
    ///
    /// # Errors
    /// - `WifiError::ReentrantCall` when called from the control thread
    /// - `WifiError::ControlThreadGone` if the loop ends before `f` runs
    pub fn call<R, F>(&self, f: F) -> Result<R, WifiError>
    where
        F: FnOnce(&mut C) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_control_thread() {
            return Err(WifiError::ReentrantCall);
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        self.post(move |ctx| {
            let _ = reply_tx.send(f(ctx));
        })?;
        reply_rx
            .blocking_recv()
            .map_err(|_| WifiError::ControlThreadGone)
    }

    /// Ask the control loop to exit once queued tasks ahead of this one ran.
    ///
    /// # Errors
    /// Returns `WifiError::ControlThreadGone` if the control loop has ended.
    pub fn shutdown(&self) -> Result<(), WifiError> {
        self.post_flow(|_| ControlFlow::Break(()))
    }

    /// Whether the current thread is this dispatcher's control thread.
    pub fn is_control_thread(&self) -> bool {
        self.control_thread.get() == Some(&thread::current().id())
    }

    /// Whether the control loop has ended.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
