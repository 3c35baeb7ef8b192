//! The single-threaded reactor every connection runs on.
//!
//! [`Scheduler`] owns a current-thread tokio runtime and a [`LocalSet`], so
//! socket readiness, connection tasks and deferred tasks are all driven by one
//! thread and never run concurrently. Shared state reachable from those tasks
//! therefore uses `Rc`/`Cell` rather than locks.
//!
//! Deferred tasks go through a FIFO queue drained by a single driver task:
//! a task scheduled with [`SchedulerHandle::schedule_soon`] never runs inside
//! the caller, and tasks scheduled one after another run in that order.

use std::convert::Infallible;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, LocalSet};
use tracing::{error, trace};

use crate::panic_message;
use crate::server::ServerError;

type Task = Box<dyn FnOnce() + 'static>;

/// The reactor context.
///
/// Created once at startup and handed out to the listener and connections as a
/// [`SchedulerHandle`]. Independent instances can coexist, which tests rely on.
pub struct Scheduler {
    // dropped before the runtime so pending connections deregister from a live driver
    local: LocalSet,
    runtime: Runtime,
    handle: SchedulerHandle,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").field("method", &Self::backend_method()).finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Builds the reactor. Failing to create it is fatal for the server.
    pub fn new() -> Result<Self, ServerError> {
        let runtime = Builder::new_current_thread().enable_all().build().map_err(ServerError::runtime)?;
        let local = LocalSet::new();

        let (sender, receiver) = mpsc::unbounded_channel::<Task>();
        local.spawn_local(drain_deferred(receiver));

        Ok(Self { local, runtime, handle: SchedulerHandle { sender } })
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Drives the reactor until `future` completes and returns its output.
    ///
    /// Tasks that are still pending when `future` completes are kept and resume
    /// on the next call.
    pub fn run_until<F: Future>(&mut self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }

    /// Starts a task on the reactor without entering it first.
    ///
    /// The task makes progress once the reactor is driven.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.local.spawn_local(future)
    }

    /// Blocks the calling thread driving the reactor. Never returns.
    pub fn run_forever(mut self) -> ! {
        match self.run_until(std::future::pending::<Infallible>()) {}
    }

    /// The readiness notification mechanism the reactor polls with on this platform.
    pub fn backend_method() -> &'static str {
        if cfg!(any(target_os = "linux", target_os = "android", target_os = "illumos", target_os = "redox")) {
            "epoll"
        } else if cfg!(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd",
            target_os = "dragonfly"
        )) {
            "kqueue"
        } else if cfg!(windows) {
            "iocp"
        } else {
            "poll"
        }
    }
}

async fn drain_deferred(mut receiver: mpsc::UnboundedReceiver<Task>) {
    while let Some(task) = receiver.recv().await {
        // keep draining after a panicking task
        if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(task)) {
            error!(cause = panic_message(cause.as_ref()), "deferred task panicked");
        }
    }
    trace!("deferred task queue closed");
}

/// A cheap, clonable reference to a [`Scheduler`].
///
/// Must only be used from tasks running on that scheduler's thread.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    sender: mpsc::UnboundedSender<Task>,
}

impl SchedulerHandle {
    /// Enqueues `task` to run on a later reactor turn.
    ///
    /// If the scheduler is already gone the task is dropped without running.
    pub fn schedule_soon<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        if self.sender.send(Box::new(task)).is_err() {
            trace!("scheduler is gone, deferred task dropped");
        }
    }

    /// Completes on a later reactor turn, after every task scheduled before it.
    pub async fn defer(&self) {
        let (tx, rx) = oneshot::channel();
        self.schedule_soon(move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Starts a task on the reactor.
    ///
    /// # Panics
    ///
    /// Panics when called outside [`Scheduler::run_until`] or [`Scheduler::run_forever`].
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        tokio::task::spawn_local(future)
    }
}
