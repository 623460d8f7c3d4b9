//! The UI dispatcher thread
//!
//! A dedicated thread owns all UI-facing work. `invoke` blocks the calling
//! thread until the closure ran on the dispatcher (running inline when the
//! caller already is the dispatcher), `run_later` enqueues without waiting.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{bounded, unbounded, Sender};
use parking_lot::Mutex;
use thiserror::Error;

/// Dispatch errors
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The dispatcher thread is no longer running
    #[error("dispatcher is shut down")]
    Disconnected,

    /// The dispatched closure panicked on the dispatcher thread
    #[error("dispatched task panicked: {0}")]
    Panicked(String),
}

enum Job {
    Run(Box<dyn FnOnce() + Send>),
    Stop,
}

struct Inner {
    tx: Sender<Job>,
    thread_id: ThreadId,
    thread: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to the single UI-owning thread
///
/// Cheap to clone; all clones feed the same dispatch loop. There is no
/// timeout on blocking calls: a hung closure hangs its caller.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Spawn the dispatch loop on a dedicated thread
    pub fn spawn() -> Self {
        let (tx, rx) = unbounded::<Job>();
        let (id_tx, id_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("tiller-ui".into())
            .spawn(move || {
                let _ = id_tx.send(thread::current().id());
                while let Ok(job) = rx.recv() {
                    match job {
                        Job::Run(f) => {
                            if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
                                log::error!("dispatched task panicked on the UI thread");
                            }
                        }
                        Job::Stop => break,
                    }
                }
            })
            .unwrap_or_else(|e| panic!("failed to spawn dispatcher thread: {}", e));
        let thread_id = id_rx
            .recv()
            .unwrap_or_else(|_| panic!("dispatcher thread died during startup"));

        Self {
            inner: Arc::new(Inner {
                tx,
                thread_id,
                thread: Mutex::new(Some(handle)),
            }),
        }
    }

    /// Whether the calling thread is the dispatcher thread
    pub fn is_dispatch_thread(&self) -> bool {
        thread::current().id() == self.inner.thread_id
    }

    /// Run `f` on the dispatcher thread and block until it completed
    ///
    /// Runs inline when the caller already is the dispatcher thread. A panic
    /// inside `f` is reported as [`DispatchError::Panicked`]; the dispatch
    /// loop itself survives.
    pub fn invoke<R, F>(&self, f: F) -> Result<R, DispatchError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_dispatch_thread() {
            return Ok(f());
        }
        let (result_tx, result_rx) = bounded(1);
        let job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f));
            let _ = result_tx.send(result);
        });
        self.inner
            .tx
            .send(Job::Run(job))
            .map_err(|_| DispatchError::Disconnected)?;
        match result_rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(cause)) => Err(DispatchError::Panicked(panic_message(cause.as_ref()))),
            Err(_) => Err(DispatchError::Disconnected),
        }
    }

    /// Enqueue `f` on the dispatcher thread without waiting for it
    pub fn run_later<F>(&self, f: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner
            .tx
            .send(Job::Run(Box::new(f)))
            .map_err(|_| DispatchError::Disconnected)
    }

    /// Run `f` inline when already on the dispatcher thread, enqueue otherwise
    pub fn execute<F>(&self, f: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_dispatch_thread() {
            f();
            Ok(())
        } else {
            self.run_later(f)
        }
    }

    /// Stop the dispatch loop after draining already-queued work
    ///
    /// Joins the dispatcher thread unless called from it.
    pub fn shutdown(&self) {
        let _ = self.inner.tx.send(Job::Stop);
        if !self.is_dispatch_thread() {
            if let Some(handle) = self.inner.thread.lock().take() {
                let _ = handle.join();
            }
        }
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
