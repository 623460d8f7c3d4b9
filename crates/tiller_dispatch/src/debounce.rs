//! Debounced change listeners
//!
//! A debounced listener wraps a plain change callback. Notifications that
//! arrive inside the debounce window cancel the previous pending delivery,
//! so only the newest payload survives a burst. Delivery is always
//! marshalled onto the dispatcher thread; the background timer thread only
//! measures elapsed delay.
//!
//! Cancel-and-reschedule is "last write wins" and is not atomic under
//! concurrent producers on several threads; the expected producer is the
//! dispatcher's own loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};

use crate::dispatcher::Dispatcher;

struct Scheduled<T> {
    payload: T,
    deadline: Instant,
}

/// Debounces notifications, delivering only the newest payload of a burst
pub struct DebouncedListener<T: Send + 'static> {
    tx: Sender<Scheduled<T>>,
    delay: Duration,
    enabled: Arc<AtomicBool>,
    dispatcher: Dispatcher,
    callback: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: Send + 'static> DebouncedListener<T> {
    /// Create a listener that forwards to `callback` after `delay` of quiet
    pub fn new<F>(dispatcher: &Dispatcher, delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self::with_enabled_flag(dispatcher, delay, Arc::new(AtomicBool::new(true)), callback)
    }

    /// Create a listener gated by a shared enabled flag
    ///
    /// Several listeners may share one flag so they can be muted together.
    pub fn with_enabled_flag<F>(
        dispatcher: &Dispatcher,
        delay: Duration,
        enabled: Arc<AtomicBool>,
        callback: F,
    ) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let callback: Arc<dyn Fn(T) + Send + Sync> = Arc::new(callback);
        let (tx, rx) = unbounded::<Scheduled<T>>();
        {
            let dispatcher = dispatcher.clone();
            let callback = Arc::clone(&callback);
            thread::Builder::new()
                .name("tiller-debounce".into())
                .spawn(move || {
                    let mut pending: Option<Scheduled<T>> = None;
                    loop {
                        match pending.take() {
                            None => match rx.recv() {
                                Ok(next) => pending = Some(next),
                                Err(_) => break,
                            },
                            Some(current) => {
                                let now = Instant::now();
                                if current.deadline <= now {
                                    deliver(&dispatcher, &callback, current.payload);
                                    continue;
                                }
                                match rx.recv_timeout(current.deadline - now) {
                                    // a newer notification supersedes the pending one
                                    Ok(next) => pending = Some(next),
                                    Err(RecvTimeoutError::Timeout) => {
                                        deliver(&dispatcher, &callback, current.payload);
                                    }
                                    // listener dropped mid-window: the pending payload dies with it
                                    Err(RecvTimeoutError::Disconnected) => break,
                                }
                            }
                        }
                    }
                })
                .unwrap_or_else(|e| panic!("failed to spawn debounce timer thread: {}", e));
        }

        Self {
            tx,
            delay,
            enabled,
            dispatcher: dispatcher.clone(),
            callback,
        }
    }

    /// Handle a raw change notification
    pub fn notify(&self, payload: T) {
        if !self.enabled.load(Ordering::Acquire) {
            return;
        }
        if self.delay.is_zero() {
            let callback = Arc::clone(&self.callback);
            let _ = self.dispatcher.execute(move || callback(payload));
            return;
        }
        let _ = self.tx.send(Scheduled {
            payload,
            deadline: Instant::now() + self.delay,
        });
    }

    /// Enable or disable forwarding; disabled notifications are dropped
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Whether notifications are currently forwarded
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// The configured quiet period
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

fn deliver<T: Send + 'static>(
    dispatcher: &Dispatcher,
    callback: &Arc<dyn Fn(T) + Send + Sync>,
    payload: T,
) {
    let callback = Arc::clone(callback);
    if dispatcher.run_later(move || callback(payload)).is_err() {
        log::debug!("dropping debounced delivery, dispatcher is shut down");
    }
}

/// Debounces notifications, delivering the whole burst as one batch
///
/// Unlike [`DebouncedListener`] no payload is discarded: every notification
/// of a burst is collected and handed to the callback in arrival order once
/// the quiet period elapses.
pub struct DebouncedAccumulator<T: Send + 'static> {
    tx: Sender<Scheduled<T>>,
    delay: Duration,
    enabled: Arc<AtomicBool>,
    dispatcher: Dispatcher,
    callback: Arc<dyn Fn(Vec<T>) + Send + Sync>,
}

impl<T: Send + 'static> DebouncedAccumulator<T> {
    /// Create an accumulator that forwards batches to `callback`
    pub fn new<F>(dispatcher: &Dispatcher, delay: Duration, callback: F) -> Self
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        let callback: Arc<dyn Fn(Vec<T>) + Send + Sync> = Arc::new(callback);
        let (tx, rx) = unbounded::<Scheduled<T>>();
        {
            let dispatcher = dispatcher.clone();
            let callback = Arc::clone(&callback);
            thread::Builder::new()
                .name("tiller-debounce-batch".into())
                .spawn(move || {
                    let mut batch: Vec<T> = Vec::new();
                    let mut deadline: Option<Instant> = None;
                    loop {
                        match deadline.take() {
                            None => match rx.recv() {
                                Ok(next) => {
                                    batch.push(next.payload);
                                    deadline = Some(next.deadline);
                                }
                                Err(_) => break,
                            },
                            Some(due) => {
                                let now = Instant::now();
                                if due <= now {
                                    flush(&dispatcher, &callback, &mut batch);
                                    continue;
                                }
                                match rx.recv_timeout(due - now) {
                                    Ok(next) => {
                                        batch.push(next.payload);
                                        deadline = Some(next.deadline);
                                    }
                                    Err(RecvTimeoutError::Timeout) => {
                                        flush(&dispatcher, &callback, &mut batch);
                                    }
                                    Err(RecvTimeoutError::Disconnected) => break,
                                }
                            }
                        }
                    }
                })
                .unwrap_or_else(|e| panic!("failed to spawn debounce timer thread: {}", e));
        }

        Self {
            tx,
            delay,
            enabled: Arc::new(AtomicBool::new(true)),
            dispatcher: dispatcher.clone(),
            callback,
        }
    }

    /// Handle a raw change notification
    pub fn notify(&self, payload: T) {
        if !self.enabled.load(Ordering::Acquire) {
            return;
        }
        if self.delay.is_zero() {
            let callback = Arc::clone(&self.callback);
            let _ = self.dispatcher.execute(move || callback(vec![payload]));
            return;
        }
        let _ = self.tx.send(Scheduled {
            payload,
            deadline: Instant::now() + self.delay,
        });
    }

    /// Enable or disable forwarding; disabled notifications are dropped
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Whether notifications are currently forwarded
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

fn flush<T: Send + 'static>(
    dispatcher: &Dispatcher,
    callback: &Arc<dyn Fn(Vec<T>) + Send + Sync>,
    batch: &mut Vec<T>,
) {
    if batch.is_empty() {
        return;
    }
    let payloads = std::mem::take(batch);
    let callback = Arc::clone(callback);
    if dispatcher.run_later(move || callback(payloads)).is_err() {
        log::debug!("dropping debounced batch delivery, dispatcher is shut down");
    }
}
