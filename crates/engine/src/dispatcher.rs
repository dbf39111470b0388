// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Serial Work Dispatcher: a generic single-consumer ordered
//! queue driving one `WorkHandler<T>` at a time. Used both as the hub's own
//! dispatch lane and inside every [`crate::container::ExtensionContainer`].

use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Invoked once per queued item, in FIFO order. At most one invocation is
/// ever in flight per dispatcher.
#[async_trait]
pub trait WorkHandler<T>: Send + Sync {
    async fn handle(&self, item: T);
}

#[async_trait]
impl<T, F, Fut> WorkHandler<T> for F
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send,
{
    async fn handle(&self, item: T) {
        (self)(item).await
    }
}

/// Lifecycle state of a [`SerialDispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    NotStarted,
    Active,
    Paused,
    Shutdown,
}

/// A generic, reusable serial dispatch primitive.
///
/// Built on a single `mpsc::unbounded_channel` feeding one spawned worker
/// task. Pause/resume and shutdown are modeled with a `watch` channel rather
/// than a bare atomic + `Notify`: `watch::Receiver::changed()` can never miss
/// a transition the way a `Notify` can if the wake arrives between the
/// waiter's state check and its subscribe, which matters here because a
/// missed wakeup would mean a paused or shut-down dispatcher hangs forever.
pub struct SerialDispatcher<T: Send + 'static> {
    name: String,
    tx: mpsc::UnboundedSender<T>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<T>>>,
    state_tx: watch::Sender<DispatcherState>,
    state_rx: watch::Receiver<DispatcherState>,
}

impl<T: Send + 'static> SerialDispatcher<T> {
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(DispatcherState::NotStarted);
        Self { name: name.into(), tx, rx: Mutex::new(Some(rx)), state_tx, state_rx }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> DispatcherState {
        *self.state_rx.borrow()
    }

    /// Enqueue `item` at the tail. Returns `false` (without enqueuing) once
    /// the dispatcher has been shut down.
    pub fn offer(&self, item: T) -> bool {
        if self.state() == DispatcherState::Shutdown {
            tracing::warn!(dispatcher = %self.name, "offer rejected: dispatcher is shut down");
            return false;
        }
        match self.tx.send(item) {
            Ok(()) => {
                tracing::trace!(dispatcher = %self.name, "item offered");
                true
            }
            Err(_) => false,
        }
    }

    /// Start draining. If `initial_job` is present it is awaited first; a
    /// failing initial job shuts the dispatcher down without ever draining,
    /// discarding anything already queued (startup barrier).
    ///
    /// Valid only from `NotStarted`; calling twice is a no-op (logged).
    pub async fn start(
        &self,
        handler: Arc<dyn WorkHandler<T>>,
        initial_job: Option<BoxFuture<'static, Result<(), String>>>,
        final_job: Option<Box<dyn FnOnce() + Send>>,
    ) {
        if self.state() != DispatcherState::NotStarted {
            tracing::warn!(dispatcher = %self.name, "start() called more than once; ignored");
            return;
        }

        if let Some(job) = initial_job {
            if let Err(err) = job.await {
                tracing::error!(
                    dispatcher = %self.name,
                    error = %err,
                    "initial job failed; shutting down without draining"
                );
                let _ = self.state_tx.send(DispatcherState::Shutdown);
                if let Some(mut rx) = self.rx.lock().take() {
                    rx.close();
                    while rx.try_recv().is_ok() {}
                }
                if let Some(fin) = final_job {
                    fin();
                }
                return;
            }
        }

        let _ = self.state_tx.send(DispatcherState::Active);
        let rx = self.rx.lock().take().expect("dispatcher started twice");
        let name = self.name.clone();
        let state_rx = self.state_rx.clone();
        tokio::spawn(Self::drain_loop(name, rx, handler, state_rx, final_job));
    }

    /// Halt draining. Offers are still accepted and queue up.
    pub fn pause(&self) {
        if self.state() == DispatcherState::Active {
            let _ = self.state_tx.send(DispatcherState::Paused);
        }
    }

    /// Re-arm draining after [`Self::pause`].
    pub fn resume(&self) {
        if self.state() == DispatcherState::Paused {
            let _ = self.state_tx.send(DispatcherState::Active);
        }
    }

    /// Drop remaining queued items, refuse future offers, and (if the
    /// dispatcher was ever started) run the final job exactly once.
    pub fn shutdown(&self) {
        let _ = self.state_tx.send(DispatcherState::Shutdown);
    }

    async fn drain_loop(
        name: String,
        mut rx: mpsc::UnboundedReceiver<T>,
        handler: Arc<dyn WorkHandler<T>>,
        mut state_rx: watch::Receiver<DispatcherState>,
        final_job: Option<Box<dyn FnOnce() + Send>>,
    ) {
        loop {
            while *state_rx.borrow() == DispatcherState::Paused {
                if state_rx.changed().await.is_err() {
                    break;
                }
            }
            if *state_rx.borrow() == DispatcherState::Shutdown {
                break;
            }

            tokio::select! {
                biased;
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                popped = rx.recv() => {
                    match popped {
                        Some(item) => {
                            if *state_rx.borrow() == DispatcherState::Shutdown {
                                break;
                            }
                            tracing::trace!(dispatcher = %name, "item popped");
                            let handler = Arc::clone(&handler);
                            if let Err(panic) = tokio::spawn(async move { handler.handle(item).await }).await {
                                tracing::error!(
                                    dispatcher = %name,
                                    error = %panic,
                                    "work handler panicked; item treated as processed"
                                );
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        if let Some(fin) = final_job {
            fin();
        }
        tracing::debug!(dispatcher = %name, "dispatcher shut down");
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
