// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delayed-task scheduler capability.
//!
//! The hub depends on this abstractly so response-listener timeouts can be
//! tested without sleeping wall-clock time. `TokioScheduler` (the production
//! implementation) and `ManualScheduler` (the test double) live in the
//! adapters crate.

use std::time::Duration;

/// A handle to a scheduled task. `cancel` is idempotent: cancelling twice,
/// or cancelling after the task has already fired, is a no-op either way.
pub trait CancelHandle: Send + Sync {
    /// Cancel the pending task. `interrupt_if_running` mirrors the source
    /// API's `mayInterruptIfRunning` flag; the hub always passes `false`
    /// since a fired timeout callback is never still "running" by
    /// the time cancellation races it — it has already removed itself.
    fn cancel(&self, interrupt_if_running: bool);
}

/// Schedules a boxed closure to run once after `delay` elapses.
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run after `delay`. Returns a handle that can
    /// cancel the task before it fires.
    fn schedule_after(
        &self,
        delay: Duration,
        task: Box<dyn FnOnce() + Send>,
    ) -> Box<dyn CancelHandle>;
}
