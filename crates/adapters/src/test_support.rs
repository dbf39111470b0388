// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles for [`Scheduler`] and [`IdGenerator`], gated behind
//! the `test-support` feature so production builds never pull them in.

use eventhub_core::{CancelHandle, IdGenerator, Scheduler};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct ManualTask {
    delay: Duration,
    cancelled: Arc<AtomicBool>,
    task: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

struct ManualCancelHandle(Arc<AtomicBool>);

impl CancelHandle for ManualCancelHandle {
    fn cancel(&self, _interrupt_if_running: bool) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A [`Scheduler`] that never sleeps wall-clock time. Tests drive it
/// explicitly with [`Self::fire_all`] or [`Self::fire_expired`] so
/// response-listener timeout scenarios run instantly.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<ManualTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self { tasks: Mutex::new(Vec::new()) }
    }

    /// Run every task registered so far that has not been cancelled, in
    /// registration order, regardless of its requested delay.
    pub fn fire_all(&self) {
        let tasks = self.tasks.lock();
        for entry in tasks.iter() {
            if entry.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            if let Some(task) = entry.task.lock().take() {
                task();
            }
        }
    }

    /// Run every non-cancelled task whose delay is `<= elapsed`.
    pub fn fire_expired(&self, elapsed: Duration) {
        let tasks = self.tasks.lock();
        for entry in tasks.iter() {
            if entry.delay > elapsed || entry.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            if let Some(task) = entry.task.lock().take() {
                task();
            }
        }
    }

    /// Whether the task registered at `index` (in registration order) has
    /// been cancelled.
    pub fn is_cancelled(&self, index: usize) -> bool {
        self.tasks.lock()[index].cancelled.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.lock().iter().filter(|t| t.task.lock().is_some()).count()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(
        &self,
        delay: Duration,
        task: Box<dyn FnOnce() + Send>,
    ) -> Box<dyn CancelHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.tasks.lock().push(ManualTask {
            delay,
            cancelled: Arc::clone(&cancelled),
            task: Mutex::new(Some(task)),
        });
        Box::new(ManualCancelHandle(cancelled))
    }
}

/// Deterministic, sequential id generator for tests that need to assert on
/// exact ids rather than merely on uniqueness.
pub struct FakeIdGen {
    prefix: String,
    next: AtomicU64,
}

impl FakeIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: AtomicU64::new(1) }
    }
}

impl IdGenerator for FakeIdGen {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
