// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production [`Scheduler`] backed by the tokio runtime.

use eventhub_core::{CancelHandle, Scheduler};
use std::time::Duration;
use tokio::task::JoinHandle;

struct TokioCancelHandle(JoinHandle<()>);

impl CancelHandle for TokioCancelHandle {
    fn cancel(&self, _interrupt_if_running: bool) {
        self.0.abort();
    }
}

/// Schedules delayed tasks as spawned tokio tasks gated on `time::sleep`.
/// Requires a running tokio runtime at `schedule_after` call time.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(
        &self,
        delay: Duration,
        task: Box<dyn FnOnce() + Send>,
    ) -> Box<dyn CancelHandle> {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        Box::new(TokioCancelHandle(handle))
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
