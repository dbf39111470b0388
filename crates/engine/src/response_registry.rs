// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Response-Listener Registry: one-shot callbacks keyed by
//! a trigger event's id, each racing its own timeout.

use eventhub_core::{CancelHandle, Event, EventId, Scheduler};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Exactly one of `on_response`/`on_timeout` is ever invoked for a given
/// registration.
pub trait ResponseCallback: Send + Sync {
    fn on_response(&self, event: Event);
    fn on_timeout(&self);
}

/// Identifies one registration among the possibly several sharing a
/// `trigger_id`, so its timeout can remove only itself from the slot.
type SlotId = u64;

struct Entry {
    slot: SlotId,
    timeout_handle: Box<dyn CancelHandle>,
    callback: Box<dyn ResponseCallback>,
}

/// Owned by the hub. Mutations (insert on register, remove on resolve or
/// timeout) are confined to short critical sections; no callback is ever
/// invoked while the lock is held ("no locks held across callbacks"). More
/// than one listener may share a `trigger_id`; each is tracked independently
/// so that registering a second listener for the same id never drops the
/// first one's timeout or callback.
pub struct ResponseListenerRegistry {
    entries: Mutex<HashMap<EventId, Vec<Entry>>>,
    next_slot: AtomicU64,
}

impl ResponseListenerRegistry {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()), next_slot: AtomicU64::new(0) }
    }

    /// Register a one-shot listener for responses to `trigger_id`, racing a
    /// `timeout` deadline scheduled via `scheduler`. `self` must be held as
    /// an `Arc` because the scheduled timeout task needs to reach back into
    /// the registry after `register` returns.
    pub fn register(
        self: &Arc<Self>,
        trigger_id: EventId,
        timeout: Duration,
        callback: Box<dyn ResponseCallback>,
        scheduler: &dyn Scheduler,
    ) {
        let slot = self.next_slot.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(self);
        let timeout_trigger_id = trigger_id.clone();
        let timeout_handle = scheduler.schedule_after(
            timeout,
            Box::new(move || {
                registry.fire_timeout(&timeout_trigger_id, slot);
            }),
        );
        let entry = Entry { slot, timeout_handle, callback };
        self.entries.lock().entry(trigger_id).or_default().push(entry);
    }

    /// Called from the hub dispatch lane for every event whose
    /// `response_id` is set. Atomically extracts and resolves every listener
    /// registered for that trigger id.
    pub fn resolve(&self, event: &Event) {
        let Some(trigger_id) = event.response_id() else {
            return;
        };
        let entries = self.entries.lock().remove(&trigger_id).unwrap_or_default();
        for entry in entries {
            entry.timeout_handle.cancel(false);
            entry.callback.on_response(event.clone());
        }
    }

    fn fire_timeout(&self, trigger_id: &EventId, slot: SlotId) {
        let entry = {
            let mut entries = self.entries.lock();
            let removed = entries.get_mut(trigger_id).and_then(|slots| {
                let index = slots.iter().position(|e| e.slot == slot)?;
                Some(slots.remove(index))
            });
            if entries.get(trigger_id).is_some_and(Vec::is_empty) {
                entries.remove(trigger_id);
            }
            removed
        };
        if let Some(entry) = entry {
            tracing::warn!(event_id = %trigger_id, "response listener timed out");
            entry.callback.on_timeout();
        }
    }

    /// Number of listeners still pending resolution or timeout; exposed for
    /// tests and shutdown bookkeeping.
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "response_registry_tests.rs"]
mod tests;
