// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use eventhub_adapters::test_support::ManualScheduler;
use eventhub_core::Payload;
use parking_lot::Mutex as StdMutex;

struct RecordingCallback {
    responses: Arc<StdMutex<Vec<Event>>>,
    timeouts: Arc<StdMutex<usize>>,
}

impl ResponseCallback for RecordingCallback {
    fn on_response(&self, event: Event) {
        self.responses.lock().push(event);
    }

    fn on_timeout(&self) {
        *self.timeouts.lock() += 1;
    }
}

#[test]
fn resolve_invokes_callback_and_cancels_timeout() {
    let registry = Arc::new(ResponseListenerRegistry::new());
    let scheduler = ManualScheduler::new();
    let responses = Arc::new(StdMutex::new(Vec::new()));
    let timeouts = Arc::new(StdMutex::new(0));

    let trigger = Event::new("request", "src", Payload::new());
    registry.register(
        trigger.id(),
        Duration::from_millis(10_000),
        Box::new(RecordingCallback {
            responses: Arc::clone(&responses),
            timeouts: Arc::clone(&timeouts),
        }),
        &scheduler,
    );
    assert_eq!(registry.len(), 1);

    let response = Event::response_to(&trigger, "response", "src", Payload::new());
    registry.resolve(&response);

    assert_eq!(responses.lock().len(), 1);
    assert_eq!(*timeouts.lock(), 0);
    assert!(registry.is_empty());
    assert!(scheduler.is_cancelled(0));
}

#[test]
fn timeout_fires_when_scheduler_expires_it() {
    let registry = Arc::new(ResponseListenerRegistry::new());
    let scheduler = ManualScheduler::new();
    let responses = Arc::new(StdMutex::new(Vec::new()));
    let timeouts = Arc::new(StdMutex::new(0));

    let trigger = Event::new("request", "src", Payload::new());
    registry.register(
        trigger.id(),
        Duration::from_millis(50),
        Box::new(RecordingCallback {
            responses: Arc::clone(&responses),
            timeouts: Arc::clone(&timeouts),
        }),
        &scheduler,
    );

    scheduler.fire_all();

    assert_eq!(*timeouts.lock(), 1);
    assert!(registry.is_empty());

    let late_response = Event::response_to(&trigger, "response", "src", Payload::new());
    registry.resolve(&late_response);
    assert!(responses.lock().is_empty());
}

#[test]
fn resolve_without_matching_listener_is_a_no_op() {
    let registry = ResponseListenerRegistry::new();
    let orphan = Event::new("response", "src", Payload::new());
    registry.resolve(&orphan);
    assert!(registry.is_empty());
}

#[test]
fn two_listeners_on_the_same_trigger_both_resolve() {
    let registry = Arc::new(ResponseListenerRegistry::new());
    let scheduler = ManualScheduler::new();
    let responses_a = Arc::new(StdMutex::new(Vec::new()));
    let responses_b = Arc::new(StdMutex::new(Vec::new()));
    let timeouts = Arc::new(StdMutex::new(0));

    let trigger = Event::new("request", "src", Payload::new());
    registry.register(
        trigger.id(),
        Duration::from_millis(10_000),
        Box::new(RecordingCallback { responses: Arc::clone(&responses_a), timeouts: Arc::clone(&timeouts) }),
        &scheduler,
    );
    registry.register(
        trigger.id(),
        Duration::from_millis(10_000),
        Box::new(RecordingCallback { responses: Arc::clone(&responses_b), timeouts: Arc::clone(&timeouts) }),
        &scheduler,
    );
    assert_eq!(registry.len(), 2);

    let response = Event::response_to(&trigger, "response", "src", Payload::new());
    registry.resolve(&response);

    assert_eq!(responses_a.lock().len(), 1);
    assert_eq!(responses_b.lock().len(), 1);
    assert_eq!(*timeouts.lock(), 0);
    assert!(registry.is_empty());
    assert!(scheduler.is_cancelled(0));
    assert!(scheduler.is_cancelled(1));
}

#[test]
fn one_listener_timing_out_does_not_affect_a_sibling_on_the_same_trigger() {
    let registry = Arc::new(ResponseListenerRegistry::new());
    let scheduler = ManualScheduler::new();
    let responses_a = Arc::new(StdMutex::new(Vec::new()));
    let timeouts_a = Arc::new(StdMutex::new(0));
    let responses_b = Arc::new(StdMutex::new(Vec::new()));
    let timeouts_b = Arc::new(StdMutex::new(0));

    let trigger = Event::new("request", "src", Payload::new());
    registry.register(
        trigger.id(),
        Duration::from_millis(50),
        Box::new(RecordingCallback { responses: Arc::clone(&responses_a), timeouts: Arc::clone(&timeouts_a) }),
        &scheduler,
    );
    registry.register(
        trigger.id(),
        Duration::from_millis(10_000),
        Box::new(RecordingCallback { responses: Arc::clone(&responses_b), timeouts: Arc::clone(&timeouts_b) }),
        &scheduler,
    );
    assert_eq!(registry.len(), 2);

    scheduler.fire_expired(Duration::from_millis(50));

    assert_eq!(*timeouts_a.lock(), 1);
    assert_eq!(*timeouts_b.lock(), 0);
    assert_eq!(registry.len(), 1);

    let response = Event::response_to(&trigger, "response", "src", Payload::new());
    registry.resolve(&response);

    assert!(responses_a.lock().is_empty());
    assert_eq!(responses_b.lock().len(), 1);
    assert!(registry.is_empty());
}
