// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration scenarios exercising a complete `EventHub` end to end,
//! mirroring the host's own top-level `tests/` integration suite.

use async_trait::async_trait;
use eventhub_adapters::test_support::{FakeIdGen, ManualScheduler};
use eventhub_core::{Event, FakeClock, HubConfig, IdGenerator, Payload, RegistrationError, Scheduler, SharedStateStatus, SharedStateType, Value};
use eventhub_engine::{Extension, ExtensionApi, ExtensionFactory, EventHub, EventListener, ResponseCallback};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex as AsyncMutex};

fn hub_with_manual_scheduler() -> (EventHub<FakeClock>, Arc<ManualScheduler>) {
    let scheduler = Arc::new(ManualScheduler::new());
    let id_gen: Arc<dyn IdGenerator> = Arc::new(FakeIdGen::new("scn-"));
    let hub = EventHub::new(HubConfig::default(), FakeClock::new(), Arc::clone(&scheduler) as Arc<dyn Scheduler>, id_gen);
    (hub, scheduler)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

struct ListenerExtension {
    name: &'static str,
    friendly: &'static str,
    event_type: &'static str,
    source: &'static str,
    seen: Arc<AsyncMutex<Vec<Event>>>,
}

#[async_trait]
impl Extension<FakeClock> for ListenerExtension {
    fn name(&self) -> &str {
        self.name
    }
    fn friendly_name(&self) -> &str {
        self.friendly
    }
    async fn on_registered(&self, api: &ExtensionApi<FakeClock>) -> Result<(), String> {
        let seen = Arc::clone(&self.seen);
        let callback: Arc<dyn EventListener> = Arc::new(move |event: Event| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().await.push(event);
            }
        });
        api.register_listener(self.event_type, self.source, callback).await;
        Ok(())
    }
    async fn on_unregistered(&self, _api: &ExtensionApi<FakeClock>) {}
}

fn register_listener_extension(
    hub: &EventHub<FakeClock>,
    name: &'static str,
    friendly: &'static str,
    event_type: &'static str,
    source: &'static str,
) -> (Arc<AsyncMutex<Vec<Event>>>, oneshot::Receiver<RegistrationError>) {
    let seen = Arc::new(AsyncMutex::new(Vec::new()));
    let seen_for_ext = Arc::clone(&seen);
    let (tx, rx) = oneshot::channel();
    let factory: ExtensionFactory<FakeClock> = Box::new(move || {
        Ok(Arc::new(ListenerExtension { name, friendly, event_type, source, seen: seen_for_ext })
            as Arc<dyn Extension<FakeClock>>)
    });
    hub.register_extension(
        factory,
        Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }),
    );
    (seen, rx)
}

#[tokio::test]
async fn scenario_1_two_extensions_one_event() {
    let (hub, _scheduler) = hub_with_manual_scheduler();
    hub.start();

    let (seen_a, done_a) = register_listener_extension(&hub, "scn.a", "A", "greet", "world");
    let (seen_b, done_b) = register_listener_extension(&hub, "scn.b", "B", "*", "*");
    assert_eq!(done_a.await.unwrap(), RegistrationError::None);
    assert_eq!(done_b.await.unwrap(), RegistrationError::None);

    hub.dispatch(Event::new("greet", "world", Payload::new()));
    settle().await;

    let a_events = seen_a.lock().await;
    let matching_a: Vec<_> = a_events.iter().filter(|e| e.event_type() == "greet").collect();
    assert_eq!(matching_a.len(), 1);
    let assigned_number = matching_a[0].event_number();
    assert!(assigned_number.is_some());

    let b_events = seen_b.lock().await;
    let matching_b: Vec<_> = b_events.iter().filter(|e| e.event_type() == "greet").collect();
    assert_eq!(matching_b.len(), 1);
    assert_eq!(matching_b[0].event_number(), assigned_number);
}

struct RecordingResponseCallback {
    calls: Arc<AtomicUsize>,
    timeouts: Arc<AtomicUsize>,
}

impl ResponseCallback for RecordingResponseCallback {
    fn on_response(&self, _event: Event) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
    fn on_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn scenario_2_response_timeout() {
    let (hub, scheduler) = hub_with_manual_scheduler();
    hub.start();

    let trigger = Event::new("request", "src", Payload::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let timeouts = Arc::new(AtomicUsize::new(0));
    hub.register_response_listener(
        trigger.id(),
        Duration::from_millis(50),
        Box::new(RecordingResponseCallback { calls: Arc::clone(&calls), timeouts: Arc::clone(&timeouts) }),
    )
    .await;

    scheduler.fire_expired(Duration::from_millis(50));
    assert_eq!(timeouts.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    hub.dispatch(Event::response_to(&trigger, "response", "src", Payload::new()));
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn scenario_3_response_success() {
    let (hub, _scheduler) = hub_with_manual_scheduler();
    hub.start();

    let trigger = Event::new("request", "src", Payload::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let timeouts = Arc::new(AtomicUsize::new(0));
    hub.register_response_listener(
        trigger.id(),
        Duration::from_millis(10_000),
        Box::new(RecordingResponseCallback { calls: Arc::clone(&calls), timeouts: Arc::clone(&timeouts) }),
    )
    .await;

    hub.dispatch(Event::response_to(&trigger, "response", "src", Payload::new()));
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(timeouts.load(Ordering::SeqCst), 0);

    hub.dispatch(Event::response_to(&trigger, "response", "src", Payload::new()));
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(timeouts.load(Ordering::SeqCst), 0);
}

struct NoopExtension {
    name: &'static str,
}

#[async_trait]
impl Extension<FakeClock> for NoopExtension {
    fn name(&self) -> &str {
        self.name
    }
    fn friendly_name(&self) -> &str {
        self.name
    }
    async fn on_registered(&self, _api: &ExtensionApi<FakeClock>) -> Result<(), String> {
        Ok(())
    }
    async fn on_unregistered(&self, _api: &ExtensionApi<FakeClock>) {}
}

async fn registered_hub_with_extension(name: &'static str) -> EventHub<FakeClock> {
    let (hub, _scheduler) = hub_with_manual_scheduler();
    hub.start();
    let (tx, rx) = oneshot::channel();
    let factory: ExtensionFactory<FakeClock> =
        Box::new(move || Ok(Arc::new(NoopExtension { name }) as Arc<dyn Extension<FakeClock>>));
    hub.register_extension(
        factory,
        Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }),
    );
    assert_eq!(rx.await.unwrap(), RegistrationError::None);
    hub
}

#[tokio::test]
async fn scenario_4_state_at_event() {
    let hub = registered_hub_with_extension("scn.state").await;

    let e1 = Event::new("n", "s", Payload::new());
    let e2 = Event::new("n", "s", Payload::new());
    hub.dispatch(e1.clone());
    hub.dispatch(e2.clone());
    settle().await;

    let mut v1 = Payload::new();
    v1.insert("k".to_string(), Value::from("v1"));
    let mut v2 = Payload::new();
    v2.insert("k".to_string(), Value::from("v2"));

    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "scn.state", Some(v1.clone()), Some(&e1)).await,
        SharedStateStatus::Set
    );
    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "scn.state", Some(v2.clone()), Some(&e2)).await,
        SharedStateStatus::Set
    );

    assert_eq!(hub.get_shared_state(SharedStateType::Standard, "scn.state", Some(&e1)).await, Some(v1));
    assert_eq!(hub.get_shared_state(SharedStateType::Standard, "scn.state", Some(&e2)).await, Some(v2.clone()));
    assert_eq!(hub.get_shared_state(SharedStateType::Standard, "scn.state", None).await, Some(v2));
}

#[tokio::test]
async fn scenario_5_pending_resolved() {
    let hub = registered_hub_with_extension("scn.pending").await;

    let e1 = Event::new("n", "s", Payload::new());
    hub.dispatch(e1.clone());
    settle().await;

    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "scn.pending", None, Some(&e1)).await,
        SharedStateStatus::Pending
    );
    assert_eq!(hub.get_shared_state(SharedStateType::Standard, "scn.pending", Some(&e1)).await, None);

    let mut data = Payload::new();
    data.insert("k".to_string(), Value::from("v"));
    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "scn.pending", Some(data.clone()), Some(&e1)).await,
        SharedStateStatus::Set
    );
    assert_eq!(hub.get_shared_state(SharedStateType::Standard, "scn.pending", Some(&e1)).await, Some(data));
}

#[tokio::test]
async fn scenario_6_bad_name() {
    let (hub, _scheduler) = hub_with_manual_scheduler();
    hub.start();

    let status = hub.set_shared_state(SharedStateType::Standard, "", None, None).await;
    assert_eq!(status, SharedStateStatus::NotSet);
}
