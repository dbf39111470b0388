// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Event Hub façade: the single serialization point for
//! registration, dispatch, state set/get/clear, response-listener
//! installation, start, and shutdown.
//!
//! "Global singleton" design note: the source exposes a process-wide
//! hub instance. Here `EventHub<C>` is an explicit, `Clone`-able, `Arc`-backed
//! handle the host constructs and passes to extensions; nothing in this
//! crate reaches for a hidden global.

use crate::container::{ContainerState, ExtensionContainer};
use crate::dispatcher::{SerialDispatcher, WorkHandler};
use crate::extension::{EventListener, ExtensionApi, ExtensionFactory};
use crate::response_registry::{ResponseCallback, ResponseListenerRegistry};
use crate::shared_state_manager::SharedStateManager;
use async_trait::async_trait;
use eventhub_core::{
    Clock, Event, EventId, EventNumberCounter, ExtensionError, HubConfig, IdGenerator, Payload,
    RegistrationError, Scheduler, SharedStateStatus, SharedStateType, Value, VERSION_LATEST,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Declared name of the built-in placeholder extension. Reserved:
/// refused both as a registration target and as an `unregisterExtension`
/// target (open question resolution, recorded in DESIGN.md).
pub const PLACEHOLDER_EXTENSION_NAME: &str = "com.adobe.module.eventhub";

const HUB_SHARED_STATE_TYPE: &str = "com.adobe.eventType.hub";
const HUB_SHARED_STATE_SOURCE: &str = "com.adobe.eventSource.sharedState";

enum HubCommand<C: Clock + 'static> {
    RegisterExtension {
        factory: ExtensionFactory<C>,
        completion: Box<dyn FnOnce(RegistrationError) + Send>,
    },
    UnregisterExtension {
        name: String,
        completion: Box<dyn FnOnce(RegistrationError) + Send>,
    },
    Dispatch(Event),
    SetSharedState {
        extension_name: String,
        state_type: SharedStateType,
        data: Option<Payload>,
        for_event: Option<EventId>,
        respond: oneshot::Sender<Result<SharedStateStatus, ExtensionError>>,
    },
    GetSharedState {
        extension_name: String,
        state_type: SharedStateType,
        for_event: Option<EventId>,
        respond: oneshot::Sender<Result<Option<Payload>, ExtensionError>>,
    },
    ClearSharedState {
        extension_name: String,
        state_type: SharedStateType,
        respond: oneshot::Sender<Result<bool, ExtensionError>>,
    },
    Start,
    Shutdown {
        respond: oneshot::Sender<()>,
    },
}

struct HubInner<C: Clock> {
    config: HubConfig,
    clock: C,
    scheduler: Arc<dyn Scheduler>,
    id_gen: Arc<dyn IdGenerator>,
    registry: RwLock<HashMap<String, Arc<ExtensionContainer>>>,
    counter: EventNumberCounter,
    event_number_map: Mutex<HashMap<EventId, eventhub_core::EventNumber>>,
    response_registry: Arc<ResponseListenerRegistry>,
    dispatch_lane: SerialDispatcher<Event>,
    hub_lane: SerialDispatcher<HubCommand<C>>,
    started: AtomicBool,
    history: Mutex<Option<VecDeque<Event>>>,
}

/// The hub façade. Cheap to `Clone` (an `Arc` bump); every clone refers to
/// the same hub lane, dispatch lane, registry, and response registry.
pub struct EventHub<C: Clock + 'static> {
    inner: Arc<HubInner<C>>,
}

impl<C: Clock + 'static> Clone for EventHub<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: Clock + 'static> EventHub<C> {
    pub fn new(
        config: HubConfig,
        clock: C,
        scheduler: Arc<dyn Scheduler>,
        id_gen: Arc<dyn IdGenerator>,
    ) -> Self {
        let placeholder = Arc::new(ExtensionContainer::new(
            PLACEHOLDER_EXTENSION_NAME.to_string(),
            config.hub_friendly_name.clone(),
            env!("CARGO_PKG_VERSION").to_string(),
        ));
        let mut registry = HashMap::new();
        registry.insert(PLACEHOLDER_EXTENSION_NAME.to_string(), Arc::clone(&placeholder));

        let history = Mutex::new(config.event_history_capacity.map(VecDeque::new));

        let inner = Arc::new(HubInner {
            config,
            clock,
            scheduler,
            id_gen,
            registry: RwLock::new(registry),
            counter: EventNumberCounter::new(),
            event_number_map: Mutex::new(HashMap::new()),
            response_registry: Arc::new(ResponseListenerRegistry::new()),
            dispatch_lane: SerialDispatcher::new("hub-dispatch"),
            hub_lane: SerialDispatcher::new("hub-lane"),
            started: AtomicBool::new(false),
            history,
        });

        let hub = Self { inner };

        let hub_for_lane = hub.clone();
        tokio::spawn(async move {
            let handler: Arc<dyn WorkHandler<HubCommand<C>>> =
                Arc::new(HubLaneHandler { hub: hub_for_lane.clone() });
            hub_for_lane.inner.hub_lane.start(handler, None, None).await;
        });

        tokio::spawn(async move { placeholder.start_builtin().await });

        hub
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    pub fn clock(&self) -> &C {
        &self.inner.clock
    }

    pub fn id_generator(&self) -> &Arc<dyn IdGenerator> {
        &self.inner.id_gen
    }

    /// Fire-and-forget: assigns the next event number on the hub lane, then
    /// offers the event into the hub dispatch lane.
    pub fn dispatch(&self, event: Event) {
        self.inner.hub_lane.offer(HubCommand::Dispatch(event));
    }

    pub fn register_extension(
        &self,
        factory: ExtensionFactory<C>,
        completion: Box<dyn FnOnce(RegistrationError) + Send>,
    ) {
        self.inner.hub_lane.offer(HubCommand::RegisterExtension { factory, completion });
    }

    pub fn unregister_extension(
        &self,
        name: impl Into<String>,
        completion: Box<dyn FnOnce(RegistrationError) + Send>,
    ) {
        self.inner
            .hub_lane
            .offer(HubCommand::UnregisterExtension { name: name.into(), completion });
    }

    pub async fn set_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: &str,
        data: Option<Payload>,
        for_event: Option<&Event>,
    ) -> SharedStateStatus {
        let (tx, rx) = oneshot::channel();
        self.inner.hub_lane.offer(HubCommand::SetSharedState {
            extension_name: extension_name.to_string(),
            state_type,
            data,
            for_event: for_event.map(|e| e.id()),
            respond: tx,
        });
        rx.await.unwrap_or(Err(ExtensionError::UnexpectedError)).unwrap_or(SharedStateStatus::NotSet)
    }

    pub async fn get_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: &str,
        for_event: Option<&Event>,
    ) -> Option<Payload> {
        let (tx, rx) = oneshot::channel();
        self.inner.hub_lane.offer(HubCommand::GetSharedState {
            extension_name: extension_name.to_string(),
            state_type,
            for_event: for_event.map(|e| e.id()),
            respond: tx,
        });
        rx.await.unwrap_or(Err(ExtensionError::UnexpectedError)).unwrap_or(None)
    }

    pub async fn clear_shared_state(&self, state_type: SharedStateType, extension_name: &str) -> bool {
        let (tx, rx) = oneshot::channel();
        self.inner.hub_lane.offer(HubCommand::ClearSharedState {
            extension_name: extension_name.to_string(),
            state_type,
            respond: tx,
        });
        rx.await.unwrap_or(Err(ExtensionError::UnexpectedError)).unwrap_or(false)
    }

    /// Attaches a listener directly to a container's table; when
    /// `extension_name` is `None` it attaches to the hub placeholder
    /// extension (unattributed `registerListener`). Registry lookups
    /// are lock-protected reads, safe from any task without hub-lane
    /// serialization.
    pub(crate) async fn register_listener_for(
        &self,
        extension_name: Option<String>,
        event_type: String,
        source: String,
        callback: Arc<dyn EventListener>,
    ) {
        let key = extension_name.as_deref().unwrap_or(PLACEHOLDER_EXTENSION_NAME).to_string();
        let container = self.inner.registry.read().get(&key).cloned();
        match container {
            Some(container) => container.register_listener(event_type, source, callback),
            None => tracing::warn!(extension = %key, "register_listener: unknown extension"),
        }
    }

    pub async fn register_listener(
        &self,
        event_type: impl Into<String>,
        source: impl Into<String>,
        callback: Arc<dyn EventListener>,
    ) {
        self.register_listener_for(None, event_type.into(), source.into(), callback).await;
    }

    /// Response-listener registrations mutate `ResponseListenerRegistry`,
    /// which is self-synchronizing ("concurrent collection"); no
    /// hub-lane round trip is needed for correctness.
    pub async fn register_response_listener(
        &self,
        trigger_id: EventId,
        timeout: Duration,
        callback: Box<dyn ResponseCallback>,
    ) {
        let timeout = if timeout.is_zero() {
            self.inner.config.response_listener_default_timeout
        } else {
            timeout
        };
        self.inner.response_registry.register(
            trigger_id,
            timeout,
            callback,
            self.inner.scheduler.as_ref(),
        );
    }

    pub fn start(&self) {
        self.inner.hub_lane.offer(HubCommand::Start);
    }

    /// Drains the registry and the dispatch lane before tearing down the hub
    /// lane itself. The teardown runs as a command handled *on* the hub lane,
    /// so it is awaited to completion here rather than racing the hub lane's
    /// own `shutdown()` — `offer()` and `shutdown()` have no await between
    /// them, and the lane's `watch`-channel state check is `biased` over
    /// draining the queue, so calling `hub_lane.shutdown()` right after
    /// offering would make the drain loop observe `Shutdown` before it ever
    /// pops the command off the queue.
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        self.inner.hub_lane.offer(HubCommand::Shutdown { respond: tx });
        let _ = rx.await;
        self.inner.hub_lane.shutdown();
    }

    fn record_history(&self, event: Event) {
        let mut history = self.inner.history.lock();
        if let Some(buf) = history.as_mut() {
            let capacity = self.inner.config.event_history_capacity.unwrap_or(usize::MAX);
            if buf.len() >= capacity {
                buf.pop_front();
            }
            buf.push_back(event);
        }
    }

    /// Snapshot of the bounded event-history sink, most recent last.
    pub fn history(&self) -> Vec<Event> {
        self.inner.history.lock().as_ref().map(|b| b.iter().cloned().collect()).unwrap_or_default()
    }

    async fn republish_hub_state(&self) {
        if !self.inner.started.load(Ordering::SeqCst) {
            return;
        }
        let version = self.inner.counter.next();

        let extensions_json: serde_json::Map<String, serde_json::Value> = self
            .inner
            .registry
            .read()
            .values()
            .filter(|c| c.name() != PLACEHOLDER_EXTENSION_NAME)
            .map(|c| {
                (
                    c.friendly_name().to_string(),
                    serde_json::json!({ "version": version, "friendlyName": c.friendly_name() }),
                )
            })
            .collect();
        let snapshot: Value =
            serde_json::json!({ "version": version, "extensions": extensions_json }).into();
        let payload = snapshot.as_map().cloned().unwrap_or_default();

        let placeholder = self.inner.registry.read().get(PLACEHOLDER_EXTENSION_NAME).cloned();
        if let Some(placeholder) = placeholder {
            placeholder.shared_states(SharedStateType::Standard).set(Some(payload), version);
        }

        let mut notification = Payload::new();
        notification.insert("stateowner".to_string(), Value::from(PLACEHOLDER_EXTENSION_NAME));
        self.dispatch(Event::new(HUB_SHARED_STATE_TYPE, HUB_SHARED_STATE_SOURCE, notification));
    }
}

struct HubLaneHandler<C: Clock + 'static> {
    hub: EventHub<C>,
}

#[async_trait]
impl<C: Clock + 'static> WorkHandler<HubCommand<C>> for HubLaneHandler<C> {
    async fn handle(&self, command: HubCommand<C>) {
        let hub = &self.hub;
        match command {
            HubCommand::RegisterExtension { factory, completion } => {
                handle_register_extension(hub, factory, completion).await;
            }
            HubCommand::UnregisterExtension { name, completion } => {
                handle_unregister_extension(hub, name, completion).await;
            }
            HubCommand::Dispatch(mut event) => {
                let number = hub.inner.counter.next();
                event.assign_event_number(number);
                event.assign_timestamp_ms(hub.inner.clock.epoch_ms());
                hub.inner.event_number_map.lock().insert(event.id(), number);
                tracing::trace!(event_id = %event.id(), event_number = number, "event accepted");
                hub.inner.dispatch_lane.offer(event);
            }
            HubCommand::SetSharedState { extension_name, state_type, data, for_event, respond } => {
                handle_set_shared_state(hub, extension_name, state_type, data, for_event, respond)
                    .await;
            }
            HubCommand::GetSharedState { extension_name, state_type, for_event, respond } => {
                handle_get_shared_state(hub, extension_name, state_type, for_event, respond).await;
            }
            HubCommand::ClearSharedState { extension_name, state_type, respond } => {
                let _ = respond.send(clear_shared_state_sync(hub, &extension_name, state_type));
            }
            HubCommand::Start => {
                hub.inner.started.store(true, Ordering::SeqCst);
                let dispatch_handler: Arc<dyn WorkHandler<Event>> =
                    Arc::new(HubDispatchHandler { hub: hub.clone() });
                hub.inner.dispatch_lane.start(dispatch_handler, None, None).await;
                tracing::debug!("hub started");
                hub.republish_hub_state().await;
            }
            HubCommand::Shutdown { respond } => {
                hub.inner.dispatch_lane.shutdown();
                let containers: Vec<Arc<ExtensionContainer>> =
                    hub.inner.registry.write().drain().map(|(_, c)| c).collect();
                for container in containers {
                    container.shutdown();
                }
                tracing::debug!("hub shut down");
                let _ = respond.send(());
            }
        }
    }
}

async fn handle_register_extension<C: Clock + 'static>(
    hub: &EventHub<C>,
    factory: ExtensionFactory<C>,
    completion: Box<dyn FnOnce(RegistrationError) + Send>,
) {
    let extension = match factory() {
        Ok(ext) => ext,
        Err(err) => {
            tracing::error!(error = %err, "extension factory failed");
            completion(RegistrationError::ExtensionInitializationFailure);
            return;
        }
    };

    let name = extension.name().to_string();
    if name.trim().is_empty() {
        completion(RegistrationError::InvalidExtensionName);
        return;
    }

    {
        let registry = hub.inner.registry.read();
        if registry.contains_key(&name) {
            completion(RegistrationError::DuplicateExtensionName);
            return;
        }
    }

    let friendly_name = extension.friendly_name().to_string();
    let version = extension.version().to_string();
    let container = Arc::new(ExtensionContainer::new(name.clone(), friendly_name, version));
    hub.inner.registry.write().insert(name.clone(), Arc::clone(&container));

    let api = ExtensionApi::new(hub.clone(), name.clone());
    let hub_for_completion = hub.clone();
    let registered_name = name.clone();
    tokio::spawn(async move {
        container.start(extension, api).await;
        if container.state() == ContainerState::Registered {
            tracing::debug!(extension = %registered_name, "extension registered");
            hub_for_completion.republish_hub_state().await;
            completion(RegistrationError::None);
        } else {
            completion(RegistrationError::ExtensionInitializationFailure);
        }
    });
}

async fn handle_unregister_extension<C: Clock + 'static>(
    hub: &EventHub<C>,
    name: String,
    completion: Box<dyn FnOnce(RegistrationError) + Send>,
) {
    if name == PLACEHOLDER_EXTENSION_NAME {
        completion(RegistrationError::ExtensionNotRegistered);
        return;
    }

    let removed = hub.inner.registry.write().remove(&name);
    match removed {
        Some(container) => {
            container.shutdown();
            tracing::debug!(extension = %name, "extension unregistered");
            completion(RegistrationError::None);
            hub.republish_hub_state().await;
        }
        None => completion(RegistrationError::ExtensionNotRegistered),
    }
}

async fn handle_set_shared_state<C: Clock + 'static>(
    hub: &EventHub<C>,
    extension_name: String,
    state_type: SharedStateType,
    data: Option<Payload>,
    for_event: Option<EventId>,
    respond: oneshot::Sender<Result<SharedStateStatus, ExtensionError>>,
) {
    if extension_name.trim().is_empty() {
        tracing::warn!("set_shared_state: empty extension name");
        let _ = respond.send(Err(ExtensionError::BadName));
        return;
    }
    let container = hub.inner.registry.read().get(&extension_name).cloned();
    let Some(container) = container else {
        tracing::warn!(extension = %extension_name, "set_shared_state: unknown extension");
        let _ = respond.send(Err(ExtensionError::BadName));
        return;
    };

    let version = match for_event {
        Some(id) => hub
            .inner
            .event_number_map
            .lock()
            .get(&id)
            .copied()
            .unwrap_or_else(|| hub.inner.counter.next()),
        None => hub.inner.counter.next(),
    };

    let status = container.shared_states(state_type).set(data, version);
    let _ = respond.send(Ok(status));

    if status == SharedStateStatus::Set {
        let mut notification = Payload::new();
        notification.insert("stateowner".to_string(), Value::from(extension_name.as_str()));
        notification.insert("statetype".to_string(), Value::from(state_type.to_string().as_str()));
        hub.dispatch(Event::new(HUB_SHARED_STATE_TYPE, HUB_SHARED_STATE_SOURCE, notification));
    }
}

async fn handle_get_shared_state<C: Clock + 'static>(
    hub: &EventHub<C>,
    extension_name: String,
    state_type: SharedStateType,
    for_event: Option<EventId>,
    respond: oneshot::Sender<Result<Option<Payload>, ExtensionError>>,
) {
    if extension_name.trim().is_empty() {
        let _ = respond.send(Err(ExtensionError::BadName));
        return;
    }
    let container = hub.inner.registry.read().get(&extension_name).cloned();
    let Some(container) = container else {
        let _ = respond.send(Err(ExtensionError::BadName));
        return;
    };

    let version = match for_event {
        Some(id) => {
            hub.inner.event_number_map.lock().get(&id).copied().unwrap_or(VERSION_LATEST)
        }
        None => VERSION_LATEST,
    };

    let _ = respond.send(Ok(container.shared_states(state_type).get(version)));
}

fn clear_shared_state_sync<C: Clock + 'static>(
    hub: &EventHub<C>,
    extension_name: &str,
    state_type: SharedStateType,
) -> Result<bool, ExtensionError> {
    if extension_name.trim().is_empty() {
        return Err(ExtensionError::BadName);
    }
    let container = hub.inner.registry.read().get(extension_name).cloned();
    match container {
        Some(container) => {
            container.shared_states(state_type).clear();
            Ok(true)
        }
        None => Err(ExtensionError::BadName),
    }
}

struct HubDispatchHandler<C: Clock + 'static> {
    hub: EventHub<C>,
}

#[async_trait]
impl<C: Clock + 'static> WorkHandler<Event> for HubDispatchHandler<C> {
    async fn handle(&self, event: Event) {
        self.hub.inner.response_registry.resolve(&event);

        let containers: Vec<Arc<ExtensionContainer>> = {
            let registry = self.hub.inner.registry.read();
            registry
                .values()
                .filter(|c| c.state() == ContainerState::Registered)
                .cloned()
                .collect()
        };
        for container in containers {
            container.offer(event.clone());
        }

        if event.mask().is_some() {
            self.hub.record_history(event);
        }
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
