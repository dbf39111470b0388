// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extension Container: wraps one extension instance, its own event
//! processor, listener table, and two shared-state managers.

use crate::dispatcher::{BoxFuture, SerialDispatcher, WorkHandler};
use crate::extension::{Extension, EventListener, ExtensionApi};
use crate::shared_state_manager::SharedStateManager;
use async_trait::async_trait;
use eventhub_core::{Clock, Event, SharedStateType};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const REGISTERING: u8 = 0;
const REGISTERED: u8 = 1;
const STOPPED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Registering,
    Registered,
    Stopped,
}

impl From<u8> for ContainerState {
    fn from(v: u8) -> Self {
        match v {
            REGISTERING => ContainerState::Registering,
            REGISTERED => ContainerState::Registered,
            _ => ContainerState::Stopped,
        }
    }
}

struct ListenerEntry {
    event_type: String,
    event_source: String,
    callback: Arc<dyn EventListener>,
}

struct ContainerEventHandler {
    friendly_name: String,
    listeners: Arc<RwLock<Vec<ListenerEntry>>>,
}

#[async_trait]
impl WorkHandler<Event> for ContainerEventHandler {
    async fn handle(&self, event: Event) {
        let matching: Vec<Arc<dyn EventListener>> = {
            let listeners = self.listeners.read();
            listeners
                .iter()
                .filter(|l| event.matches(&l.event_type, &l.event_source))
                .map(|l| Arc::clone(&l.callback))
                .collect()
        };

        for callback in matching {
            let inner_event = event.clone();
            if let Err(panic) =
                tokio::spawn(async move { callback.on_event(inner_event).await }).await
            {
                tracing::error!(
                    extension = %self.friendly_name,
                    event_id = %event.id(),
                    error = %panic,
                    "listener panicked; event treated as delivered"
                );
            }
        }
    }
}

/// Owns one extension instance plus everything it needs on its own lane
/// ("Extension container state").
pub struct ExtensionContainer {
    name: String,
    friendly_name: String,
    version: String,
    state: AtomicU8,
    listeners: Arc<RwLock<Vec<ListenerEntry>>>,
    event_processor: SerialDispatcher<Event>,
    standard_states: SharedStateManager,
    xdm_states: SharedStateManager,
}

impl ExtensionContainer {
    pub fn new(name: String, friendly_name: String, version: String) -> Self {
        Self {
            event_processor: SerialDispatcher::new(format!("container:{name}")),
            name,
            friendly_name,
            version,
            state: AtomicU8::new(REGISTERING),
            listeners: Arc::new(RwLock::new(Vec::new())),
            standard_states: SharedStateManager::new(),
            xdm_states: SharedStateManager::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn state(&self) -> ContainerState {
        ContainerState::from(self.state.load(Ordering::SeqCst))
    }

    pub fn shared_states(&self, state_type: SharedStateType) -> &SharedStateManager {
        match state_type {
            SharedStateType::Standard => &self.standard_states,
            SharedStateType::Xdm => &self.xdm_states,
        }
    }

    /// Append a listener to this container's table (no de-duplication).
    pub fn register_listener(&self, event_type: String, event_source: String, callback: Arc<dyn EventListener>) {
        self.listeners.write().push(ListenerEntry { event_type, event_source, callback });
    }

    /// Offer `event` into this container's own lane. Only `REGISTERED`
    /// containers are meant to receive events; the queue
    /// itself tolerates offers in any state, since the startup barrier is
    /// what keeps a `REGISTERING` container from draining them yet.
    pub fn offer(&self, event: Event) -> bool {
        self.event_processor.offer(event)
    }

    /// Run the extension's startup barrier: `on_registered` runs as the
    /// dispatcher's initial job, pausing delivery until it returns; on
    /// success the container flips to `REGISTERED`, on failure to
    /// `STOPPED` with all queued events discarded.
    pub async fn start<C: Clock + 'static>(self: &Arc<Self>, extension: Arc<dyn Extension<C>>, api: ExtensionApi<C>) {
        let handler: Arc<dyn WorkHandler<Event>> = Arc::new(ContainerEventHandler {
            friendly_name: self.friendly_name.clone(),
            listeners: Arc::clone(&self.listeners),
        });

        let state_for_initial = Arc::clone(self);
        let extension_for_initial = Arc::clone(&extension);
        let api_for_initial = api.clone();
        let initial_job: BoxFuture<'static, Result<(), String>> = Box::pin(async move {
            match extension_for_initial.on_registered(&api_for_initial).await {
                Ok(()) => {
                    state_for_initial.state.store(REGISTERED, Ordering::SeqCst);
                    Ok(())
                }
                Err(e) => {
                    state_for_initial.state.store(STOPPED, Ordering::SeqCst);
                    Err(e)
                }
            }
        });

        let final_job: Box<dyn FnOnce() + Send> = Box::new(move || {
            tokio::spawn(async move {
                extension.on_unregistered(&api).await;
            });
        });

        self.event_processor.start(handler, Some(initial_job), Some(final_job)).await;
    }

    /// Shut down the dispatcher (running `on_unregistered` as the final
    /// job) and mark the container `STOPPED`.
    pub fn shutdown(&self) {
        self.state.store(STOPPED, Ordering::SeqCst);
        self.event_processor.shutdown();
    }

    /// Starts a container with no extension lifecycle hooks: used only for
    /// the hub placeholder extension, which hosts unattributed
    /// listeners and has no `on_registered`/`on_unregistered` of its own, so
    /// there is no startup barrier to run.
    pub async fn start_builtin(self: &Arc<Self>) {
        let handler: Arc<dyn WorkHandler<Event>> = Arc::new(ContainerEventHandler {
            friendly_name: self.friendly_name.clone(),
            listeners: Arc::clone(&self.listeners),
        });
        self.state.store(REGISTERED, Ordering::SeqCst);
        self.event_processor.start(handler, None, None).await;
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
