// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Extension` trait and the `ExtensionApi` handle passed to it
//! "Dynamic extension classes" design note: the source constructs
//! extensions reflectively from a class token; here a factory closure
//! returns a constructed extension given its container's API handle,
//! preserving dependency injection without reflection).

use crate::hub::EventHub;
use async_trait::async_trait;
use eventhub_core::{Clock, Event, EventId, Payload, SharedStateStatus, SharedStateType};
use std::sync::Arc;
use std::time::Duration;

/// A feature module hosted by its own [`crate::container::ExtensionContainer`]
/// ("Extension container state").
///
/// Generic over the hub's `Clock` type so `on_registered`/`on_unregistered`
/// can take a concrete `&ExtensionApi<C>` — `dyn Extension<C>` is still an
/// ordinary trait object, monomorphized once per `EventHub<C>` a host
/// actually builds.
#[async_trait]
pub trait Extension<C: Clock + 'static>: Send + Sync {
    /// Unique, case-sensitive name ("Extension identity").
    fn name(&self) -> &str;
    fn friendly_name(&self) -> &str;
    fn version(&self) -> &str {
        "0.0.0"
    }

    /// Invoked once, paused, before the container starts draining events
    /// (startup barrier). An `Err` stops the container before it ever
    /// reaches `REGISTERED`.
    async fn on_registered(&self, api: &ExtensionApi<C>) -> Result<(), String>;

    /// Invoked once as the container's dispatcher final job (shutdown).
    async fn on_unregistered(&self, api: &ExtensionApi<C>);
}

/// Constructs an extension instance. Replaces the source's reflective
/// `Class<? extends Extension>` construction; the container doesn't
/// know the extension's declared name until the factory returns, so the
/// `ExtensionApi` handle is only available to `on_registered`/
/// `on_unregistered`, never to the factory itself.
pub type ExtensionFactory<C> = Box<dyn FnOnce() -> Result<Arc<dyn Extension<C>>, String> + Send>;

/// Per-event callback attached via [`ExtensionApi::register_listener`] or
/// the hub's unattributed `registerListener` ("Listener entry").
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: Event);
}

#[async_trait]
impl<F, Fut> EventListener for F
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ()> + Send,
{
    async fn on_event(&self, event: Event) {
        (self)(event).await
    }
}

/// Handle an extension uses to talk back to the hub and its own container:
/// dispatch events, register listeners and response listeners, and
/// read/write its own shared state. Scoped to one extension's name.
#[derive(Clone)]
pub struct ExtensionApi<C: Clock + 'static> {
    hub: EventHub<C>,
    extension_name: String,
}

impl<C: Clock + 'static> ExtensionApi<C> {
    pub(crate) fn new(hub: EventHub<C>, extension_name: String) -> Self {
        Self { hub, extension_name }
    }

    pub fn extension_name(&self) -> &str {
        &self.extension_name
    }

    pub fn dispatch(&self, event: Event) {
        self.hub.dispatch(event);
    }

    /// Attach a listener to this extension's own container.
    pub async fn register_listener(
        &self,
        event_type: impl Into<String>,
        source: impl Into<String>,
        callback: Arc<dyn EventListener>,
    ) {
        self.hub
            .register_listener_for(Some(self.extension_name.clone()), event_type.into(), source.into(), callback)
            .await;
    }

    pub async fn register_response_listener(
        &self,
        trigger_id: EventId,
        timeout: Duration,
        callback: Box<dyn crate::response_registry::ResponseCallback>,
    ) {
        self.hub.register_response_listener(trigger_id, timeout, callback).await;
    }

    pub async fn set_shared_state(
        &self,
        state_type: SharedStateType,
        data: Option<Payload>,
        event: Option<&Event>,
    ) -> SharedStateStatus {
        self.hub.set_shared_state(state_type, &self.extension_name, data, event).await
    }

    pub async fn get_shared_state(
        &self,
        extension_name: &str,
        state_type: SharedStateType,
        event: Option<&Event>,
    ) -> Option<Payload> {
        self.hub.get_shared_state(state_type, extension_name, event).await
    }

    pub async fn clear_shared_state(&self, state_type: SharedStateType) -> bool {
        self.hub.clear_shared_state(state_type, &self.extension_name).await
    }
}
