// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event type and the process-wide event number.

use crate::value::Payload;
use std::sync::atomic::{AtomicU64, Ordering};

crate::define_id! {
    /// Globally-unique identifier for an [`Event`], generated at construction.
    pub struct EventId("evt-");
}

/// Process-wide strictly increasing integer assigned to an event at the
/// moment the hub accepts it for dispatch.
///
/// `0` is never assigned; it is reserved to mean "unassigned" on an event
/// that has been constructed but not yet dispatched.
pub type EventNumber = u64;

/// Sentinel meaning "the most recently set value, whatever its version" —
/// used by `getSharedState` when no specific event is supplied.
pub const VERSION_LATEST: EventNumber = u64::MAX;

/// Monotonic counter handing out event numbers. Lives on the hub lane;
/// only the hub increments it.
#[derive(Default)]
pub struct EventNumberCounter(AtomicU64);

impl EventNumberCounter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Assign the next event number. Strictly increasing, never repeats.
    pub fn next(&self) -> EventNumber {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current value without advancing it (diagnostics only).
    pub fn current(&self) -> EventNumber {
        self.0.load(Ordering::SeqCst)
    }
}

/// An immutable message dispatched through the hub.
///
/// `event_number` is `None` until the hub accepts the event via `dispatch`;
/// from that point on it is fixed for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Event {
    id: EventId,
    event_type: String,
    source: String,
    payload: Payload,
    response_id: Option<EventId>,
    timestamp_ms: Option<u64>,
    mask: Option<Vec<String>>,
    event_number: Option<EventNumber>,
}

/// Builder-style constructor parameters for [`Event`].
pub struct EventSpec {
    pub event_type: String,
    pub source: String,
    pub payload: Payload,
    pub response_id: Option<EventId>,
    pub timestamp_ms: Option<u64>,
    pub mask: Option<Vec<String>>,
}

impl Event {
    /// Construct a new, not-yet-dispatched event with an explicit id.
    ///
    /// Host code normally goes through [`Event::new`], which generates the
    /// id via an [`crate::id::IdGenerator`]; this constructor exists for
    /// deterministic tests and for hosts that already have a correlation id.
    pub fn with_id(id: EventId, spec: EventSpec) -> Self {
        Self {
            id,
            event_type: spec.event_type,
            source: spec.source,
            payload: spec.payload,
            response_id: spec.response_id,
            timestamp_ms: spec.timestamp_ms,
            mask: spec.mask,
            event_number: None,
        }
    }

    /// Construct a new, not-yet-dispatched event with a freshly generated id.
    pub fn new(event_type: impl Into<String>, source: impl Into<String>, payload: Payload) -> Self {
        Self::with_id(
            EventId::new(),
            EventSpec {
                event_type: event_type.into(),
                source: source.into(),
                payload,
                response_id: None,
                timestamp_ms: None,
                mask: None,
            },
        )
    }

    /// Construct a response event correlated to `trigger` via `responseID`.
    pub fn response_to(
        trigger: &Event,
        event_type: impl Into<String>,
        source: impl Into<String>,
        payload: Payload,
    ) -> Self {
        let mut e = Self::new(event_type, source, payload);
        e.response_id = Some(trigger.id);
        e
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn response_id(&self) -> Option<EventId> {
        self.response_id
    }

    pub fn timestamp_ms(&self) -> Option<u64> {
        self.timestamp_ms
    }

    pub fn mask(&self) -> Option<&[String]> {
        self.mask.as_deref()
    }

    pub fn event_number(&self) -> Option<EventNumber> {
        self.event_number
    }

    /// Returns true iff `listener_type`/`listener_source` match this event
    /// under the wildcard (`"*"`) and case-insensitive matching rule.
    pub fn matches(&self, listener_type: &str, listener_source: &str) -> bool {
        (listener_type == "*" || listener_type.eq_ignore_ascii_case(&self.event_type))
            && (listener_source == "*" || listener_source.eq_ignore_ascii_case(&self.source))
    }

    /// Assign the event number at dispatch-acceptance time (invariant
    /// E2). Internal to the engine crate's hub lane; never called twice.
    #[doc(hidden)]
    pub fn assign_event_number(&mut self, number: EventNumber) {
        debug_assert!(self.event_number.is_none(), "event number assigned twice");
        self.event_number = Some(number);
    }

    /// Stamp the event with the hub's clock at dispatch-acceptance time,
    /// unless the host already supplied one via `EventSpec`. Internal to the
    /// engine crate's hub lane.
    #[doc(hidden)]
    pub fn assign_timestamp_ms(&mut self, now_ms: u64) {
        if self.timestamp_ms.is_none() {
            self.timestamp_ms = Some(now_ms);
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
