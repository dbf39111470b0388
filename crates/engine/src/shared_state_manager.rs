// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Shared-State Manager: one instance per `(extension,
//! state-type)`, holding a sparse version→entry map.

use eventhub_core::{EventNumber, Payload, SharedStateStatus};
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Entry {
    Set(Payload),
    Pending,
}

struct Inner {
    entries: BTreeMap<EventNumber, Entry>,
    max_set_version: Option<EventNumber>,
}

impl Inner {
    fn new() -> Self {
        Self { entries: BTreeMap::new(), max_set_version: None }
    }
}

/// Sparse sorted version→value map for one `(extension, state-type)` pair
/// Internally locked so it can be shared behind an `Arc` between the
/// hub lane and a container's own lane without the caller juggling locks.
pub struct SharedStateManager {
    inner: Mutex<Inner>,
}

impl SharedStateManager {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::new()) }
    }

    /// `data == None` requests a `PENDING` placeholder rather than a value.
    pub fn set(&self, data: Option<Payload>, version: EventNumber) -> SharedStateStatus {
        let mut inner = self.inner.lock();
        let existing = inner.entries.get(&version).cloned();

        match existing {
            None => {
                let is_stale = inner.max_set_version.is_some_and(|max| version < max);
                if is_stale {
                    return SharedStateStatus::NotSet;
                }
                match data {
                    Some(payload) => {
                        inner.entries.insert(version, Entry::Set(payload));
                        inner.max_set_version = Some(
                            inner.max_set_version.map_or(version, |max| max.max(version)),
                        );
                        SharedStateStatus::Set
                    }
                    None => {
                        inner.entries.insert(version, Entry::Pending);
                        SharedStateStatus::Pending
                    }
                }
            }
            Some(Entry::Pending) => match data {
                Some(payload) => {
                    inner.entries.insert(version, Entry::Set(payload));
                    inner.max_set_version =
                        Some(inner.max_set_version.map_or(version, |max| max.max(version)));
                    SharedStateStatus::Set
                }
                None => SharedStateStatus::NotSet,
            },
            Some(Entry::Set(_)) => SharedStateStatus::NotSet,
        }
    }

    /// Greatest version `<= version` that is `SET`, ignoring any `PENDING`
    /// entries encountered along the way (fallback
    /// rule: pending holes never mask an earlier SET value).
    pub fn get(&self, version: EventNumber) -> Option<Payload> {
        let inner = self.inner.lock();
        inner
            .entries
            .range(..=version)
            .rev()
            .find_map(|(_, entry)| match entry {
                Entry::Set(payload) => Some(payload.clone()),
                Entry::Pending => None,
            })
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.max_set_version = None;
    }
}

impl Default for SharedStateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "shared_state_manager_tests.rs"]
mod tests;
