// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub configuration.
//!
//! The hub performs no file I/O of its own; the host parses whatever format
//! it likes (TOML, env, flags) into a [`HubConfig`] and passes it to
//! `EventHub::new`. `HubConfig` derives `Deserialize` so hosts that already
//! keep a TOML config file can embed a `[event_hub]` table in it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables the Adobe SDK historically hard-coded; exposed here so a host
/// can override them without patching the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Default timeout for `registerResponseListener` calls that don't
    /// specify their own.
    #[serde(with = "duration_ms")]
    pub response_listener_default_timeout: Duration,
    /// Capacity of the optional bounded event-history sink.
    /// `None` disables the sink entirely.
    pub event_history_capacity: Option<usize>,
    /// Friendly name published for the hub placeholder extension in its own
    /// shared-state snapshot.
    pub hub_friendly_name: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            response_listener_default_timeout: Duration::from_millis(1000),
            event_history_capacity: None,
            hub_friendly_name: "EventHub".to_string(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
