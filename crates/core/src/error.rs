// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types surfaced across the hub's external interfaces.
//!
//! Three of these are *not* Rust `Error` types in the usual sense — they are
//! outcome enums delivered to a completion callback or an `onError` sink,
//! matching the source API's contract that these are not exceptions. Only
//! [`HubError`] is a `std::error::Error` for genuinely exceptional internal
//! failures (a malformed config, a scheduler that refuses to spawn).

use thiserror::Error;

/// Outcome of `registerExtension` / `unregisterExtension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// No registration error; included so completion callbacks have a
    /// single enum to match on instead of `Option<RegistrationError>`
    /// wrapped in another `Option`.
    None,
    InvalidExtensionName,
    DuplicateExtensionName,
    ExtensionInitializationFailure,
    ExtensionNotRegistered,
    Unknown,
}

impl RegistrationError {
    pub fn is_ok(&self) -> bool {
        matches!(self, RegistrationError::None)
    }
}

/// Outcome of `setSharedState` / `getSharedState` / `clearSharedState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionError {
    /// Extension name was null, blank, or unknown to the registry.
    BadName,
    /// Anything else that isn't a normal `NOT_SET` outcome.
    UnexpectedError,
}

/// Outcome delivered to a response listener's `fail` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseError {
    CallbackTimeout,
}

/// Genuinely exceptional hub-internal failures — not part of the
/// completion/onError callback contracts above.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("invalid hub configuration: {0}")]
    InvalidConfig(String),
    #[error("scheduler failed to spawn delayed task: {0}")]
    SchedulerUnavailable(String),
}
