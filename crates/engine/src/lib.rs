// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! eventhub-engine: the dispatch kernel itself.
//!
//! Built from four primitives that compose into the [`EventHub`] façade:
//! the [`SerialDispatcher`], the per-`(extension, state-type)`
//! [`SharedStateManager`], the [`ResponseListenerRegistry`],
//! and the [`ExtensionContainer`] that wraps one extension instance
//! around its own dispatcher and state managers. `EventHub` wires these
//! together behind a hub lane and a hub dispatch lane.

mod container;
mod dispatcher;
mod extension;
mod hub;
mod response_registry;
mod shared_state_manager;

pub use container::{ContainerState, ExtensionContainer};
pub use dispatcher::{DispatcherState, SerialDispatcher, WorkHandler};
pub use extension::{EventListener, Extension, ExtensionApi, ExtensionFactory};
pub use hub::{EventHub, PLACEHOLDER_EXTENSION_NAME};
pub use response_registry::{ResponseCallback, ResponseListenerRegistry};
pub use shared_state_manager::SharedStateManager;
