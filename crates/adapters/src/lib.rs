// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Concrete implementations of the capability traits `eventhub-core`
//! depends on abstractly: [`eventhub_core::Scheduler`] and
//! [`eventhub_core::IdGenerator`], following the dependency-inversion split
//! the host keeps between capability traits and their concrete adapters.
//!
//! Production code should depend on this crate only for wiring
//! ([`TokioScheduler`], [`UuidIdGen`]) into an `EventHub` at startup; the
//! engine itself never names a concrete adapter.

mod id_gen;
mod scheduler;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use id_gen::UuidIdGen;
pub use scheduler::TokioScheduler;
