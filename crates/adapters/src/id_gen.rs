// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production [`IdGenerator`] backed by UUID v4.

use eventhub_core::IdGenerator;

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGen;

impl UuidIdGen {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidIdGen {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
