// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn fake_clock_advances_monotonically() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    clock.advance(Duration::from_millis(50));
    let t1 = clock.now();
    assert!(t1 > t0);
    assert_eq!(t1 - t0, Duration::from_millis(50));
}

#[test]
fn fake_clock_epoch_ms_advances_with_duration() {
    let clock = FakeClock::new();
    let start = clock.epoch_ms();
    clock.advance(Duration::from_millis(250));
    assert_eq!(clock.epoch_ms(), start + 250);
}

#[test]
fn fake_clock_set_epoch_ms_is_independent_of_instant() {
    let clock = FakeClock::new();
    let before = clock.now();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
    assert_eq!(clock.now(), before);
}

#[test]
fn system_clock_epoch_ms_is_plausible() {
    let clock = SystemClock;
    // Any time after 2020-01-01 in epoch millis.
    assert!(clock.epoch_ms() > 1_577_836_800_000);
}
