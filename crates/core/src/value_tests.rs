// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn json_round_trip_preserves_shape() {
    let original = json!({
        "k": "v1",
        "n": 42,
        "nested": { "flag": true, "items": [1, 2, 3] },
    });
    let value: Value = original.clone().into();
    let back: serde_json::Value = value.into();
    assert_eq!(original, back);
}

#[test]
fn int_and_float_distinguished() {
    let int_val: Value = json!(7).into();
    let float_val: Value = json!(7.5).into();
    assert_eq!(int_val.as_i64(), Some(7));
    assert!(matches!(float_val, Value::Float(f) if f == 7.5));
}

#[test]
fn from_conversions_cover_scalars() {
    assert_eq!(Value::from("hi"), Value::String("hi".into()));
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(3i64), Value::Int(3));
}

#[test]
fn payload_to_json_serializes_map() {
    let mut payload = Payload::new();
    payload.insert("k".to_string(), Value::from("v"));
    let json = payload_to_json(&payload);
    assert_eq!(json, json!({"k": "v"}));
}

#[test]
fn as_map_only_matches_map_variant() {
    assert!(Value::from("x").as_map().is_none());
    let mut payload = Payload::new();
    payload.insert("a".to_string(), Value::Null);
    assert!(Value::Map(payload).as_map().is_some());
}
