// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    invalid_item = { Error::InvalidItem("title is empty".into()), "title is empty" },
    malformed_packet = { Error::MalformedPacket("missing namespace".into()), "missing namespace" },
    unknown_packet_type = { Error::UnknownPacketType('9'), "'9'" },
    unknown_event = { Error::UnknownEvent("objects.updated".into()), "objects.updated" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_unknown_event_has_hint() {
    let msg = Error::UnknownEvent("x".into()).to_string();
    assert!(msg.contains("hint:"));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
