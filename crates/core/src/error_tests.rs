// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn kind_maps_each_variant() {
    assert_eq!(Error::invalid_input("x").kind(), ErrorKind::InvalidInput);
    assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
    assert_eq!(Error::conflict("x").kind(), ErrorKind::Conflict);
    assert_eq!(Error::transient("x").kind(), ErrorKind::Transient);
}

#[test]
fn io_errors_are_transient_and_json_errors_are_fatal() {
    let io_err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
    assert_eq!(io_err.kind(), ErrorKind::Transient);

    let json_err: Error = serde_json::from_str::<serde_json::Value>("{not json")
        .unwrap_err()
        .into();
    assert_eq!(json_err.kind(), ErrorKind::Fatal);
}

#[test]
fn display_messages_carry_the_original_text() {
    let err = Error::not_found("artifact art-xyz");
    assert_eq!(err.to_string(), "not found: artifact art-xyz");
}

#[test]
fn error_kind_display_is_lowercase() {
    assert_eq!(ErrorKind::Transient.to_string(), "transient");
    assert_eq!(ErrorKind::InvalidInput.to_string(), "invalid input");
}
