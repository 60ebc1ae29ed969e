// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DingTalk-style webhook signature: HMAC-SHA256 over `"<timestamp>\n<secret>"`,
//! base64-encoded, compared in constant time against the `sign` query param.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default freshness window: a timestamp more than this far from `now` is
/// rejected even with a matching signature.
pub const DEFAULT_WINDOW_SECS: i64 = 3600;

/// Compute `base64(HMAC-SHA256(secret, "<timestamp_ms>\n<secret>"))`.
// HMAC-SHA256 accepts keys of any length, so new_from_slice never fails here.
#[allow(clippy::expect_used)]
pub fn compute(secret: &str, timestamp_ms: i64) -> String {
    let message = format!("{timestamp_ms}\n{secret}");
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a webhook request: the computed signature must match `sign`
/// exactly (constant-time) and `timestamp_ms` must be within `window_secs`
/// of `now`.
pub fn verify(secret: &str, timestamp_ms: i64, sign: &str, now: DateTime<Utc>, window_secs: i64) -> bool {
    let age = (now.timestamp_millis() - timestamp_ms).abs() / 1000;
    if age >= window_secs {
        return false;
    }
    let expected = compute(secret, timestamp_ms);
    constant_time_eq(expected.as_bytes(), sign.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
