use super::*;

#[test]
fn matches_the_worked_example_from_the_interface_contract() {
    let secret = "s3cr3t";
    let timestamp_ms = 1_700_000_000_000i64;
    let sign = compute(secret, timestamp_ms);
    let now = DateTime::from_timestamp_millis(timestamp_ms).unwrap();
    assert!(verify(secret, timestamp_ms, &sign, now, DEFAULT_WINDOW_SECS));
}

#[test]
fn rejects_a_tampered_signature() {
    let secret = "s3cr3t";
    let timestamp_ms = 1_700_000_000_000i64;
    let now = DateTime::from_timestamp_millis(timestamp_ms).unwrap();
    assert!(!verify(secret, timestamp_ms, "not-the-signature", now, DEFAULT_WINDOW_SECS));
}

#[test]
fn rejects_a_stale_timestamp_outside_the_window() {
    let secret = "s3cr3t";
    let timestamp_ms = 1_700_000_000_000i64;
    let sign = compute(secret, timestamp_ms);
    let stale_now = DateTime::from_timestamp_millis(timestamp_ms + DEFAULT_WINDOW_SECS * 1000 + 1).unwrap();
    assert!(!verify(secret, timestamp_ms, &sign, stale_now, DEFAULT_WINDOW_SECS));
}

#[test]
fn accepts_a_timestamp_right_at_the_edge_of_the_window() {
    let secret = "s3cr3t";
    let timestamp_ms = 1_700_000_000_000i64;
    let sign = compute(secret, timestamp_ms);
    let almost_stale = DateTime::from_timestamp_millis(timestamp_ms + (DEFAULT_WINDOW_SECS - 1) * 1000).unwrap();
    assert!(verify(secret, timestamp_ms, &sign, almost_stale, DEFAULT_WINDOW_SECS));
}

#[test]
fn different_secrets_produce_different_signatures() {
    let timestamp_ms = 1_700_000_000_000i64;
    assert_ne!(compute("secret-a", timestamp_ms), compute("secret-b", timestamp_ms));
}
