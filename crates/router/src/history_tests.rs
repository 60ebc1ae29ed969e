// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn evicts_oldest_once_capacity_is_reached() {
    let mut history = ResultHistory::new(2);
    history.push(ActionResult::success_result(serde_json::json!(1)));
    history.push(ActionResult::success_result(serde_json::json!(2)));
    history.push(ActionResult::success_result(serde_json::json!(3)));

    assert_eq!(history.len(), 2);
    let outputs: Vec<_> = history.iter().map(|r| r.output.clone().unwrap()).collect();
    assert_eq!(outputs, vec![serde_json::json!(2), serde_json::json!(3)]);
}

#[test]
fn default_capacity_is_one_hundred() {
    let history = ResultHistory::default();
    assert!(history.is_empty());
    assert_eq!(history.capacity, 100);
}
