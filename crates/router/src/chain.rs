// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential action chains with short-circuit on failure and a shared
//! context dictionary threaded between members.

use crate::action::{Action, ActionResult, ActionStatus};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use weft_bus::Event;
use weft_core::error::Result;

/// A named sequence of actions executed in order. If member `k` fails,
/// members `k+1..n` are recorded as skipped and the chain's own
/// `execute` reports failure.
pub struct ActionChain {
    name: String,
    members: Vec<Arc<dyn Action>>,
}

impl ActionChain {
    pub fn new(name: impl Into<String>, members: Vec<Arc<dyn Action>>) -> Self {
        Self { name: name.into(), members }
    }

    pub fn members(&self) -> &[Arc<dyn Action>] {
        &self.members
    }

    /// Run every member in order, writing each successful member's output
    /// into `context` under its name, and reading the chain-so-far context
    /// back out as metadata on the event each member sees.
    pub async fn run(&self, event: &Event) -> Vec<ActionResult> {
        let mut context: HashMap<String, Value> = HashMap::new();
        let mut results = Vec::with_capacity(self.members.len());
        let mut short_circuited = false;

        for member in &self.members {
            if short_circuited {
                results.push(ActionResult::skipped_result("Previous action failed"));
                continue;
            }

            let scoped_event = event_with_chain_context(event, &context);
            let result = member.invoke(&scoped_event).await;

            if result.status == ActionStatus::Success {
                if let Some(output) = &result.output {
                    context.insert(member.name().to_string(), output.clone());
                }
            }
            if !result.success {
                short_circuited = true;
            }
            results.push(result);
        }

        results
    }
}

fn event_with_chain_context(event: &Event, context: &HashMap<String, Value>) -> Event {
    let mut scoped = event.clone();
    scoped
        .payload
        .insert("_chain_context".to_string(), Value::Object(context.clone().into_iter().collect()));
    scoped
}

#[async_trait]
impl Action for ActionChain {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, event: &Event) -> Result<ActionResult> {
        let results = self.run(event).await;
        let overall_success = results.iter().all(|r| r.success);
        let output = serde_json::json!({
            "results": results.iter().map(|r| serde_json::to_value(r).unwrap_or(Value::Null)).collect::<Vec<_>>(),
        });
        if overall_success {
            Ok(ActionResult::success_result(output))
        } else {
            let mut result = ActionResult::failure_result(format!("chain {} had a failing member", self.name));
            result.output = Some(output);
            Ok(result)
        }
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;
