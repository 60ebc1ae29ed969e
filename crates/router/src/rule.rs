// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routing rules: an (event-type-set, condition, action, priority) tuple.
//! Rules are totally ordered by `(priority desc, insertion order)`.

use std::sync::Arc;
use weft_bus::{Event, EventType};

/// A synchronous predicate evaluated against an event before dispatching.
///
/// Conditions are deliberately synchronous: an async condition on a rule is
/// a misconfiguration (see [`crate::router::ActionRouter::register`]).
pub type Condition = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// One entry in the router's rule table.
#[derive(Clone)]
pub struct RoutingRule {
    pub event_types: Vec<EventType>,
    pub action_name: String,
    pub condition: Option<Condition>,
    pub priority: i32,
    /// Insertion sequence number, used as the tiebreak for equal priority.
    pub(crate) sequence: u64,
}

impl RoutingRule {
    pub fn new(event_types: Vec<EventType>, action_name: impl Into<String>, priority: i32) -> Self {
        Self { event_types, action_name: action_name.into(), condition: None, priority, sequence: 0 }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether this rule matches `event`: event type membership plus an
    /// optional synchronous condition.
    pub fn matches(&self, event: &Event) -> bool {
        if !self.event_types.contains(&event.event_type()) {
            return false;
        }
        self.condition.as_ref().map(|c| c(event)).unwrap_or(true)
    }
}

/// Sugar for building common condition closures: field-equals and
/// all-of payload matching.
pub struct ConditionalRouter;

impl ConditionalRouter {
    /// `payload[field] == value`.
    pub fn field_equals(field: impl Into<String>, value: serde_json::Value) -> Condition {
        let field = field.into();
        Arc::new(move |event: &Event| event.get(&field) == Some(&value))
    }

    /// Every `(field, value)` pair in `matchers` must equal the event's payload.
    pub fn all_of(matchers: Vec<(String, serde_json::Value)>) -> Condition {
        Arc::new(move |event: &Event| matchers.iter().all(|(field, value)| event.get(field) == Some(value)))
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
