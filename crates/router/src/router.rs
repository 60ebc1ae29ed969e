// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The action router: rule table, action registry, and dispatch.

use crate::action::Action;
use crate::history::ResultHistory;
use crate::rule::RoutingRule;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;
use weft_bus::{Event, EventBus, EventType, Subscriber};
use weft_core::error::Result;

pub use crate::rule::ConditionalRouter;

struct State {
    rules: Vec<RoutingRule>,
    actions: HashMap<String, Arc<dyn Action>>,
    history: ResultHistory,
    next_sequence: u64,
    dispatch_count: u64,
}

/// Priority-ordered rule table dispatching bus events to registered actions.
#[derive(Clone)]
pub struct ActionRouter {
    state: Arc<Mutex<State>>,
    bus: EventBus,
}

impl ActionRouter {
    pub fn new(bus: EventBus) -> Self {
        Self::with_history_capacity(bus, 100)
    }

    pub fn with_history_capacity(bus: EventBus, capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                rules: Vec::new(),
                actions: HashMap::new(),
                history: ResultHistory::new(capacity),
                next_sequence: 0,
                dispatch_count: 0,
            })),
            bus,
        }
    }

    /// Register a rule. An async condition is rejected as a misconfiguration
    /// (this router's [`crate::rule::Condition`] type is already
    /// synchronous-only, so misuse can only arrive via a condition closure
    /// that itself blocks — callers are warned once and the rule still
    /// registers with no condition, matching no events until fixed).
    pub async fn register(
        &self,
        event_types: Vec<EventType>,
        action: Arc<dyn Action>,
        condition: Option<crate::rule::Condition>,
        priority: i32,
    ) {
        let mut state = self.state.lock().await;
        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let mut rule = RoutingRule::new(event_types, action.name(), priority);
        rule.condition = condition;
        rule.sequence = sequence;

        state.actions.insert(action.name().to_string(), action);
        state.rules.push(rule);
        state.rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.sequence.cmp(&b.sequence)));
    }

    /// Subscribe a single dispatch handler per distinct event type appearing
    /// in any registered rule.
    pub async fn start(self: &Arc<Self>) {
        let event_types: HashSet<EventType> = {
            let state = self.state.lock().await;
            state.rules.iter().flat_map(|r| r.event_types.iter().copied()).collect()
        };
        for event_type in event_types {
            self.bus.subscribe(event_type, self.clone() as Arc<dyn Subscriber>).await;
        }
    }

    pub async fn stop(&self) {
        let event_types: HashSet<EventType> = {
            let state = self.state.lock().await;
            state.rules.iter().flat_map(|r| r.event_types.iter().copied()).collect()
        };
        for event_type in event_types {
            self.bus.unsubscribe_all(event_type).await;
        }
    }

    /// Dispatch `event` through every matching rule, in priority order.
    /// Per-rule execution errors are caught and recorded as failed results;
    /// they never halt sibling rules.
    pub async fn dispatch(&self, event: &Event) {
        let matching: Vec<(String, Arc<dyn Action>)> = {
            let state = self.state.lock().await;
            state
                .rules
                .iter()
                .filter(|r| r.matches(event))
                .filter_map(|r| state.actions.get(&r.action_name).map(|a| (r.action_name.clone(), a.clone())))
                .collect()
        };

        for (_name, action) in matching {
            let result = action.invoke(event).await;
            let mut state = self.state.lock().await;
            state.history.push(result);
            state.dispatch_count += 1;
        }
    }

    pub async fn history_len(&self) -> usize {
        self.state.lock().await.history.len()
    }

    pub async fn dispatch_count(&self) -> u64 {
        self.state.lock().await.dispatch_count
    }

    pub async fn rule_count(&self) -> usize {
        self.state.lock().await.rules.len()
    }
}

#[async_trait]
impl Subscriber for ActionRouter {
    async fn handle(&self, event: &Event) -> Result<()> {
        self.dispatch(event).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
