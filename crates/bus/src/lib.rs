// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow unwrap/expect in test code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Typed in-process publish/subscribe event bus.
//!
//! Subscribers register per [`EventType`]; `publish` delivers to every live
//! subscriber for that type in registration order, awaiting each handler and
//! logging per-handler errors so one bad subscriber can't sink the others.
//! Delivery is in-process only — nothing here is persisted.

pub mod event;

pub use event::{Event, EventType};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;
use weft_core::error::Result;

/// A live subscriber to one or more event types.
///
/// Handlers return a `Result` rather than panicking on failure; `publish`
/// logs an `Err` and keeps delivering to the remaining subscribers.
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn handle(&self, event: &Event) -> Result<()>;
}

type SubscriberList = Vec<Arc<dyn Subscriber>>;

/// In-process typed event bus.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<HashMap<EventType, SubscriberList>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for `event_type`. Returns the index of this
    /// subscriber within that type's list, useful for later unsubscription
    /// in tests.
    pub async fn subscribe(&self, event_type: EventType, subscriber: Arc<dyn Subscriber>) -> usize {
        let mut subs = self.subscribers.lock().await;
        let list = subs.entry(event_type).or_default();
        list.push(subscriber);
        list.len() - 1
    }

    /// Drop every subscriber registered for `event_type`.
    pub async fn unsubscribe_all(&self, event_type: EventType) {
        self.subscribers.lock().await.remove(&event_type);
    }

    pub async fn subscriber_count(&self, event_type: EventType) -> usize {
        self.subscribers.lock().await.get(&event_type).map(|l| l.len()).unwrap_or(0)
    }

    /// Deliver `event` to every subscriber registered for its type, in
    /// registration order. A handler error does not stop delivery to its
    /// siblings.
    pub async fn publish(&self, event: Event) {
        let subs = {
            let guard = self.subscribers.lock().await;
            guard.get(&event.event_type()).cloned().unwrap_or_default()
        };
        for (idx, subscriber) in subs.iter().enumerate() {
            if let Err(err) = subscriber.handle(&event).await {
                warn!(subscriber_index = idx, event_type = %event.event_type(), %err, "subscriber failed, continuing delivery");
            }
        }
    }
}

#[cfg(test)]
mod tests;
