// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use weft_core::error::Error;

struct Counter(Arc<AtomicUsize>);

#[async_trait]
impl Subscriber for Counter {
    async fn handle(&self, _event: &Event) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct AlwaysFails;

#[async_trait]
impl Subscriber for AlwaysFails {
    async fn handle(&self, _event: &Event) -> Result<()> {
        Err(Error::transient("boom"))
    }
}

struct RecordOrder(Arc<Mutex<Vec<&'static str>>>, &'static str);

#[async_trait]
impl Subscriber for RecordOrder {
    async fn handle(&self, _event: &Event) -> Result<()> {
        self.0.lock().await.push(self.1);
        Ok(())
    }
}

#[tokio::test]
async fn publish_delivers_only_to_subscribers_of_the_matching_type() {
    let bus = EventBus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    bus.subscribe(EventType::IssueCreated, Arc::new(Counter(hits.clone()))).await;

    bus.publish(Event::new(EventType::IssueCreated, HashMap::new())).await;
    bus.publish(Event::new(EventType::MemoThreshold, HashMap::new())).await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_failing_subscriber_does_not_block_its_siblings() {
    let bus = EventBus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    bus.subscribe(EventType::PrCreated, Arc::new(AlwaysFails)).await;
    bus.subscribe(EventType::PrCreated, Arc::new(Counter(hits.clone()))).await;

    bus.publish(Event::new(EventType::PrCreated, HashMap::new())).await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn delivery_order_matches_registration_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe(EventType::SessionCompleted, Arc::new(RecordOrder(order.clone(), "first"))).await;
    bus.subscribe(EventType::SessionCompleted, Arc::new(RecordOrder(order.clone(), "second"))).await;

    bus.publish(Event::new(EventType::SessionCompleted, HashMap::new())).await;

    assert_eq!(*order.lock().await, vec!["first", "second"]);
}

#[tokio::test]
async fn unsubscribe_all_removes_the_whole_list() {
    let bus = EventBus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    bus.subscribe(EventType::IssueUpdated, Arc::new(Counter(hits.clone()))).await;
    assert_eq!(bus.subscriber_count(EventType::IssueUpdated).await, 1);

    bus.unsubscribe_all(EventType::IssueUpdated).await;
    bus.publish(Event::new(EventType::IssueUpdated, HashMap::new())).await;

    assert_eq!(bus.subscriber_count(EventType::IssueUpdated).await, 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
