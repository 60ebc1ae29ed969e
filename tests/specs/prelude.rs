//! Shared fixtures for the cross-crate integration specs.
//!
//! Each spec module exercises more than one crate together (a watcher
//! feeding the bus into a router, a mailbox store feeding the debounce
//! buffer, …) — the kind of seam unit tests inside a single crate can't
//! see. Nothing here talks to a CLI binary: this core has no CLI surface
//! (see the non-goals in spec.md §1), so fixtures build `tempfile`
//! directories and drive the library API directly.

#![allow(dead_code)]

pub use std::sync::Arc;
pub use std::time::Duration;

pub use tempfile::{tempdir, TempDir};
pub use weft_bus::{Event, EventBus, EventType, Subscriber};
pub use weft_core::error::Result;

use async_trait::async_trait;
pub use tokio::sync::Mutex;

/// A subscriber that records every event it receives, in delivery order.
pub struct RecordingSubscriber {
    events: Mutex<Vec<Event>>,
}

impl RecordingSubscriber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { events: Mutex::new(Vec::new()) })
    }

    pub async fn snapshot(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }

    pub async fn types(&self) -> Vec<EventType> {
        self.events.lock().await.iter().map(|e| e.event_type()).collect()
    }
}

#[async_trait]
impl Subscriber for RecordingSubscriber {
    async fn handle(&self, event: &Event) -> Result<()> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &std::path::Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, content).expect("write fixture file");
}
