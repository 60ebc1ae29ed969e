// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The poll loop shared by every concrete watcher.
//!
//! A [`PollingWatcher`] owns a [`WatchConfig`] and a [`SemanticWatcher`] that
//! knows how to reduce raw [`FileEvent`]s into bus events. `start` spawns a
//! background task that ticks every `poll_interval`; `stop` is idempotent
//! and cancels the task at its next await point.

use crate::config::WatchConfig;
use crate::file_event::FileEvent;
use crate::scanner::{self, Snapshot};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;
use weft_bus::{Event, EventBus};

/// A local, synchronous or async, per-event callback. Exceptions raised by
/// the closure are isolated: they are logged and do not stop the tick.
pub type EmitCallback = Arc<dyn Fn(&FileEvent) + Send + Sync>;

/// Domain-specific reduction of raw file events into bus events.
///
/// Implementations hold whatever per-entity cache they need (issue field
/// state, memo counts, task ids) behind interior mutability, since `reduce`
/// takes `&self`.
#[async_trait]
pub trait SemanticWatcher: Send + Sync {
    fn name(&self) -> &str;

    /// Reduce one raw file event into zero or more bus events. Order within
    /// the returned vec is preserved when publishing.
    async fn reduce(&self, raw: &FileEvent) -> Vec<Event>;
}

/// Generic poll loop: scan, diff, reduce, publish, repeat.
pub struct PollingWatcher<W> {
    config: WatchConfig,
    semantic: Arc<W>,
    bus: EventBus,
    callbacks: Vec<EmitCallback>,
    snapshot: Arc<Mutex<Snapshot>>,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl<W: SemanticWatcher + 'static> PollingWatcher<W> {
    pub fn new(config: WatchConfig, semantic: W, bus: EventBus) -> Self {
        Self {
            config,
            semantic: Arc::new(semantic),
            bus,
            callbacks: Vec::new(),
            snapshot: Arc::new(Mutex::new(Snapshot::default())),
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    pub fn on_emit(&mut self, callback: EmitCallback) {
        self.callbacks.push(callback);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run exactly one scan/diff/reduce/publish tick, without touching the
    /// background loop. Useful for tests and for `start`'s first iteration.
    pub async fn tick(&self) -> weft_core::error::Result<Vec<Event>> {
        let current = scanner::scan(&self.config)?;
        let mut guard = self.snapshot.lock().await;
        let raw_events = scanner::diff(self.semantic.name(), &guard, &current);
        *guard = current;
        drop(guard);

        let mut emitted = Vec::new();
        for raw in &raw_events {
            for cb in &self.callbacks {
                cb(raw);
            }
            let bus_events = self.semantic.reduce(raw).await;
            for event in bus_events {
                self.bus.publish(event.clone()).await;
                emitted.push(event);
            }
        }
        Ok(emitted)
    }

    /// Spawn the background poll loop. Idempotent: calling `start` while
    /// already running is a no-op.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let config = self.config.clone();
        let semantic = self.semantic.clone();
        let bus = self.bus.clone();
        let snapshot = self.snapshot.clone();
        let running = self.running.clone();
        let callbacks = self.callbacks.clone();

        let handle = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let tick_result = scanner::scan(&config);
                match tick_result {
                    Ok(current) => {
                        let mut guard = snapshot.lock().await;
                        let raw_events = scanner::diff(semantic.name(), &guard, &current);
                        *guard = current;
                        drop(guard);

                        for raw in &raw_events {
                            for cb in &callbacks {
                                cb(raw);
                            }
                            for event in semantic.reduce(raw).await {
                                bus.publish(event).await;
                            }
                        }
                    }
                    Err(err) => warn!(watcher = semantic.name(), %err, "scan failed, will retry next tick"),
                }
                tokio::time::sleep(config.poll_interval).await;
            }
        });
        self.task = Some(handle);
    }

    /// Stop the background loop. Idempotent. Cancels the task at its next
    /// await point; any tick already in flight completes its callbacks.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<W> Drop for PollingWatcher<W> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
