// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyed debounce buffering of rapid inbound-message bursts.
//!
//! Each key accumulates messages until it has been idle for `window` or has
//! been open for `max_wait`, whichever comes first, then flushes in arrival
//! order via the registered callback.

use crate::model::Message;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

type FlushFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type FlushCallback = Arc<dyn Fn(String, Vec<Message>) -> FlushFuture + Send + Sync>;

struct Buffer {
    first_arrival: DateTime<Utc>,
    last_arrival: DateTime<Utc>,
    messages: Vec<Message>,
}

struct Inner {
    buffers: HashMap<String, Buffer>,
    shutting_down: bool,
}

/// Default debounce key: `session_id:thread_key|_`.
pub fn default_key(message: &Message) -> String {
    match &message.session {
        Some(session) => format!("{}:{}", session.id, session.thread_key.as_deref().unwrap_or("_")),
        None => "_".to_string(),
    }
}

/// Groups messages by key, flushing idle or over-age buffers.
pub struct DebounceBuffer {
    window: Duration,
    max_wait: Duration,
    inner: Mutex<Inner>,
    on_flush: FlushCallback,
    notify: Arc<Notify>,
}

impl DebounceBuffer {
    pub fn new<F, Fut>(window: Duration, max_wait: Duration, on_flush: F) -> Arc<Self>
    where
        F: Fn(String, Vec<Message>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Arc::new(Self {
            window,
            max_wait,
            inner: Mutex::new(Inner { buffers: HashMap::new(), shutting_down: false }),
            on_flush: Arc::new(move |key, messages| Box::pin(on_flush(key, messages))),
            notify: Arc::new(Notify::new()),
        })
    }

    /// Buffer one message under `key`, scheduling an idle-flush task the
    /// first time a key is seen and flushing immediately if the key is
    /// already past its window or max-wait budget.
    pub fn add(self: &Arc<Self>, key: String, message: Message) {
        let now = Utc::now();
        let mut should_spawn_watcher = false;
        let mut immediate_flush = None;

        {
            let mut inner = self.inner.lock();
            if inner.shutting_down {
                return;
            }

            let is_new = !inner.buffers.contains_key(&key);
            let buffer = inner.buffers.entry(key.clone()).or_insert_with(|| {
                should_spawn_watcher = is_new;
                Buffer { first_arrival: now, last_arrival: now, messages: Vec::new() }
            });
            buffer.last_arrival = now;
            buffer.messages.push(message);

            let elapsed_total = (now - buffer.first_arrival).to_std().unwrap_or_default();
            if elapsed_total >= self.max_wait {
                immediate_flush = inner.buffers.remove(&key).map(|b| b.messages);
            }
        }

        if let Some(messages) = immediate_flush {
            self.spawn_flush(key.clone(), messages);
            return;
        }

        if should_spawn_watcher {
            self.spawn_idle_watcher(key);
        }
    }

    fn spawn_idle_watcher(self: &Arc<Self>, key: String) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(this.window).await;
                let mut inner = this.inner.lock();
                let Some(buffer) = inner.buffers.get(&key) else {
                    // Already flushed (e.g. a max_wait-triggered immediate flush).
                    return;
                };
                let idle = (Utc::now() - buffer.last_arrival).to_std().unwrap_or_default();
                if idle < this.window {
                    continue;
                }
                let Some(buffer) = inner.buffers.remove(&key) else {
                    return;
                };
                drop(inner);
                this.spawn_flush(key, buffer.messages);
                return;
            }
        });
    }

    fn spawn_flush(self: &Arc<Self>, key: String, messages: Vec<Message>) {
        let callback = Arc::clone(&self.on_flush);
        let notify = Arc::clone(&self.notify);
        tokio::spawn(async move {
            (callback)(key, messages).await;
            notify.notify_waiters();
        });
    }

    /// Drain every open buffer, flush each, and refuse further input.
    pub async fn flush_all(self: &Arc<Self>) {
        let drained: Vec<(String, Vec<Message>)> = {
            let mut inner = self.inner.lock();
            inner.shutting_down = true;
            inner.buffers.drain().map(|(k, b)| (k, b.messages)).collect()
        };
        for (key, messages) in drained {
            (self.on_flush)(key, messages).await;
        }
    }

    pub fn pending_keys(&self) -> usize {
        self.inner.lock().buffers.len()
    }

    /// Resolves the next time any flush completes; callers (tests, mostly)
    /// use this instead of polling `pending_keys`.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
