// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Courier daemon's main loop (§10.1): three cooperative ticks —
//! outbound drain, retry scheduling, expiry sweep — selected over alongside
//! the shutdown signal. None of them ship an adapter in this crate; adapters
//! are an explicit non-goal, but the drain loop and the trait boundary it
//! depends on are in scope.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};
use weft_bus::{Event, EventBus, EventType};
use weft_cas::ArtifactStore;
use weft_core::error::Result;
use weft_mailbox::{LocatedMessage, MessageStateManager};

/// Something that can deliver an outbound mailbox draft to its provider.
/// No concrete implementation ships here — adapters are a non-goal — but
/// the drain tick depends on this boundary.
#[async_trait]
pub trait OutboundAdapter: Send + Sync {
    fn provider(&self) -> &str;
    async fn send(&self, draft: &LocatedMessage) -> Result<()>;
}

/// Tick intervals the main loop is driven by (§10.2's `*_interval_ms` fields).
#[derive(Debug, Clone, Copy)]
pub struct TickIntervals {
    pub outbound_drain: std::time::Duration,
    pub retry_scan: std::time::Duration,
    pub expiry_sweep: std::time::Duration,
}

/// Everything one iteration of the main loop needs.
pub struct MainLoop {
    state_manager: Arc<MessageStateManager>,
    artifacts: Arc<ArtifactStore>,
    bus: EventBus,
    adapters: Vec<Arc<dyn OutboundAdapter>>,
    intervals: TickIntervals,
}

impl MainLoop {
    pub fn new(
        state_manager: Arc<MessageStateManager>,
        artifacts: Arc<ArtifactStore>,
        bus: EventBus,
        intervals: TickIntervals,
    ) -> Self {
        Self { state_manager, artifacts, bus, adapters: Vec::new(), intervals }
    }

    pub fn with_adapters(mut self, adapters: Vec<Arc<dyn OutboundAdapter>>) -> Self {
        self.adapters = adapters;
        self
    }

    fn adapter_for(&self, provider: &str) -> Option<&Arc<dyn OutboundAdapter>> {
        self.adapters.iter().find(|a| a.provider() == provider)
    }

    /// One outbound-drain tick: hand every outbound draft to its adapter,
    /// archiving on success and leaving it in place on failure for the next
    /// tick.
    pub async fn drain_outbound_once(&self) -> Result<usize> {
        let drafts = self.state_manager.store().list_outbound(None)?;
        let mut drained = 0;
        for located in drafts {
            let Some(adapter) = self.adapter_for(&located.message.provider) else {
                continue;
            };
            match adapter.send(&located).await {
                Ok(()) => {
                    self.state_manager.store().archive(&located)?;
                    drained += 1;
                }
                Err(err) => {
                    warn!(provider = %located.message.provider, %err, "outbound send failed, retrying next tick");
                }
            }
        }
        Ok(drained)
    }

    /// One retry-scheduling tick: re-publish `mailbox.inbound_received` for
    /// every lock whose retry backoff has elapsed since its last failure.
    pub async fn retry_scan_once(&self) -> usize {
        let now = chrono::Utc::now();
        let due: Vec<_> = self
            .state_manager
            .locks()
            .all_entries()
            .into_iter()
            .filter(|entry| self.state_manager.due_for_retry(entry, now))
            .collect();

        for entry in &due {
            let mut payload = HashMap::new();
            payload.insert("message_id".to_string(), serde_json::json!(entry.message_id.to_string()));
            payload.insert("retry_count".to_string(), serde_json::json!(entry.retry_count));
            let event = Event::new(EventType::MailboxInboundReceived, payload).with_source("courier.retry_scheduler");
            self.bus.publish(event).await;
        }
        due.len()
    }

    /// One expiry-sweep tick: revert expired mailbox claims and sweep the
    /// artifact manifest for expired artifacts.
    pub fn expiry_sweep_once(&self) -> Result<(usize, usize)> {
        let expired_locks = self.state_manager.locks().cleanup_expired_locks()?;
        let expired_artifacts = self.artifacts.sweep_expired()?;
        Ok((expired_locks.len(), expired_artifacts.len()))
    }

    /// Run until `shutdown` is signalled, ticking each of the three
    /// schedules independently via `tokio::select!`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut outbound_tick = interval(self.intervals.outbound_drain);
        let mut retry_tick = interval(self.intervals.retry_scan);
        let mut expiry_tick = interval(self.intervals.expiry_sweep);

        loop {
            tokio::select! {
                _ = outbound_tick.tick() => {
                    match self.drain_outbound_once().await {
                        Ok(n) if n > 0 => debug!(drained = n, "outbound drain tick"),
                        Ok(_) => {}
                        Err(err) => warn!(%err, "outbound drain tick failed"),
                    }
                }
                _ = retry_tick.tick() => {
                    let n = self.retry_scan_once().await;
                    if n > 0 {
                        debug!(rescheduled = n, "retry scan tick");
                    }
                }
                _ = expiry_tick.tick() => {
                    match self.expiry_sweep_once() {
                        Ok((locks, artifacts)) if locks > 0 || artifacts > 0 => {
                            debug!(locks, artifacts, "expiry sweep tick");
                        }
                        Ok(_) => {}
                        Err(err) => warn!(%err, "expiry sweep tick failed"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("main loop observed shutdown signal, exiting");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "mainloop_tests.rs"]
mod tests;
