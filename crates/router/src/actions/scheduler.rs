// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler collaborator consumed by [`super::spawn_agent::SpawnAgentAction`].
//!
//! The concrete agent engine is an explicit non-goal of this crate (§1); this
//! trait is the seam a real engine plugs into, modeled after the teacher's
//! `Scheduler` + `RuntimeDeps` split between orchestration and adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use weft_core::error::Result;

weft_core::define_id! {
    /// Opaque session handle returned by a [`Scheduler::schedule`] call.
    pub struct SessionId("ses-");
}

/// A unit of spawn work submitted to the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTask {
    pub role: String,
    pub prompt: String,
    pub engine: String,
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

/// Point-in-time scheduler load stats, exposed for the `can_execute` guard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub active_tasks: usize,
    pub max_concurrent: usize,
}

impl SchedulerStats {
    pub fn has_capacity(&self) -> bool {
        self.active_tasks < self.max_concurrent
    }
}

/// External collaborator that turns a [`SpawnTask`] into a running session.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn schedule(&self, task: SpawnTask) -> Result<SessionId>;
    fn stats(&self) -> SchedulerStats;
}

/// In-memory scheduler for tests and for wiring this crate without a real
/// agent engine attached.
pub struct FakeScheduler {
    max_concurrent: usize,
    active: std::sync::atomic::AtomicUsize,
    scheduled: parking_lot::Mutex<Vec<SpawnTask>>,
}

impl FakeScheduler {
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent, active: std::sync::atomic::AtomicUsize::new(0), scheduled: parking_lot::Mutex::new(Vec::new()) }
    }

    pub fn scheduled(&self) -> Vec<SpawnTask> {
        self.scheduled.lock().clone()
    }

    pub fn finish_one(&self) {
        self.active.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl Scheduler for FakeScheduler {
    async fn schedule(&self, task: SpawnTask) -> Result<SessionId> {
        self.active.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.scheduled.lock().push(task);
        Ok(SessionId::new())
    }

    fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            active_tasks: self.active.load(std::sync::atomic::Ordering::SeqCst),
            max_concurrent: self.max_concurrent,
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
