// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claim-lease lock manager and the composed message/state transitions it
//! drives on the [`MailboxStore`].

use crate::model::{LockEntry, LockStatus, MessageId};
use crate::store::MailboxStore;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use weft_core::error::{Error, Result};

/// Maximum number of retryable failures before a message is deadlettered.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base, multiplier, and cap for the exponential retry backoff (§4.H).
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base_secs: u64,
    pub multiplier: f64,
    pub max_secs: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { base_secs: 5, multiplier: 2.0, max_secs: 300 }
    }
}

impl BackoffPolicy {
    pub fn backoff_for(&self, retry_count: u32) -> std::time::Duration {
        let scaled = self.base_secs as f64 * self.multiplier.powi(retry_count as i32);
        let capped = scaled.min(self.max_secs as f64).max(0.0);
        std::time::Duration::from_secs_f64(capped)
    }
}

struct Inner {
    locks: HashMap<MessageId, LockEntry>,
}

/// Holds the mailbox's claim leases in memory, persisted to
/// `.state/locks.json` under a single mutex.
pub struct LockManager {
    store: MailboxStore,
    inner: Mutex<Inner>,
}

impl LockManager {
    pub fn load(store: MailboxStore) -> Result<Self> {
        let table = store.get_locks()?;
        let now = Utc::now();
        let locks: HashMap<MessageId, LockEntry> = table
            .into_iter()
            .map(|(_, mut entry)| {
                if entry.is_expired(now) {
                    revert_to_new(&mut entry);
                }
                (entry.message_id, entry)
            })
            .collect();
        Ok(Self { store, inner: Mutex::new(Inner { locks }) })
    }

    fn persist_locked(&self, inner: &Inner) -> Result<()> {
        let table = inner
            .locks
            .values()
            .map(|e| (e.message_id.to_string(), e.clone()))
            .collect();
        self.store.save_locks(&table)
    }

    /// Snapshot every lock entry currently held, for schedulers that need to
    /// scan the whole table (e.g. the retry-scheduling tick in §10.1).
    pub fn all_entries(&self) -> Vec<LockEntry> {
        self.inner.lock().locks.values().cloned().collect()
    }

    /// Current status of a message's lock, reverting an expired claim first.
    pub fn get_status(&self, message_id: &MessageId) -> Option<LockEntry> {
        let mut inner = self.inner.lock();
        let now = Utc::now();
        if let Some(entry) = inner.locks.get_mut(message_id) {
            if entry.is_expired(now) {
                revert_to_new(entry);
                let snapshot = entry.clone();
                let _ = self.persist_locked(&inner);
                return Some(snapshot);
            }
            return Some(entry.clone());
        }
        None
    }

    /// Revert any claimed-but-expired lock to `new`. Returns the ids touched.
    pub fn cleanup_expired_locks(&self) -> Result<Vec<MessageId>> {
        let mut inner = self.inner.lock();
        let now = Utc::now();
        let mut touched = Vec::new();
        for entry in inner.locks.values_mut() {
            if entry.is_expired(now) {
                revert_to_new(entry);
                touched.push(entry.message_id);
            }
        }
        if !touched.is_empty() {
            self.persist_locked(&inner)?;
        }
        Ok(touched)
    }

    /// Claim `message_id` for `agent_id` with a lease of `timeout_s` seconds.
    pub fn claim(&self, message_id: &MessageId, agent_id: &str, timeout_s: i64) -> Result<LockEntry> {
        let mut inner = self.inner.lock();
        let now = Utc::now();

        let entry = inner
            .locks
            .entry(*message_id)
            .or_insert_with(|| LockEntry::new(*message_id));

        if entry.is_expired(now) {
            revert_to_new(entry);
        }

        if entry.status == LockStatus::Claimed {
            return Err(Error::conflict(format!(
                "already_claimed:{}",
                entry.claimed_by.clone().unwrap_or_default()
            )));
        }

        entry.status = LockStatus::Claimed;
        entry.claimed_by = Some(agent_id.to_string());
        entry.claimed_at = Some(now);
        entry.expires_at = Some(now + chrono::Duration::seconds(timeout_s));
        let snapshot = entry.clone();
        self.persist_locked(&inner)?;
        Ok(snapshot)
    }

    fn require_claimed_by<'a>(
        inner: &'a mut Inner,
        message_id: &MessageId,
        agent_id: &str,
    ) -> Result<&'a mut LockEntry> {
        let entry = inner
            .locks
            .get_mut(message_id)
            .ok_or_else(|| Error::not_found(format!("no lock for {message_id}")))?;
        if entry.status != LockStatus::Claimed {
            return Err(Error::conflict(format!("message {message_id} is not claimed")));
        }
        match &entry.claimed_by {
            Some(owner) if owner == agent_id => Ok(entry),
            Some(owner) => Err(Error::conflict(format!("claimed_by_other:{owner}"))),
            None => Err(Error::conflict("lock has no claimant recorded")),
        }
    }

    /// Mark a claimed message completed, resetting its retry counter.
    pub fn complete(&self, message_id: &MessageId, agent_id: &str) -> Result<LockEntry> {
        let mut inner = self.inner.lock();
        let entry = Self::require_claimed_by(&mut inner, message_id, agent_id)?;
        entry.status = LockStatus::Completed;
        entry.retry_count = 0;
        entry.fail_reason = None;
        let snapshot = entry.clone();
        self.persist_locked(&inner)?;
        Ok(snapshot)
    }

    /// Record a claimed message's failure. Redeliverable if `retryable` and
    /// under [`MAX_RETRY_ATTEMPTS`]; otherwise deadlettered.
    pub fn fail(&self, message_id: &MessageId, agent_id: &str, reason: &str, retryable: bool) -> Result<LockEntry> {
        let mut inner = self.inner.lock();
        let entry = Self::require_claimed_by(&mut inner, message_id, agent_id)?;
        entry.retry_count += 1;
        entry.fail_reason = Some(reason.to_string());

        if retryable && entry.retry_count < MAX_RETRY_ATTEMPTS {
            entry.status = LockStatus::New;
            entry.claimed_by = None;
            entry.claimed_at = None;
            entry.expires_at = None;
        } else {
            entry.status = LockStatus::Deadletter;
        }

        let snapshot = entry.clone();
        self.persist_locked(&inner)?;
        Ok(snapshot)
    }
}

fn revert_to_new(entry: &mut LockEntry) {
    entry.status = LockStatus::New;
    entry.claimed_by = None;
    entry.claimed_at = None;
    entry.expires_at = None;
}

/// Composes the [`LockManager`] with the [`MailboxStore`]: lock transitions
/// also move the message file between directories.
pub struct MessageStateManager {
    store: MailboxStore,
    locks: LockManager,
    backoff: BackoffPolicy,
}

impl MessageStateManager {
    pub fn new(store: MailboxStore, locks: LockManager) -> Self {
        Self { store, locks, backoff: BackoffPolicy::default() }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    pub fn store(&self) -> &MailboxStore {
        &self.store
    }

    pub fn claim(&self, message_id: &MessageId, agent_id: &str, timeout_s: i64) -> Result<LockEntry> {
        self.locks.claim(message_id, agent_id, timeout_s)
    }

    /// Complete a claim and archive the underlying message file.
    pub fn complete(&self, message_id: &MessageId, agent_id: &str) -> Result<(LockEntry, Option<std::path::PathBuf>)> {
        let lock = self.locks.complete(message_id, agent_id)?;
        let archived_path = match self.store.find_by_id(message_id)? {
            Some(located) => Some(self.store.archive(&located)?),
            None => None,
        };
        Ok((lock, archived_path))
    }

    /// Fail a claim; deadletters (and moves the file) once the retry budget
    /// is exhausted.
    pub fn fail(
        &self,
        message_id: &MessageId,
        agent_id: &str,
        reason: &str,
        retryable: bool,
    ) -> Result<(LockEntry, Option<std::path::PathBuf>)> {
        let lock = self.locks.fail(message_id, agent_id, reason, retryable)?;
        if lock.status == LockStatus::Deadletter {
            let deadletter_path = match self.store.find_by_id(message_id)? {
                Some(located) => Some(self.store.move_to_deadletter(&located)?),
                None => None,
            };
            return Ok((lock, deadletter_path));
        }
        Ok((lock, None))
    }

    /// Backoff duration a retry scheduler should wait before re-dispatching.
    pub fn retry_backoff(&self, retry_count: u32) -> std::time::Duration {
        self.backoff.backoff_for(retry_count)
    }

    pub fn due_for_retry(&self, entry: &LockEntry, now: DateTime<Utc>) -> bool {
        entry.status == LockStatus::New
            && entry.fail_reason.is_some()
            && entry
                .claimed_at
                .map(|claimed_at| now >= claimed_at + self.backoff_chrono(entry.retry_count))
                .unwrap_or(true)
    }

    fn backoff_chrono(&self, retry_count: u32) -> chrono::Duration {
        chrono::Duration::from_std(self.retry_backoff(retry_count)).unwrap_or(chrono::Duration::zero())
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
