// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL registry of artifact metadata.
//!
//! New records are appended; updates and hard-deletes rewrite the full file
//! to a sibling temp path and rename over it. A process-wide mutex
//! serializes writers so readers never observe a torn line.

use crate::model::{Artifact, ArtifactId, SourceType, Status};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use weft_core::error::Result;

/// Filters accepted by [`Manifest::list`].
#[derive(Debug, Default, Clone)]
pub struct ListFilter {
    pub status: Option<Status>,
    pub source_type: Option<SourceType>,
    pub tags: Vec<String>,
    pub include_expired: bool,
}

/// Aggregate counters returned by [`Manifest::stats`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct ManifestStats {
    pub counts_by_status: HashMap<String, u64>,
    pub total_size_bytes: u64,
    pub path: PathBuf,
}

struct Inner {
    path: PathBuf,
    cache: HashMap<ArtifactId, Artifact>,
    /// Lines that failed to parse on load; kept only for diagnostics.
    skipped: u64,
}

/// JSONL artifact manifest, one record per line.
#[derive(Clone)]
pub struct Manifest {
    inner: Arc<Mutex<Inner>>,
}

impl Manifest {
    /// Load (or create) the manifest at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut cache = HashMap::new();
        let mut skipped = 0u64;

        if path.is_file() {
            let file = File::open(&path)?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Artifact>(&line) {
                    Ok(artifact) => {
                        cache.insert(artifact.artifact_id, artifact);
                    }
                    Err(_) => skipped += 1,
                }
            }
        } else {
            File::create(&path)?;
        }

        Ok(Self { inner: Arc::new(Mutex::new(Inner { path, cache, skipped })) })
    }

    pub fn skipped_lines(&self) -> u64 {
        self.inner.lock().skipped
    }

    /// Append a newly created record.
    pub fn append(&self, artifact: Artifact) -> Result<()> {
        let mut inner = self.inner.lock();
        let line = serde_json::to_string(&artifact)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&inner.path)?;
        writeln!(file, "{line}")?;
        file.sync_all()?;

        inner.cache.insert(artifact.artifact_id, artifact);
        Ok(())
    }

    /// Fetch an artifact by id, but only if it is still active.
    pub fn get_active(&self, id: &ArtifactId) -> Option<Artifact> {
        let inner = self.inner.lock();
        inner.cache.get(id).filter(|a| a.is_active()).cloned()
    }

    /// Fetch an artifact by id regardless of lifecycle state.
    pub fn get_any(&self, id: &ArtifactId) -> Option<Artifact> {
        self.inner.lock().cache.get(id).cloned()
    }

    pub fn list(&self, filter: &ListFilter) -> Vec<Artifact> {
        let inner = self.inner.lock();
        let mut out: Vec<Artifact> = inner
            .cache
            .values()
            .filter(|a| filter.include_expired || a.status != Status::Expired)
            .filter(|a| filter.status.map(|s| s == a.status).unwrap_or(true))
            .filter(|a| filter.source_type.map(|s| s == a.source_type).unwrap_or(true))
            .filter(|a| filter.tags.iter().all(|t| a.tags.contains(t)))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// Mutate a record in place and rewrite the manifest file.
    ///
    /// `f` must not change `content_hash`; the caller is trusted to respect
    /// that invariant since the manifest itself does not enforce it.
    pub fn update(&self, id: &ArtifactId, f: impl FnOnce(&mut Artifact)) -> Result<Option<Artifact>> {
        let mut inner = self.inner.lock();
        let Some(artifact) = inner.cache.get_mut(id) else {
            return Ok(None);
        };
        f(artifact);
        artifact.updated_at = Utc::now();
        let updated = artifact.clone();
        self.rewrite_locked(&inner)?;
        Ok(Some(updated))
    }

    /// Soft delete: mark the record deleted but keep it in the manifest for
    /// audit. Returns `true` if a live record was found.
    pub fn soft_delete(&self, id: &ArtifactId) -> Result<bool> {
        let found = self.update(id, |a| a.status = Status::Deleted)?;
        Ok(found.is_some())
    }

    /// Hard delete: remove the record from the manifest entirely.
    pub fn hard_delete(&self, id: &ArtifactId) -> Result<Option<Artifact>> {
        let mut inner = self.inner.lock();
        let removed = inner.cache.remove(id);
        if removed.is_some() {
            self.rewrite_locked(&inner)?;
        }
        Ok(removed)
    }

    /// True if any remaining (non-deleted in the caller's sense is up to the
    /// caller; this checks any record at all) artifact still references `hash`.
    pub fn any_references(&self, hash: &str, exclude: Option<&ArtifactId>) -> bool {
        let inner = self.inner.lock();
        inner.cache.values().any(|a| {
            a.status != Status::Deleted
                && a.content_hash == hash
                && exclude.map(|ex| ex != &a.artifact_id).unwrap_or(true)
        })
    }

    /// Mark every active artifact whose `expires_at` has passed as expired.
    /// Returns the ids affected.
    pub fn sweep_expired(&self) -> Result<Vec<ArtifactId>> {
        let mut inner = self.inner.lock();
        let now = Utc::now();
        let mut affected = Vec::new();
        for artifact in inner.cache.values_mut() {
            if artifact.status == Status::Active && artifact.expires_at.map(|e| e <= now).unwrap_or(false) {
                artifact.status = Status::Expired;
                artifact.updated_at = now;
                affected.push(artifact.artifact_id);
            }
        }
        if !affected.is_empty() {
            self.rewrite_locked(&inner)?;
        }
        Ok(affected)
    }

    pub fn stats(&self) -> ManifestStats {
        let inner = self.inner.lock();
        let mut counts_by_status = HashMap::new();
        let mut total_size_bytes = 0u64;
        for artifact in inner.cache.values() {
            *counts_by_status.entry(artifact.status.to_string()).or_insert(0) += 1;
            total_size_bytes += artifact.size_bytes;
        }
        ManifestStats { counts_by_status, total_size_bytes, path: inner.path.clone() }
    }

    fn rewrite_locked(&self, inner: &Inner) -> Result<()> {
        let dir = inner.path.parent().unwrap_or(Path::new("."));
        let tmp_path = dir.join(format!(".manifest.tmp-{}", std::process::id()));

        let write_result = (|| -> Result<()> {
            let mut file = File::create(&tmp_path)?;
            let mut records: Vec<&Artifact> = inner.cache.values().collect();
            records.sort_by_key(|a| a.created_at);
            for record in records {
                writeln!(file, "{}", serde_json::to_string(record)?)?;
            }
            file.sync_all()?;
            Ok(())
        })();

        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }

        fs::rename(&tmp_path, &inner.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
