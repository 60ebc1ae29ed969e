// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composes [`CasStore`] and [`Manifest`] into the artifact lifecycle API.
//!
//! The CAS exclusively owns byte blobs; the manifest exclusively owns
//! metadata records. This module is the only place that touches both.

use crate::manifest::{ListFilter, Manifest, ManifestStats};
use crate::model::{Artifact, ArtifactId, SourceType, Status};
use crate::store::CasStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use weft_core::error::Result;

/// Parameters for [`ArtifactStore::store`].
#[derive(Debug, Default, Clone)]
pub struct StoreOptions {
    pub content_type: String,
    pub source_type: SourceType,
    pub original_filename: Option<String>,
    pub source_url: Option<String>,
    pub parent_artifact_id: Option<ArtifactId>,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// The artifact store: dedup'd bytes plus their metadata records.
#[derive(Clone)]
pub struct ArtifactStore {
    cas: CasStore,
    manifest: Manifest,
}

impl ArtifactStore {
    pub fn new(cas: CasStore, manifest: Manifest) -> Self {
        Self { cas, manifest }
    }

    pub fn cas(&self) -> &CasStore {
        &self.cas
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Store bytes under a new artifact record. Distinct calls always yield
    /// distinct `artifact_id`s even for identical bytes (dedup happens at
    /// the CAS layer, not the manifest layer).
    pub fn store(&self, bytes: &[u8], options: StoreOptions) -> Result<Artifact> {
        let (content_hash, _path) = self.cas.store(bytes)?;
        let now = Utc::now();
        let artifact = Artifact {
            artifact_id: ArtifactId::new(),
            content_hash,
            source_type: options.source_type,
            status: Status::Active,
            created_at: now,
            updated_at: now,
            expires_at: options.expires_at,
            content_type: options.content_type,
            size_bytes: bytes.len() as u64,
            original_filename: options.original_filename,
            source_url: options.source_url,
            parent_artifact_id: options.parent_artifact_id,
            tags: options.tags,
            metadata: options.metadata,
        };
        self.manifest.append(artifact.clone())?;
        Ok(artifact)
    }

    pub fn get(&self, id: &ArtifactId) -> Option<Artifact> {
        self.manifest.get_active(id)
    }

    pub fn read_bytes(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.cas.path_of(&artifact.content_hash))?)
    }

    pub fn list(&self, filter: &ListFilter) -> Vec<Artifact> {
        self.manifest.list(filter)
    }

    pub fn stats(&self) -> ManifestStats {
        self.manifest.stats()
    }

    /// Mutate metadata fields. The content hash is never touched here.
    pub fn update(&self, id: &ArtifactId, f: impl FnOnce(&mut Artifact)) -> Result<Option<Artifact>> {
        self.manifest.update(id, f)
    }

    /// Mark `expires_at`-elapsed active artifacts as expired.
    pub fn sweep_expired(&self) -> Result<Vec<ArtifactId>> {
        self.manifest.sweep_expired()
    }

    /// Soft delete: keep the manifest record for audit, do not touch the blob.
    pub fn soft_delete(&self, id: &ArtifactId) -> Result<bool> {
        self.manifest.soft_delete(id)
    }

    /// Hard delete: drop the manifest record, then reclaim the CAS blob if
    /// no other live artifact still references its hash.
    pub fn hard_delete(&self, id: &ArtifactId) -> Result<bool> {
        let Some(removed) = self.manifest.hard_delete(id)? else {
            return Ok(false);
        };
        if !self.manifest.any_references(&removed.content_hash, None) {
            self.cas.remove(&removed.content_hash)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
