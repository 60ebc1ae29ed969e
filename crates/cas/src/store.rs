// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sharded, deduplicated, atomic-write byte storage.
//!
//! A 256-bit content hash `h` is stored at `<root>/<h[0:2]>/<h[2:4]>/<h>`.
//! Writes land in a temp file in the target shard, flush, then rename over
//! the target; on collision (identical bytes by construction) the write is
//! skipped, which is the dedup point.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use weft_core::error::{Error, Result};

/// Number of hex characters in a content hash (256 bits).
pub const HASH_HEX_LEN: usize = 64;

/// Compute the lowercase hex SHA-256 digest of `bytes`.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// Validate that `hash` is exactly [`HASH_HEX_LEN`] lowercase hex characters.
pub fn validate_hash(hash: &str) -> Result<()> {
    if hash.len() != HASH_HEX_LEN || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::invalid_input(format!(
            "content hash must be {HASH_HEX_LEN} hex characters, got {:?}",
            hash
        )));
    }
    Ok(())
}

/// Sharded content-addressable byte store.
#[derive(Debug, Clone)]
pub struct CasStore {
    root: PathBuf,
}

impl CasStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path a hash would live at, regardless of whether it exists.
    pub fn path_of(&self, hash: &str) -> PathBuf {
        self.root.join(&hash[0..2]).join(&hash[2..4]).join(hash)
    }

    pub fn exists(&self, hash: &str) -> bool {
        self.path_of(hash).is_file()
    }

    /// Store `bytes`, returning `(hash, path)`. Idempotent: storing the same
    /// bytes twice is a no-op write on the second call.
    // path_of always joins two shard components onto root, so it always has a parent.
    #[allow(clippy::expect_used)]
    pub fn store(&self, bytes: &[u8]) -> Result<(String, PathBuf)> {
        let hash = hash_bytes(bytes);
        let target = self.path_of(&hash);

        if target.is_file() {
            return Ok((hash, target));
        }

        let shard_dir = target.parent().expect("path_of always has a parent");
        fs::create_dir_all(shard_dir)?;

        let tmp_name = format!(".{}.tmp-{}", hash, std::process::id());
        let tmp_path = shard_dir.join(tmp_name);

        let write_result = (|| -> Result<()> {
            let mut f = File::create(&tmp_path)?;
            f.write_all(bytes)?;
            f.sync_all()?;
            Ok(())
        })();

        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }

        match fs::rename(&tmp_path, &target) {
            Ok(()) => Ok((hash, target)),
            Err(err) => {
                let _ = fs::remove_file(&tmp_path);
                // Another writer may have won the race; identical bytes by
                // construction, so a now-existing target is not an error.
                if target.is_file() {
                    Ok((hash, target))
                } else {
                    Err(Error::from(err))
                }
            }
        }
    }

    /// Unlink the blob for `hash` if present. Callers are responsible for
    /// first confirming no live artifact still references it.
    pub fn remove(&self, hash: &str) -> Result<bool> {
        let target = self.path_of(hash);
        if !target.is_file() {
            return Ok(false);
        }
        fs::remove_file(&target)?;
        self.cleanup_empty_shards(&target);
        Ok(true)
    }

    /// Best-effort removal of now-empty shard directories above `blob_path`.
    fn cleanup_empty_shards(&self, blob_path: &Path) {
        let mut dir = blob_path.parent();
        while let Some(d) = dir {
            if d == self.root {
                break;
            }
            match fs::read_dir(d) {
                Ok(mut entries) if entries.next().is_none() => {
                    let _ = fs::remove_dir(d);
                    dir = d.parent();
                }
                _ => break,
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
