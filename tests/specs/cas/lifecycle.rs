//! Expiry sweep, dedup, and hard-delete interacting across the CAS and the
//! manifest: an expired artifact still counts as a live reference to its
//! blob, and the blob is only reclaimed once the last *non-deleted* record
//! referencing its hash is gone (spec.md §3, §4.A, §4.B, §8 invariant 1, 3).

use crate::prelude::*;
use weft_cas::artifacts::StoreOptions;
use weft_cas::{ArtifactStore, CasStore, Manifest, Status};

fn store(dir: &std::path::Path) -> ArtifactStore {
    let cas = CasStore::new(dir.join("cas"));
    let manifest = Manifest::open(dir.join("manifest.jsonl")).expect("open manifest");
    ArtifactStore::new(cas, manifest)
}

#[test]
fn an_expired_sibling_still_keeps_the_blob_alive_for_hard_delete() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());

    let soon_to_expire = chrono::Utc::now() - chrono::Duration::seconds(1);
    let expiring = store
        .store(
            b"shared payload",
            StoreOptions { content_type: "text/plain".into(), expires_at: Some(soon_to_expire), ..Default::default() },
        )
        .expect("store expiring artifact");
    let sibling = store
        .store(b"shared payload", StoreOptions { content_type: "text/plain".into(), ..Default::default() })
        .expect("store sibling artifact");
    assert_eq!(expiring.content_hash, sibling.content_hash);

    let swept = store.sweep_expired().expect("sweep");
    assert_eq!(swept, vec![expiring.artifact_id]);

    let expired_record = store.manifest().get_any(&expiring.artifact_id).expect("record still present");
    assert_eq!(expired_record.status, Status::Expired, "expiry never removes the manifest record");
    assert!(store.cas().exists(&expiring.content_hash), "sibling still references the hash");

    // Hard-deleting the expired record alone must not touch the blob: the
    // sibling is still active and references the same hash.
    store.hard_delete(&expiring.artifact_id).expect("hard delete expired");
    assert!(store.cas().exists(&sibling.content_hash), "sibling keeps the blob alive");
    assert!(store.manifest().get_any(&expiring.artifact_id).is_none(), "manifest record is gone");

    // Only once the sibling is hard-deleted too does the blob get reclaimed.
    store.hard_delete(&sibling.artifact_id).expect("hard delete sibling");
    assert!(!store.cas().exists(&sibling.content_hash), "last reference gone, blob reclaimed");
}

#[test]
fn listing_excludes_expired_unless_asked_for_and_sorts_newest_first() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());

    let past = chrono::Utc::now() - chrono::Duration::seconds(1);
    let old = store
        .store(b"old", StoreOptions { content_type: "text/plain".into(), expires_at: Some(past), ..Default::default() })
        .expect("store old");
    std::thread::sleep(std::time::Duration::from_millis(5));
    let fresh = store.store(b"fresh", StoreOptions { content_type: "text/plain".into(), ..Default::default() }).expect("store fresh");

    store.sweep_expired().expect("sweep");

    let active_only = store.list(&weft_cas::manifest::ListFilter::default());
    assert_eq!(active_only.iter().map(|a| a.artifact_id).collect::<Vec<_>>(), vec![fresh.artifact_id]);

    let including_expired =
        store.list(&weft_cas::manifest::ListFilter { include_expired: true, ..Default::default() });
    assert_eq!(including_expired.len(), 2, "both records visible with include_expired");
    assert_eq!(including_expired[0].artifact_id, fresh.artifact_id, "newest first");
    assert_eq!(including_expired[1].artifact_id, old.artifact_id);
}
