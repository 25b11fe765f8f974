//! Integration tests for lifecycle notification handling
//!
//! Tests verify:
//! - Each of the four hooks prunes exactly what it should
//! - Empty paths, missing parameters and unknown hooks are ignored
//! - Resolution failures are swallowed and reported as Failed
//! - Owners never affect each other's artifacts

use std::sync::Arc;

use revcache_events::{HookOutcome, HookParams, LifecycleAdapter, LifecycleSignal};
use revcache_test_utils::fixtures::{history_by, memory_store, owner, sample_history, version};
use revcache_test_utils::{
    FileId, InMemoryBlobStore, MapPathResolver, OwnerId, VersionArtifactStore,
};
use serde_json::{json, Value};

// ============================================================================
// TEST FIXTURES
// ============================================================================

const REPORT: &str = "/alice/files/report.docx";
const SLIDES: &str = "/alice/files/slides.pptx";
const BOB_REPORT: &str = "/bob/files/report.docx";

type Adapter = LifecycleAdapter<InMemoryBlobStore, MapPathResolver>;

fn params(value: Value) -> HookParams {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// alice owns files 1 (report) and 12 (slides) with versions 100 and 200;
/// bob owns file 1 with version 100.
fn seeded() -> (Adapter, Arc<VersionArtifactStore<InMemoryBlobStore>>) {
    let store = Arc::new(memory_store());
    let (alice, bob) = (owner("alice"), owner("bob"));

    for file in [FileId::new(1), FileId::new(12)] {
        for v in ["100", "200"] {
            store.put(&alice, file, &version(v), sample_history(), b"alice", None);
        }
    }
    store.put(
        &bob,
        FileId::new(1),
        &version("100"),
        history_by("bob", "Bob"),
        b"bob",
        None,
    );

    let resolver = MapPathResolver::new()
        .with_file(REPORT, alice.clone(), FileId::new(1))
        .with_file(SLIDES, alice, FileId::new(12))
        .with_file(BOB_REPORT, bob, FileId::new(1));
    (LifecycleAdapter::new(Arc::clone(&store), resolver), store)
}

fn present(
    store: &VersionArtifactStore<InMemoryBlobStore>,
    owner: &OwnerId,
    file: u64,
    v: &str,
) -> bool {
    store.get(owner, FileId::new(file), &version(v), None).is_some()
}

// ============================================================================
// USER REMOVED
// ============================================================================

#[test]
fn test_user_removed_drops_namespace() {
    let (adapter, store) = seeded();

    let outcome = adapter.on_user_removed(&params(json!({"uid": "alice"})));

    assert_eq!(outcome, HookOutcome::Applied { removed: 8 });
    assert!(!store.has_namespace(&owner("alice")));
    assert!(present(&store, &owner("bob"), 1, "100"));
}

#[test]
fn test_user_removed_without_cache_applies_nothing() {
    let (adapter, _store) = seeded();
    assert_eq!(
        adapter.on_user_removed(&params(json!({"uid": "carol"}))),
        HookOutcome::Applied { removed: 0 }
    );
}

// ============================================================================
// FILE REMOVED
// ============================================================================

#[test]
fn test_file_removed_drops_every_version_of_that_file() {
    let (adapter, store) = seeded();
    let alice = owner("alice");

    let outcome = adapter.on_file_removed(&params(json!({"path": REPORT})));

    assert_eq!(outcome.removed(), 4);
    assert!(!present(&store, &alice, 1, "100"));
    assert!(!present(&store, &alice, 1, "200"));
    assert!(present(&store, &alice, 12, "100"));
    assert!(present(&store, &alice, 12, "200"));
    assert!(present(&store, &owner("bob"), 1, "100"));
}

#[test]
fn test_file_removed_with_empty_path_is_ignored() {
    let (adapter, store) = seeded();
    assert_eq!(
        adapter.on_file_removed(&params(json!({"path": ""}))),
        HookOutcome::Ignored
    );
    assert_eq!(store.backend().artifact_count(&owner("alice")), 8);
}

#[test]
fn test_file_removed_unresolvable_path_fails_quietly() {
    let (adapter, store) = seeded();
    assert_eq!(
        adapter.on_file_removed(&params(json!({"path": "/alice/files/gone.docx"}))),
        HookOutcome::Failed
    );
    assert_eq!(store.backend().artifact_count(&owner("alice")), 8);
}

// ============================================================================
// VERSION REMOVED
// ============================================================================

#[test]
fn test_version_removed_drops_single_pair() {
    let (adapter, store) = seeded();
    let alice = owner("alice");

    let outcome = adapter.on_version_removed(&params(json!({"path": format!("{REPORT}.v100")})));

    assert_eq!(outcome, HookOutcome::Applied { removed: 2 });
    assert!(!present(&store, &alice, 1, "100"));
    assert!(present(&store, &alice, 1, "200"));
    assert!(present(&store, &alice, 12, "100"));
    assert!(present(&store, &owner("bob"), 1, "100"));
}

#[test]
fn test_version_removed_with_malformed_token_is_ignored() {
    let (adapter, store) = seeded();
    assert_eq!(
        adapter.on_version_removed(&params(json!({"path": REPORT}))),
        HookOutcome::Ignored
    );
    assert_eq!(store.backend().artifact_count(&owner("alice")), 8);
}

// ============================================================================
// VERSION ROLLED BACK
// ============================================================================

#[test]
fn test_version_rolled_back_drops_revision() {
    let (adapter, store) = seeded();
    let alice = owner("alice");

    let outcome =
        adapter.on_version_rolled_back(&params(json!({"path": SLIDES, "revision": 200})));

    assert_eq!(outcome.removed(), 2);
    assert!(!present(&store, &alice, 12, "200"));
    assert!(present(&store, &alice, 12, "100"));
    assert!(present(&store, &alice, 1, "200"));
}

#[test]
fn test_version_rolled_back_missing_revision_is_ignored() {
    let (adapter, _store) = seeded();
    assert_eq!(
        adapter.on_version_rolled_back(&params(json!({"path": SLIDES}))),
        HookOutcome::Ignored
    );
}

// ============================================================================
// DISPATCH BY HOOK NAME
// ============================================================================

#[test]
fn test_dispatch_hook_routes_subscriptions() {
    let (adapter, store) = seeded();

    let outcome = adapter.dispatch_hook(
        "\\OCP\\Versions",
        "preDelete",
        &params(json!({"path": format!("{BOB_REPORT}.v100")})),
    );
    assert_eq!(outcome.removed(), 2);
    assert!(!present(&store, &owner("bob"), 1, "100"));

    let unsubscribed = params(json!({"path": REPORT}));
    assert_eq!(
        adapter.dispatch_hook("OC_Filesystem", "post_write", &unsubscribed),
        HookOutcome::Ignored
    );
    assert_eq!(LifecycleSignal::subscriptions().len(), 4);
}
