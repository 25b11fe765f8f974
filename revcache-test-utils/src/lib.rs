//! revcache Test Utilities
//!
//! Centralized test infrastructure for the revcache workspace:
//! - Mock collaborators standing in for the host application
//! - Proptest generators for identifiers and history payloads
//! - Test fixtures for common scenarios
//! - Custom assertions for revcache error variants

// Re-export the in-memory backend so tests need only this crate
pub use revcache_storage::{InMemoryBlobStore, VersionArtifactStore};

// Re-export core types for convenience
pub use revcache_core::{
    ArtifactKey, ArtifactKind, FileId, FileReference, HistoryPayload, HistoryRecord, OwnerId,
    PathResolver, RemoteFetch, RevcacheError, RevcacheResult, StorageError, UpstreamError,
    VersionId, VersionInfo, VersionProvider,
};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// MOCK COLLABORATORS
// ============================================================================

/// File reference with fixed id, live marker and owner.
#[derive(Debug, Clone)]
pub struct StaticFileReference {
    id: FileId,
    marker: VersionId,
    owner: Option<OwnerId>,
}

impl StaticFileReference {
    pub fn new(id: FileId, marker: VersionId, owner: OwnerId) -> Self {
        Self {
            id,
            marker,
            owner: Some(owner),
        }
    }

    /// A file whose owner cannot be resolved.
    pub fn orphan(id: FileId, marker: VersionId) -> Self {
        Self {
            id,
            marker,
            owner: None,
        }
    }
}

impl FileReference for StaticFileReference {
    fn id(&self) -> FileId {
        self.id
    }

    fn modification_marker(&self) -> VersionId {
        self.marker.clone()
    }

    fn owner(&self) -> Option<OwnerId> {
        self.owner.clone()
    }
}

/// Version provider backed by a map, listing versions oldest first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVersionProvider {
    versions: HashMap<FileId, Vec<VersionId>>,
    failing: bool,
}

impl InMemoryVersionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose every listing fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Register `versions` (oldest first) for `file_id`.
    pub fn with_versions(mut self, file_id: FileId, versions: &[&str]) -> Self {
        let ids = versions
            .iter()
            .map(|id| fixtures::version(id))
            .collect();
        self.versions.insert(file_id, ids);
        self
    }
}

impl VersionProvider for InMemoryVersionProvider {
    fn list_versions(
        &self,
        _owner: &OwnerId,
        file: &dyn FileReference,
    ) -> RevcacheResult<Vec<VersionInfo>> {
        if self.failing {
            return Err(UpstreamError::VersionListing {
                file_id: file.id().to_string(),
                reason: "version storage unavailable".to_string(),
            }
            .into());
        }
        Ok(self
            .versions
            .get(&file.id())
            .map(|ids| ids.iter().cloned().map(VersionInfo::new).collect())
            .unwrap_or_default())
    }
}

/// Remote fetch answering from a fixed URL table; unknown URLs fail.
#[derive(Debug, Default)]
pub struct StubFetch {
    responses: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl StubFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), bytes.into());
        self
    }

    /// Number of fetches attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteFetch for StubFetch {
    fn fetch(&self, url: &str) -> RevcacheResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.get(url).cloned().ok_or_else(|| {
            UpstreamError::FetchFailed {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            }
            .into()
        })
    }
}

/// Path resolver backed by a map of known paths.
#[derive(Debug, Clone, Default)]
pub struct MapPathResolver {
    files: HashMap<String, (OwnerId, FileId)>,
}

impl MapPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, owner: OwnerId, file_id: FileId) -> Self {
        self.files.insert(path.into(), (owner, file_id));
        self
    }
}

impl PathResolver for MapPathResolver {
    fn owner_of(&self, path: &str) -> RevcacheResult<OwnerId> {
        self.files
            .get(path)
            .map(|(owner, _)| owner.clone())
            .ok_or_else(|| {
                UpstreamError::OwnerUnresolved {
                    path: path.to_string(),
                    reason: "no such file".to_string(),
                }
                .into()
            })
    }

    fn file_id_of(&self, path: &str) -> RevcacheResult<FileId> {
        self.files
            .get(path)
            .map(|(_, file_id)| *file_id)
            .ok_or_else(|| {
                UpstreamError::FileUnresolved {
                    path: path.to_string(),
                    reason: "no such file".to_string(),
                }
                .into()
            })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating revcache types.

    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    /// Generate a non-empty owner id, including ids sharing prefixes.
    pub fn arb_owner_id() -> impl Strategy<Value = OwnerId> {
        "[a-z][a-z0-9_.@-]{0,15}".prop_map(|uid| fixtures::owner(&uid))
    }

    /// Generate a file id, biased towards small values that prefix each other.
    pub fn arb_file_id() -> impl Strategy<Value = FileId> {
        prop_oneof![
            3 => 0u64..200,
            1 => any::<u64>(),
        ]
        .prop_map(FileId::new)
    }

    /// Generate a version id shaped like an mtime or a revision token.
    pub fn arb_version_id() -> impl Strategy<Value = VersionId> {
        prop_oneof![
            (1_500_000_000u64..1_900_000_000).prop_map(VersionId::from),
            "[a-z0-9_]{1,12}".prop_map(|id| fixtures::version(&id)),
        ]
    }

    /// Generate an artifact key of either kind.
    pub fn arb_artifact_key() -> impl Strategy<Value = ArtifactKey> {
        (
            prop_oneof![Just(ArtifactKind::History), Just(ArtifactKind::Changes)],
            arb_file_id(),
            arb_version_id(),
        )
            .prop_map(|(kind, file_id, version_id)| ArtifactKey::new(kind, file_id, version_id))
    }

    /// Generate a history payload without the reserved `prev` key.
    pub fn arb_history_payload() -> impl Strategy<Value = HistoryPayload> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[ -~]{0,24}".prop_map(Value::String),
        ];
        prop::collection::btree_map("[a-oq-z][a-zA-Z]{0,10}", leaf, 1..6)
            .prop_map(|entries| entries.into_iter().collect())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use serde_json::json;

    /// Owner id from a literal.
    #[track_caller]
    pub fn owner(uid: &str) -> OwnerId {
        OwnerId::new(uid).expect("fixture owner id must be non-empty")
    }

    /// Version id from a literal.
    #[track_caller]
    pub fn version(id: &str) -> VersionId {
        VersionId::new(id).expect("fixture version id must be non-empty")
    }

    /// History payload as produced by the document server after one edit.
    pub fn sample_history() -> HistoryPayload {
        history_by("alice", "Alice")
    }

    /// History payload attributed to one user.
    pub fn history_by(user_id: &str, name: &str) -> HistoryPayload {
        let value = json!({
            "serverVersion": "7.5.1",
            "changes": [{
                "created": "2024-01-05 10:00:00",
                "user": {"id": user_id, "name": name},
            }],
        });
        match value {
            serde_json::Value::Object(map) => map,
            _ => HistoryPayload::new(),
        }
    }

    /// Fresh store over an empty in-memory backend.
    pub fn memory_store() -> VersionArtifactStore<InMemoryBlobStore> {
        VersionArtifactStore::new(InMemoryBlobStore::new())
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for revcache-specific validation.

    use super::*;

    /// Assert that a RevcacheResult is an Upstream error.
    #[track_caller]
    pub fn assert_upstream_error<T: std::fmt::Debug>(result: &RevcacheResult<T>) {
        match result {
            Err(RevcacheError::Upstream(_)) => {}
            other => panic!("Expected Upstream error, got: {:?}", other),
        }
    }

    /// Assert that a RevcacheResult is a Decode storage error.
    #[track_caller]
    pub fn assert_decode_error<T: std::fmt::Debug>(result: &RevcacheResult<T>) {
        match result {
            Err(RevcacheError::Storage(StorageError::Decode { .. })) => {}
            other => panic!("Expected Decode error, got: {:?}", other),
        }
    }

    /// Assert that a record carries exactly `expected` as its `prev` marker.
    #[track_caller]
    pub fn assert_prev(record: &HistoryRecord, expected: Option<&str>) {
        assert_eq!(
            record.prev().map(VersionId::as_str),
            expected,
            "Wrong prev marker on history record"
        );
    }
}
