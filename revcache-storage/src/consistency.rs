//! Consistency check for cached history records.
//!
//! A record is trusted only while its stored `prev` marker equals the
//! predecessor the reader expects right now. When they differ, the file was
//! edited outside the tracked chain (or the history was recomputed), so the
//! whole pair is removed. The first read that notices the mismatch heals the
//! cache; later reads see nothing until a new save.

use revcache_core::{ArtifactKey, FileId, HistoryRecord, VersionId};

use crate::blob::Namespace;

/// Outcome of comparing a stored record with the expected predecessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Consistency {
    /// `prev` matches; the record can be served.
    Consistent(HistoryRecord),
    /// `prev` differs; the pair must be discarded.
    Stale {
        stored: Option<VersionId>,
        expected: Option<VersionId>,
    },
}

/// Compare `record.prev` with `expected_prev`. `None` only matches `None`.
pub fn check(record: HistoryRecord, expected_prev: Option<&VersionId>) -> Consistency {
    if record.prev() == expected_prev {
        Consistency::Consistent(record)
    } else {
        Consistency::Stale {
            stored: record.prev().cloned(),
            expected: expected_prev.cloned(),
        }
    }
}

/// Remove both artifacts of a stale pair, history first.
///
/// Failures are logged and skipped; the return value counts what was removed.
pub fn heal<N: Namespace>(ns: &N, file_id: FileId, version_id: &VersionId) -> u64 {
    let keys = [
        ArtifactKey::history(file_id, version_id.clone()),
        ArtifactKey::changes(file_id, version_id.clone()),
    ];

    let mut removed = 0;
    for key in &keys {
        match ns.delete(key) {
            Ok(true) => {
                removed += 1;
                tracing::debug!(owner = %ns.owner(), name = %key, "Removed stale artifact");
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    owner = %ns.owner(),
                    name = %key,
                    error = %e,
                    "Failed to remove stale artifact"
                );
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{BlobStore, InMemoryBlobStore};
    use revcache_core::{HistoryPayload, OwnerId};

    fn version(id: &str) -> VersionId {
        VersionId::new(id).expect("valid version")
    }

    fn record(prev: Option<&str>) -> HistoryRecord {
        HistoryRecord::new(HistoryPayload::new(), prev.map(version))
    }

    #[test]
    fn test_matching_prev_is_consistent() {
        let p = version("100");
        assert!(matches!(
            check(record(Some("100")), Some(&p)),
            Consistency::Consistent(_)
        ));
        let unchained = check(record(None), None);
        assert!(matches!(unchained, Consistency::Consistent(_)));
    }

    #[test]
    fn test_mismatched_prev_is_stale() {
        let other = version("200");
        match check(record(Some("100")), Some(&other)) {
            Consistency::Stale { stored, expected } => {
                assert_eq!(stored, Some(version("100")));
                assert_eq!(expected, Some(version("200")));
            }
            other => panic!("expected stale, got {other:?}"),
        }
    }

    #[test]
    fn test_null_and_value_never_match() {
        let p = version("100");
        let missing = check(record(None), Some(&p));
        assert!(matches!(missing, Consistency::Stale { .. }));
        let unexpected = check(record(Some("100")), None);
        assert!(matches!(unexpected, Consistency::Stale { .. }));
    }

    #[test]
    fn test_heal_removes_pair_only() {
        let store = InMemoryBlobStore::new();
        let ns = store
            .create_namespace(&OwnerId::new("alice").expect("valid owner"))
            .expect("create");
        let file = FileId::new(4);
        for v in ["1", "2"] {
            for key in ArtifactKey::pair(file, &version(v)) {
                ns.write(&key, b"x").expect("write");
            }
        }

        assert_eq!(heal(&ns, file, &version("1")), 2);
        assert_eq!(heal(&ns, file, &version("1")), 0);
        assert_eq!(ns.list_file(file).expect("list").len(), 2);
    }
}
