//! Version artifact store.
//!
//! Owner-namespaced put/get/delete of (history record, changes blob) pairs.
//! The store is a cache, not a system of record: reads never fail (they
//! degrade to `None`), writes log and give up on the first backend error,
//! and nothing guards the two writes of a pair against concurrent writers.

use revcache_core::{
    ArtifactKey, FileId, HistoryPayload, HistoryRecord, OwnerId, RevcacheConfig, RevcacheResult,
    VersionId, DEFAULT_APP_NAME,
};

use crate::blob::{BlobStore, Namespace};
use crate::consistency::{self, Consistency};
use crate::stats::{StatCounters, StoreStats};

/// Cache of per-version history records and change packages.
#[derive(Debug)]
pub struct VersionArtifactStore<B: BlobStore> {
    backend: B,
    app_name: String,
    stats: StatCounters,
}

impl<B: BlobStore> VersionArtifactStore<B> {
    /// Create a store over `backend` with the default application name.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            app_name: DEFAULT_APP_NAME.to_string(),
            stats: StatCounters::default(),
        }
    }

    /// Create a store over `backend` configured by `config`.
    pub fn with_config(backend: B, config: &RevcacheConfig) -> Self {
        Self {
            backend,
            app_name: config.app_name.clone(),
            stats: StatCounters::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Usage counters since construction.
    pub fn stats(&self) -> StoreStats {
        self.stats.snapshot()
    }

    /// Open an existing owner namespace. Backend failures are logged.
    pub(crate) fn open(&self, owner: &OwnerId) -> Option<B::Namespace> {
        match self.backend.namespace(owner) {
            Ok(ns) => ns,
            Err(e) => {
                tracing::warn!(
                    app = %self.app_name,
                    %owner,
                    error = %e,
                    "Failed to open owner namespace"
                );
                None
            }
        }
    }

    /// Whether the owner has a namespace at all.
    pub fn has_namespace(&self, owner: &OwnerId) -> bool {
        self.open(owner).is_some()
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Store the pair for (`file_id`, `version_id`).
    ///
    /// Writes the changes blob first, then the history record with `prev`
    /// merged in. A failure after the first write leaves an orphaned blob;
    /// readers only trust a version whose history record decodes.
    ///
    /// Returns whether both artifacts were written. Failures are logged,
    /// never raised.
    pub fn put(
        &self,
        owner: &OwnerId,
        file_id: FileId,
        version_id: &VersionId,
        history: HistoryPayload,
        changes: &[u8],
        prev: Option<VersionId>,
    ) -> bool {
        match self.try_put(owner, file_id, version_id, history, changes, prev) {
            Ok(()) => {
                self.stats.write();
                true
            }
            Err(e) => {
                self.stats.write_failure();
                tracing::error!(
                    app = %self.app_name,
                    %owner,
                    %file_id,
                    version = %version_id,
                    error = %e,
                    "Failed to store version artifacts"
                );
                false
            }
        }
    }

    fn try_put(
        &self,
        owner: &OwnerId,
        file_id: FileId,
        version_id: &VersionId,
        history: HistoryPayload,
        changes: &[u8],
        prev: Option<VersionId>,
    ) -> RevcacheResult<()> {
        let ns = self.backend.create_namespace(owner)?;

        let changes_key = ArtifactKey::changes(file_id, version_id.clone());
        ns.write(&changes_key, changes)?;

        let history_key = ArtifactKey::history(file_id, version_id.clone());
        let record = HistoryRecord::new(history, prev);
        ns.write(&history_key, &record.to_bytes(&history_key.name())?)?;

        tracing::debug!(
            app = %self.app_name,
            %owner,
            %file_id,
            changes = %changes_key,
            history = %history_key,
            "Stored version artifacts"
        );
        Ok(())
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// History record for (`file_id`, `version_id`), if present and consistent.
    ///
    /// A record whose `prev` differs from `expected_prev`, or that no longer
    /// decodes, is deleted together with its changes blob, and `None` is
    /// returned. Backend read failures leave the pair in place.
    pub fn get(
        &self,
        owner: &OwnerId,
        file_id: FileId,
        version_id: &VersionId,
        expected_prev: Option<&VersionId>,
    ) -> Option<HistoryRecord> {
        let Some(ns) = self.open(owner) else {
            self.stats.miss();
            return None;
        };

        let key = ArtifactKey::history(file_id, version_id.clone());
        let bytes = match ns.read(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.stats.miss();
                return None;
            }
            Err(e) => {
                self.stats.miss();
                tracing::warn!(
                    app = %self.app_name,
                    %owner,
                    name = %key,
                    error = %e,
                    "Failed to read history record"
                );
                return None;
            }
        };

        let record = match HistoryRecord::from_bytes(&key.name(), &bytes) {
            Ok(record) => record,
            Err(e) => {
                // A record that no longer decodes can never match any `prev`.
                tracing::warn!(
                    app = %self.app_name,
                    %owner,
                    name = %key,
                    error = %e,
                    "Corrupt history record, discarding pair"
                );
                consistency::heal(&ns, file_id, version_id);
                self.stats.stale();
                self.stats.miss();
                return None;
            }
        };

        match consistency::check(record, expected_prev) {
            Consistency::Consistent(record) => {
                self.stats.hit();
                Some(record)
            }
            Consistency::Stale { stored, expected } => {
                tracing::debug!(
                    app = %self.app_name,
                    %owner,
                    %file_id,
                    version = %version_id,
                    stored = ?stored,
                    expected = ?expected,
                    "Previous version changed, discarding cached history"
                );
                consistency::heal(&ns, file_id, version_id);
                self.stats.stale();
                self.stats.miss();
                None
            }
        }
    }

    /// Whether a changes blob is stored for (`file_id`, `version_id`).
    pub fn has_changes(&self, owner: &OwnerId, file_id: FileId, version_id: &VersionId) -> bool {
        let Some(ns) = self.open(owner) else {
            return false;
        };
        let key = ArtifactKey::changes(file_id, version_id.clone());
        ns.exists(&key).unwrap_or_else(|e| {
            tracing::warn!(
                app = %self.app_name,
                %owner,
                name = %key,
                error = %e,
                "Failed to check changes"
            );
            false
        })
    }

    /// Changes blob for (`file_id`, `version_id`).
    pub fn get_changes_blob(
        &self,
        owner: &OwnerId,
        file_id: FileId,
        version_id: &VersionId,
    ) -> Option<Vec<u8>> {
        let ns = self.open(owner)?;
        let key = ArtifactKey::changes(file_id, version_id.clone());
        ns.read(&key).unwrap_or_else(|e| {
            tracing::warn!(
                app = %self.app_name,
                %owner,
                name = %key,
                error = %e,
                "Failed to read changes"
            );
            None
        })
    }

    // ========================================================================
    // DELETES
    // ========================================================================

    /// Remove the pair for exactly (`file_id`, `version_id`).
    ///
    /// Returns the number of artifacts removed.
    pub fn delete_version(&self, owner: &OwnerId, file_id: FileId, version_id: &VersionId) -> u64 {
        tracing::debug!(
            app = %self.app_name,
            %owner,
            %file_id,
            version = %version_id,
            "Deleting version"
        );

        let Some(ns) = self.open(owner) else {
            return 0;
        };

        let mut removed = 0;
        for key in ArtifactKey::pair(file_id, version_id) {
            match ns.delete(&key) {
                Ok(true) => {
                    removed += 1;
                    tracing::debug!(app = %self.app_name, %owner, name = %key, "Removed artifact");
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        app = %self.app_name,
                        %owner,
                        name = %key,
                        error = %e,
                        "Failed to remove artifact"
                    );
                }
            }
        }
        removed
    }

    /// Remove every version of `file_id`, or the whole owner namespace when
    /// no file is given.
    ///
    /// Returns the number of artifacts removed.
    pub fn delete_all_versions(&self, owner: &OwnerId, file_id: Option<FileId>) -> u64 {
        tracing::debug!(
            app = %self.app_name,
            %owner,
            file_id = ?file_id.map(FileId::get),
            "Deleting all versions"
        );

        let Some(file_id) = file_id else {
            return match self.backend.delete_namespace(owner) {
                Ok(removed) => removed,
                Err(e) => {
                    tracing::warn!(
                        app = %self.app_name,
                        %owner,
                        error = %e,
                        "Failed to remove owner namespace"
                    );
                    0
                }
            };
        };

        let Some(ns) = self.open(owner) else {
            return 0;
        };

        let keys = match ns.list_file(file_id) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(
                    app = %self.app_name,
                    %owner,
                    %file_id,
                    error = %e,
                    "Failed to list file artifacts"
                );
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            match ns.delete(&key) {
                Ok(true) => {
                    removed += 1;
                    tracing::debug!(app = %self.app_name, %owner, name = %key, "Removed artifact");
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        app = %self.app_name,
                        %owner,
                        name = %key,
                        error = %e,
                        "Failed to remove artifact"
                    );
                }
            }
        }
        removed
    }
}
