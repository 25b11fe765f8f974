//! Namespaced blob store traits.
//!
//! This module defines the contract every physical backend implements. A
//! backend hands out one [`Namespace`] per owner; a namespace stores opaque
//! bytes under [`ArtifactKey`]s and keeps them indexed by file id, so bulk
//! removal of a file never depends on string prefix matching.

use revcache_core::{ArtifactKey, FileId, OwnerId, RevcacheResult};

/// Isolated artifact storage for a single owner.
///
/// Absence is never an error: reads of missing keys return `Ok(None)` and
/// deletes of missing keys return `Ok(false)`.
pub trait Namespace: Send + Sync {
    /// The owner this namespace belongs to.
    fn owner(&self) -> &OwnerId;

    /// Whether an artifact is stored under `key`.
    fn exists(&self, key: &ArtifactKey) -> RevcacheResult<bool>;

    /// Read an artifact's bytes.
    fn read(&self, key: &ArtifactKey) -> RevcacheResult<Option<Vec<u8>>>;

    /// Write an artifact, replacing any previous content.
    fn write(&self, key: &ArtifactKey, bytes: &[u8]) -> RevcacheResult<()>;

    /// Delete an artifact. Returns whether something was removed.
    fn delete(&self, key: &ArtifactKey) -> RevcacheResult<bool>;

    /// Every artifact key in the namespace.
    fn list(&self) -> RevcacheResult<Vec<ArtifactKey>>;

    /// Every artifact key belonging to `file_id`, both kinds, all versions.
    fn list_file(&self, file_id: FileId) -> RevcacheResult<Vec<ArtifactKey>>;
}

/// Backend that owns all owner namespaces.
///
/// Implementations must be thread-safe; callers never hold a lock across
/// two operations, so concurrent writers are last-writer-wins per key.
pub trait BlobStore: Send + Sync {
    /// Handle type for one owner's namespace.
    type Namespace: Namespace;

    /// Open an existing namespace. `Ok(None)` if the owner has none yet.
    fn namespace(&self, owner: &OwnerId) -> RevcacheResult<Option<Self::Namespace>>;

    /// Open the owner's namespace, creating it if needed.
    fn create_namespace(&self, owner: &OwnerId) -> RevcacheResult<Self::Namespace>;

    /// Remove the namespace and everything in it.
    ///
    /// Returns the number of artifacts removed; a missing namespace removes 0.
    fn delete_namespace(&self, owner: &OwnerId) -> RevcacheResult<u64>;
}
