//! Collaborator ports.
//!
//! The host application owns files, versions, path resolution and the remote
//! conversion service. These traits are the only contact surface; every
//! implementation lives outside this workspace (test doubles live in
//! `revcache-test-utils`).

use crate::{FileId, OwnerId, RevcacheResult, VersionId};

/// A file as seen by the host file store.
pub trait FileReference {
    /// Stable numeric id, unchanged by renames.
    fn id(&self) -> FileId;

    /// Live modification marker, used as the version id of the current state.
    fn modification_marker(&self) -> VersionId;

    /// Owning user, `None` for files without a resolvable owner.
    fn owner(&self) -> Option<OwnerId>;
}

/// One historical version known to the host versioning subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub revision_id: VersionId,
}

impl VersionInfo {
    pub fn new(revision_id: VersionId) -> Self {
        Self { revision_id }
    }
}

/// Host versioning subsystem.
pub trait VersionProvider {
    /// Historical versions of `file`, in the provider's native order
    /// (oldest first for the stock host; callers reverse it themselves).
    fn list_versions(
        &self,
        owner: &OwnerId,
        file: &dyn FileReference,
    ) -> RevcacheResult<Vec<VersionInfo>>;
}

/// Synchronous retrieval of a change package from the conversion service.
pub trait RemoteFetch {
    fn fetch(&self, url: &str) -> RevcacheResult<Vec<u8>>;
}

/// Host path resolution used by lifecycle handlers.
pub trait PathResolver {
    fn owner_of(&self, path: &str) -> RevcacheResult<OwnerId>;

    fn file_id_of(&self, path: &str) -> RevcacheResult<FileId>;
}
