//! Changes resolver.
//!
//! The version history UI numbers versions from 1 (newest historical) up to
//! N (oldest), and N+1 and beyond denote the file's current live state.

use revcache_core::{FileReference, VersionId, VersionProvider};

use crate::blob::BlobStore;
use crate::store::VersionArtifactStore;

/// A concrete version picked for a UI ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVersion {
    /// A superseded version known to the versioning subsystem.
    Historical(VersionId),
    /// The file's current state, addressed by its live modification marker.
    Live(VersionId),
}

impl ResolvedVersion {
    pub fn version_id(&self) -> &VersionId {
        match self {
            Self::Historical(id) | Self::Live(id) => id,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Resolve a 1-based `ordinal` against `newest_first` versions.
///
/// Ordinal 0 resolves to nothing.
pub fn resolve_ordinal(
    ordinal: usize,
    newest_first: &[VersionId],
    live: &VersionId,
) -> Option<ResolvedVersion> {
    if ordinal == 0 {
        return None;
    }
    match newest_first.get(ordinal - 1) {
        Some(id) => Some(ResolvedVersion::Historical(id.clone())),
        None => Some(ResolvedVersion::Live(live.clone())),
    }
}

/// Looks up the change package behind a UI ordinal.
pub struct ChangesResolver<'a, B: BlobStore> {
    store: &'a VersionArtifactStore<B>,
}

impl<'a, B: BlobStore> ChangesResolver<'a, B> {
    pub fn new(store: &'a VersionArtifactStore<B>) -> Self {
        Self { store }
    }

    /// Version for `ordinal`, using the provider's listing reversed to
    /// newest-first.
    pub fn resolve(
        &self,
        provider: &dyn VersionProvider,
        file: &dyn FileReference,
        ordinal: usize,
    ) -> Option<ResolvedVersion> {
        let owner = file.owner()?;
        let versions = match provider.list_versions(&owner, file) {
            Ok(versions) => versions,
            Err(e) => {
                tracing::warn!(%owner, file_id = %file.id(), error = %e, "Failed to list versions");
                return None;
            }
        };

        let newest_first: Vec<VersionId> = versions
            .into_iter()
            .rev()
            .map(|info| info.revision_id)
            .collect();
        resolve_ordinal(ordinal, &newest_first, &file.modification_marker())
    }

    /// Change package for `ordinal`, or `None` when the owner, the version or
    /// the blob is missing.
    pub fn changes(
        &self,
        provider: &dyn VersionProvider,
        file: &dyn FileReference,
        ordinal: usize,
    ) -> Option<Vec<u8>> {
        let owner = file.owner()?;
        if !self.store.has_namespace(&owner) {
            return None;
        }

        let resolved = self.resolve(provider, file, ordinal)?;
        let file_id = file.id();
        let version_id = resolved.version_id();
        if !self.store.has_changes(&owner, file_id, version_id) {
            tracing::debug!(
                %owner,
                %file_id,
                version = %version_id,
                live = resolved.is_live(),
                "No changes stored"
            );
            return None;
        }
        self.store.get_changes_blob(&owner, file_id, version_id)
    }
}
