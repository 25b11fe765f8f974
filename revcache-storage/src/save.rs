//! Save operation: fetch a change package and store it with its history.

use revcache_core::{FileReference, HistoryPayload, RemoteFetch, VersionId};

use crate::blob::BlobStore;
use crate::store::VersionArtifactStore;

/// Observational result of [`VersionArtifactStore::save_history`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Both artifacts were written.
    Stored,
    /// Nothing to do: no owner, empty history or empty URL.
    Skipped,
    /// The fetch or a write failed; details were logged.
    Failed,
}

impl SaveOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }
}

impl<B: BlobStore> VersionArtifactStore<B> {
    /// Fetch the change package at `changes_url` and store it together with
    /// `history` under the file's live modification marker.
    pub fn save_history(
        &self,
        fetch: &dyn RemoteFetch,
        file: &dyn FileReference,
        history: HistoryPayload,
        changes_url: &str,
        prev: Option<VersionId>,
    ) -> SaveOutcome {
        let Some(owner) = file.owner() else {
            tracing::debug!(
                app = %self.app_name(),
                file_id = %file.id(),
                "File has no owner, skipping save"
            );
            return SaveOutcome::Skipped;
        };
        if history.is_empty() || changes_url.is_empty() {
            return SaveOutcome::Skipped;
        }

        let file_id = file.id();
        let version_id = file.modification_marker();

        let changes = match fetch.fetch(changes_url) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    app = %self.app_name(),
                    %owner,
                    %file_id,
                    version = %version_id,
                    error = %e,
                    "Failed to fetch change package"
                );
                return SaveOutcome::Failed;
            }
        };

        if self.put(&owner, file_id, &version_id, history, &changes, prev) {
            SaveOutcome::Stored
        } else {
            SaveOutcome::Failed
        }
    }
}
