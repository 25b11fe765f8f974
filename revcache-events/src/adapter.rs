//! Lifecycle adapter.
//!
//! Translates host notifications into store deletions. The host operation
//! that raised the notification has already completed, so nothing here is
//! allowed to fail it: every problem is logged and reported as a
//! [`HookOutcome`] the host may ignore.

use std::sync::Arc;

use revcache_core::{FileId, OwnerId, PathResolver, RevcacheResult};
use revcache_storage::{BlobStore, VersionArtifactStore};

use crate::signal::{HookParams, LifecycleEvent, LifecycleSignal};

/// Observational result of handling one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// Store calls ran; `removed` artifacts were deleted.
    Applied { removed: u64 },
    /// Nothing to do (empty path or unusable parameters).
    Ignored,
    /// Owner or file resolution failed.
    Failed,
}

impl HookOutcome {
    pub fn removed(&self) -> u64 {
        match self {
            Self::Applied { removed } => *removed,
            Self::Ignored | Self::Failed => 0,
        }
    }
}

/// Routes lifecycle notifications to a [`VersionArtifactStore`].
pub struct LifecycleAdapter<B: BlobStore, R: PathResolver> {
    store: Arc<VersionArtifactStore<B>>,
    resolver: R,
}

impl<B: BlobStore, R: PathResolver> LifecycleAdapter<B, R> {
    pub fn new(store: Arc<VersionArtifactStore<B>>, resolver: R) -> Self {
        Self { store, resolver }
    }

    pub fn store(&self) -> &Arc<VersionArtifactStore<B>> {
        &self.store
    }

    /// Handle a notification identified by its host hook.
    ///
    /// Hooks the adapter does not subscribe to are ignored.
    pub fn dispatch_hook(
        &self,
        emitter: &str,
        hook_name: &str,
        params: &HookParams,
    ) -> HookOutcome {
        match LifecycleSignal::from_hook(emitter, hook_name) {
            Some(signal) => self.dispatch(signal, params),
            None => {
                tracing::debug!(emitter, hook = hook_name, "Unsubscribed hook ignored");
                HookOutcome::Ignored
            }
        }
    }

    /// Decode `params` for `signal` and apply the matching store call.
    pub fn dispatch(&self, signal: LifecycleSignal, params: &HookParams) -> HookOutcome {
        match LifecycleEvent::parse(signal, params) {
            Ok(Some(event)) => self.handle(event),
            Ok(None) => HookOutcome::Ignored,
            Err(e) => {
                tracing::warn!(
                    app = %self.store.app_name(),
                    hook = %signal,
                    params = %serde_json::Value::Object(params.clone()),
                    error = %e,
                    "Unusable hook parameters"
                );
                HookOutcome::Ignored
            }
        }
    }

    /// Apply a decoded event.
    pub fn handle(&self, event: LifecycleEvent) -> HookOutcome {
        let signal = event.signal();
        match self.apply(event) {
            Ok(removed) => {
                tracing::debug!(
                    app = %self.store.app_name(),
                    hook = %signal,
                    removed,
                    "Hook applied"
                );
                HookOutcome::Applied { removed }
            }
            Err(e) => {
                tracing::warn!(
                    app = %self.store.app_name(),
                    hook = %signal,
                    error = %e,
                    "Hook failed"
                );
                HookOutcome::Failed
            }
        }
    }

    pub fn on_user_removed(&self, params: &HookParams) -> HookOutcome {
        self.dispatch(LifecycleSignal::UserRemoved, params)
    }

    pub fn on_file_removed(&self, params: &HookParams) -> HookOutcome {
        self.dispatch(LifecycleSignal::FileRemoved, params)
    }

    pub fn on_version_removed(&self, params: &HookParams) -> HookOutcome {
        self.dispatch(LifecycleSignal::VersionRemoved, params)
    }

    pub fn on_version_rolled_back(&self, params: &HookParams) -> HookOutcome {
        self.dispatch(LifecycleSignal::VersionRolledBack, params)
    }

    fn apply(&self, event: LifecycleEvent) -> RevcacheResult<u64> {
        let removed = match event {
            LifecycleEvent::UserRemoved { owner } => self.store.delete_all_versions(&owner, None),
            LifecycleEvent::FileRemoved { path } => {
                let (owner, file_id) = self.locate(&path)?;
                self.store.delete_all_versions(&owner, Some(file_id))
            }
            LifecycleEvent::VersionRemoved { path, version_id }
            | LifecycleEvent::VersionRolledBack { path, version_id } => {
                let (owner, file_id) = self.locate(&path)?;
                self.store.delete_version(&owner, file_id, &version_id)
            }
        };
        Ok(removed)
    }

    fn locate(&self, path: &str) -> RevcacheResult<(OwnerId, FileId)> {
        let owner = self.resolver.owner_of(path)?;
        let file_id = self.resolver.file_id_of(path)?;
        Ok((owner, file_id))
    }
}
