//! In-memory blob store.
//!
//! Each owner namespace is a structured index `file id -> (kind, version) ->
//! bytes`. Bulk operations on a file walk one map entry instead of scanning
//! names. Used by tests and by hosts that do not need the cache to survive a
//! restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use revcache_core::{
    ArtifactKey, ArtifactKind, FileId, OwnerId, RevcacheResult, StorageError, VersionId,
};

use super::traits::{BlobStore, Namespace};

type VersionSlots = BTreeMap<(ArtifactKind, VersionId), Vec<u8>>;
type FileIndex = BTreeMap<FileId, VersionSlots>;

/// In-memory namespaced blob store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBlobStore {
    namespaces: Arc<RwLock<HashMap<OwnerId, Arc<RwLock<FileIndex>>>>>,
}

impl InMemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of owner namespaces currently present.
    pub fn namespace_count(&self) -> usize {
        self.namespaces.read().map(|n| n.len()).unwrap_or(0)
    }

    /// Number of artifacts stored for `owner`, across all files.
    pub fn artifact_count(&self, owner: &OwnerId) -> usize {
        let Ok(namespaces) = self.namespaces.read() else {
            return 0;
        };
        namespaces
            .get(owner)
            .and_then(|index| index.read().ok())
            .map(|index| index.values().map(BTreeMap::len).sum::<usize>())
            .unwrap_or(0)
    }
}

impl BlobStore for InMemoryBlobStore {
    type Namespace = InMemoryNamespace;

    fn namespace(&self, owner: &OwnerId) -> RevcacheResult<Option<InMemoryNamespace>> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(namespaces.get(owner).map(|index| InMemoryNamespace {
            owner: owner.clone(),
            index: Arc::clone(index),
        }))
    }

    fn create_namespace(&self, owner: &OwnerId) -> RevcacheResult<InMemoryNamespace> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let index = namespaces.entry(owner.clone()).or_default();
        Ok(InMemoryNamespace {
            owner: owner.clone(),
            index: Arc::clone(index),
        })
    }

    fn delete_namespace(&self, owner: &OwnerId) -> RevcacheResult<u64> {
        let removed = self
            .namespaces
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .remove(owner);

        let Some(index) = removed else {
            return Ok(0);
        };
        let count = index
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .values()
            .map(BTreeMap::len)
            .sum::<usize>();
        Ok(count as u64)
    }
}

/// Handle to one owner's in-memory namespace.
#[derive(Debug, Clone)]
pub struct InMemoryNamespace {
    owner: OwnerId,
    index: Arc<RwLock<FileIndex>>,
}

fn slot(key: &ArtifactKey) -> (ArtifactKind, VersionId) {
    (key.kind(), key.version_id().clone())
}

impl Namespace for InMemoryNamespace {
    fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn exists(&self, key: &ArtifactKey) -> RevcacheResult<bool> {
        let index = self.index.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(index
            .get(&key.file_id())
            .is_some_and(|slots| slots.contains_key(&slot(key))))
    }

    fn read(&self, key: &ArtifactKey) -> RevcacheResult<Option<Vec<u8>>> {
        let index = self.index.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(index
            .get(&key.file_id())
            .and_then(|slots| slots.get(&slot(key)))
            .cloned())
    }

    fn write(&self, key: &ArtifactKey, bytes: &[u8]) -> RevcacheResult<()> {
        let mut index = self.index.write().map_err(|_| StorageError::LockPoisoned)?;
        index
            .entry(key.file_id())
            .or_default()
            .insert(slot(key), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, key: &ArtifactKey) -> RevcacheResult<bool> {
        let mut index = self.index.write().map_err(|_| StorageError::LockPoisoned)?;
        let Some(slots) = index.get_mut(&key.file_id()) else {
            return Ok(false);
        };
        let removed = slots.remove(&slot(key)).is_some();
        if slots.is_empty() {
            index.remove(&key.file_id());
        }
        Ok(removed)
    }

    fn list(&self) -> RevcacheResult<Vec<ArtifactKey>> {
        let index = self.index.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(index
            .iter()
            .flat_map(|(file_id, slots)| {
                slots
                    .keys()
                    .map(|(kind, version)| ArtifactKey::new(*kind, *file_id, version.clone()))
            })
            .collect())
    }

    fn list_file(&self, file_id: FileId) -> RevcacheResult<Vec<ArtifactKey>> {
        let index = self.index.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(index
            .get(&file_id)
            .map(|slots| {
                slots
                    .keys()
                    .map(|(kind, version)| ArtifactKey::new(*kind, file_id, version.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(uid: &str) -> OwnerId {
        OwnerId::new(uid).expect("valid owner")
    }

    fn version(id: &str) -> VersionId {
        VersionId::new(id).expect("valid version")
    }

    #[test]
    fn test_namespace_absent_until_created() {
        let store = InMemoryBlobStore::new();
        let alice = owner("alice");

        assert!(store.namespace(&alice).expect("namespace").is_none());
        store.create_namespace(&alice).expect("create");
        assert!(store.namespace(&alice).expect("namespace").is_some());
        assert_eq!(store.namespace_count(), 1);
    }

    #[test]
    fn test_write_read_delete() {
        let store = InMemoryBlobStore::new();
        let ns = store.create_namespace(&owner("alice")).expect("create");
        let key = ArtifactKey::changes(FileId::new(5), version("100"));

        assert!(!ns.exists(&key).expect("exists"));
        ns.write(&key, b"zip-bytes").expect("write");
        assert!(ns.exists(&key).expect("exists"));
        assert_eq!(ns.read(&key).expect("read"), Some(b"zip-bytes".to_vec()));

        assert!(ns.delete(&key).expect("delete"));
        assert!(!ns.delete(&key).expect("delete"));
        assert_eq!(ns.read(&key).expect("read"), None);
    }

    #[test]
    fn test_list_file_is_structural() {
        let store = InMemoryBlobStore::new();
        let ns = store.create_namespace(&owner("alice")).expect("create");

        for file in [1u64, 12, 123].map(FileId::new) {
            ns.write(&ArtifactKey::history(file, version("7")), b"{}")
                .expect("write");
            ns.write(&ArtifactKey::changes(file, version("7")), b"z")
                .expect("write");
        }

        let keys = ns.list_file(FileId::new(1)).expect("list");
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.file_id() == FileId::new(1)));
        assert_eq!(ns.list().expect("list").len(), 6);
    }

    #[test]
    fn test_delete_namespace_counts_artifacts() {
        let store = InMemoryBlobStore::new();
        let alice = owner("alice");
        let ns = store.create_namespace(&alice).expect("create");
        ns.write(&ArtifactKey::history(FileId::new(1), version("1")), b"{}")
            .expect("write");
        ns.write(&ArtifactKey::changes(FileId::new(1), version("1")), b"z")
            .expect("write");

        assert_eq!(store.artifact_count(&alice), 2);
        assert_eq!(store.delete_namespace(&alice).expect("delete"), 2);
        assert_eq!(store.delete_namespace(&alice).expect("delete"), 0);
        assert!(store.namespace(&alice).expect("namespace").is_none());
    }

    #[test]
    fn test_owners_are_isolated() {
        let store = InMemoryBlobStore::new();
        let key = ArtifactKey::history(FileId::new(1), version("1"));

        let alice = store.create_namespace(&owner("alice")).expect("create");
        let bob = store.create_namespace(&owner("bob")).expect("create");
        alice.write(&key, b"alice").expect("write");

        assert_eq!(bob.read(&key).expect("read"), None);
        assert!(!bob.delete(&key).expect("delete"));
        assert_eq!(alice.read(&key).expect("read"), Some(b"alice".to_vec()));
    }
}
