//! LMDB-backed blob store with owner isolation.
//!
//! Uses the heed crate (Rust bindings for LMDB) as the durable backend for
//! cached version artifacts.
//!
//! # Owner Isolation
//!
//! All operations go through [`NamespaceKey`], ensuring that:
//! - Each owner's artifacts live under a distinct length-prefixed key prefix
//! - Deleting an owner namespace only touches that owner's keys
//! - Per-file bulk operations use a fixed-width file id segment, not names
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. Every trait call runs in its own read or
//! write transaction; no transaction spans two calls.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use revcache_core::{
    ArtifactKey, FileId, LmdbConfig, OwnerId, RevcacheError, RevcacheResult, StorageError,
};

use super::namespace_key::NamespaceKey;
use super::traits::{BlobStore, Namespace};

/// Error type for LMDB blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbBlobError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert LmdbBlobError to RevcacheError.
impl From<LmdbBlobError> for RevcacheError {
    fn from(e: LmdbBlobError) -> Self {
        RevcacheError::Storage(StorageError::TransactionFailed {
            reason: e.to_string(),
        })
    }
}

fn txn_err(e: heed::Error) -> LmdbBlobError {
    LmdbBlobError::Transaction(e.to_string())
}

/// LMDB-backed namespaced blob store.
///
/// # Example
///
/// ```ignore
/// use revcache_storage::blob::{BlobStore, LmdbBlobStore, Namespace};
///
/// let store = LmdbBlobStore::new("/var/lib/revcache", 256)?;
/// let ns = store.create_namespace(&owner)?;
/// ns.write(&ArtifactKey::changes(file_id, version), &bytes)?;
/// ```
#[derive(Clone)]
pub struct LmdbBlobStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
}

impl LmdbBlobStore {
    /// Create a new LMDB blob store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbBlobError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbBlobError::EnvOpen(e.to_string()))?;

        let mut wtxn = env.write_txn().map_err(txn_err)?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbBlobError::DbOpen(e.to_string()))?;

        wtxn.commit().map_err(txn_err)?;

        Ok(Self { env, db })
    }

    /// Open the store described by `config`.
    pub fn open(config: &LmdbConfig) -> Result<Self, LmdbBlobError> {
        Self::new(&config.path, config.max_size_mb)
    }

    fn handle(&self, owner: &OwnerId) -> LmdbNamespace {
        LmdbNamespace {
            owner: owner.clone(),
            env: self.env.clone(),
            db: self.db,
        }
    }
}

fn collect_keys(
    env: &Env,
    db: Database<Bytes, Bytes>,
    prefix: &[u8],
) -> Result<Vec<Vec<u8>>, LmdbBlobError> {
    let rtxn = env.read_txn().map_err(txn_err)?;
    let iter = db.prefix_iter(&rtxn, prefix).map_err(txn_err)?;

    let mut keys = Vec::new();
    for result in iter {
        let (key, _) = result.map_err(txn_err)?;
        keys.push(key.to_vec());
    }
    Ok(keys)
}

impl BlobStore for LmdbBlobStore {
    type Namespace = LmdbNamespace;

    fn namespace(&self, owner: &OwnerId) -> RevcacheResult<Option<LmdbNamespace>> {
        let marker = NamespaceKey::owner_prefix(owner);
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        let exists = self.db.get(&rtxn, &marker).map_err(txn_err)?.is_some();
        Ok(exists.then(|| self.handle(owner)))
    }

    fn create_namespace(&self, owner: &OwnerId) -> RevcacheResult<LmdbNamespace> {
        let marker = NamespaceKey::owner_prefix(owner);
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        self.db.put(&mut wtxn, &marker, &[]).map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;
        Ok(self.handle(owner))
    }

    fn delete_namespace(&self, owner: &OwnerId) -> RevcacheResult<u64> {
        let marker = NamespaceKey::owner_prefix(owner);

        // Scan and delete in one write transaction.
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        let mut deleted = 0u64;
        {
            let mut iter = self.db.prefix_iter_mut(&mut wtxn, &marker).map_err(txn_err)?;
            while let Some(entry) = iter.next() {
                let (key, _) = entry.map_err(txn_err)?;
                let is_marker = key == marker.as_slice();
                // SAFETY: no reference into the database is held past this
                // call; `key` is not used after the deletion.
                let removed = unsafe { iter.del_current() }.map_err(txn_err)?;
                if removed && !is_marker {
                    deleted += 1;
                }
            }
        }
        wtxn.commit().map_err(txn_err)?;

        Ok(deleted)
    }
}

/// Handle to one owner's namespace inside the LMDB environment.
#[derive(Clone)]
pub struct LmdbNamespace {
    owner: OwnerId,
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl LmdbNamespace {
    fn encode(&self, key: &ArtifactKey) -> Vec<u8> {
        NamespaceKey::new(self.owner.clone(), key.clone()).encode()
    }

    fn decode_all(&self, keys: Vec<Vec<u8>>) -> Vec<ArtifactKey> {
        keys.iter()
            .filter_map(|bytes| NamespaceKey::decode(bytes))
            .filter(|key| key.owner() == &self.owner)
            .map(NamespaceKey::into_artifact)
            .collect()
    }
}

impl Namespace for LmdbNamespace {
    fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn exists(&self, key: &ArtifactKey) -> RevcacheResult<bool> {
        Ok(self.read(key)?.is_some())
    }

    fn read(&self, key: &ArtifactKey) -> RevcacheResult<Option<Vec<u8>>> {
        let encoded = self.encode(key);
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        let value = self.db.get(&rtxn, &encoded).map_err(txn_err)?;
        Ok(value.map(<[u8]>::to_vec))
    }

    fn write(&self, key: &ArtifactKey, bytes: &[u8]) -> RevcacheResult<()> {
        let encoded = self.encode(key);
        let marker = NamespaceKey::owner_prefix(&self.owner);

        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        // A handle can outlive a namespace deletion; writing revives the marker.
        self.db.put(&mut wtxn, &marker, &[]).map_err(txn_err)?;
        self.db.put(&mut wtxn, &encoded, bytes).map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;
        Ok(())
    }

    fn delete(&self, key: &ArtifactKey) -> RevcacheResult<bool> {
        let encoded = self.encode(key);
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        let deleted = self.db.delete(&mut wtxn, &encoded).map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;
        Ok(deleted)
    }

    fn list(&self) -> RevcacheResult<Vec<ArtifactKey>> {
        let prefix = NamespaceKey::owner_prefix(&self.owner);
        let keys = collect_keys(&self.env, self.db, &prefix)?;
        Ok(self.decode_all(keys))
    }

    fn list_file(&self, file_id: FileId) -> RevcacheResult<Vec<ArtifactKey>> {
        let prefix = NamespaceKey::owner_file_prefix(&self.owner, file_id);
        let keys = collect_keys(&self.env, self.db, &prefix)?;
        Ok(self.decode_all(keys))
    }
}
