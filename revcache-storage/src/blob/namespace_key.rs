//! Owner-scoped physical key layout for the LMDB backend.
//!
//! A `NamespaceKey` cannot be built without an owner, so every LMDB read or
//! write is scoped to exactly one owner namespace by construction.
//!
//! # Binary Format
//!
//! - Bytes 0-3: owner id length (u32, big-endian)
//! - Next `len` bytes: owner id (UTF-8)
//! - Next 8 bytes: file id (u64, big-endian)
//! - Remaining bytes: artifact name (`history_<F>_<V>.json` / `changes_<F>_<V>.zip`)
//!
//! The length prefix keeps owner `ab` from being a prefix of owner `abc`, and
//! the fixed-width file id gives a structural per-file prefix: file `1` and
//! file `12` differ in their eight id bytes, never in a string suffix.
//!
//! The bare owner prefix (with no file id or name) is the namespace marker.

use revcache_core::{ArtifactKey, FileId, OwnerId};

const LEN_BYTES: usize = 4;
const FILE_ID_BYTES: usize = 8;

/// An artifact key bound to an owner namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceKey {
    owner: OwnerId,
    key: ArtifactKey,
}

impl NamespaceKey {
    pub fn new(owner: OwnerId, key: ArtifactKey) -> Self {
        Self { owner, key }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn artifact(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn into_artifact(self) -> ArtifactKey {
        self.key
    }

    /// Encode to the physical LMDB key.
    pub fn encode(&self) -> Vec<u8> {
        let name = self.key.name();
        let mut bytes = Self::owner_file_prefix(&self.owner, self.key.file_id());
        bytes.extend_from_slice(name.as_bytes());
        bytes
    }

    /// Decode a physical key.
    ///
    /// Returns `None` if:
    /// - The length prefix is truncated or overruns the buffer
    /// - The owner or name bytes are not valid UTF-8
    /// - The name is not an artifact name, or names a different file than
    ///   the binary file id segment
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let len_bytes: [u8; LEN_BYTES] = bytes.get(..LEN_BYTES)?.try_into().ok()?;
        let owner_len = u32::from_be_bytes(len_bytes) as usize;

        let owner_end = LEN_BYTES.checked_add(owner_len)?;
        let owner = std::str::from_utf8(bytes.get(LEN_BYTES..owner_end)?).ok()?;
        let owner = OwnerId::new(owner).ok()?;

        let file_end = owner_end + FILE_ID_BYTES;
        let file_bytes: [u8; FILE_ID_BYTES] = bytes.get(owner_end..file_end)?.try_into().ok()?;
        let file_id = FileId::new(u64::from_be_bytes(file_bytes));

        let name = std::str::from_utf8(bytes.get(file_end..)?).ok()?;
        let key = ArtifactKey::parse(name)?;
        if key.file_id() != file_id {
            return None;
        }

        Some(Self { owner, key })
    }

    /// Prefix covering the whole owner namespace. Also the namespace marker.
    pub fn owner_prefix(owner: &OwnerId) -> Vec<u8> {
        let uid = owner.as_str().as_bytes();
        let mut prefix = Vec::with_capacity(LEN_BYTES + uid.len() + FILE_ID_BYTES);
        prefix.extend_from_slice(&(uid.len() as u32).to_be_bytes());
        prefix.extend_from_slice(uid);
        prefix
    }

    /// Prefix covering every artifact of one file inside the owner namespace.
    pub fn owner_file_prefix(owner: &OwnerId, file_id: FileId) -> Vec<u8> {
        let mut prefix = Self::owner_prefix(owner);
        prefix.extend_from_slice(&file_id.to_be_bytes());
        prefix
    }
}
