//! Identity types for cached version artifacts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{RevcacheError, ValidationError};

/// Identifier of the user that owns a file, and therefore an owner namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner id. Empty ids are rejected.
    pub fn new(uid: impl Into<String>) -> Result<Self, RevcacheError> {
        let uid = uid.into();
        if uid.is_empty() {
            return Err(ValidationError::Empty {
                field: "owner_id".to_string(),
            }
            .into());
        }
        Ok(Self(uid))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable numeric identifier assigned by the host file store.
///
/// Survives renames, so it is the only file handle the cache ever persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u64);

impl FileId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Big-endian bytes, used where keys must sort and prefix by file.
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl From<u64> for FileId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = RevcacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // u64::from_str accepts a leading '+', which would break name injectivity
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidValue {
                field: "file_id".to_string(),
                value: s.to_string(),
                reason: "must be a decimal number".to_string(),
            }
            .into());
        }
        s.parse::<u64>().map(Self).map_err(|e| {
            ValidationError::InvalidValue {
                field: "file_id".to_string(),
                value: s.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Opaque version identifier assigned by the external versioning subsystem.
///
/// In practice a modification timestamp or a revision id. The cache never
/// generates or orders these; it only compares them for equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    /// Create a version id. Empty ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, RevcacheError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty {
                field: "version_id".to_string(),
            }
            .into());
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for VersionId {
    /// Modification timestamps are the most common version marker.
    fn from(mtime: u64) -> Self {
        Self(mtime.to_string())
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ids_rejected() {
        assert!(OwnerId::new("").is_err());
        assert!(VersionId::new("").is_err());
        assert!(OwnerId::new("alice").is_ok());
        assert!(VersionId::new("1700000000").is_ok());
    }

    #[test]
    fn test_file_id_parse() {
        assert_eq!("42".parse::<FileId>().ok(), Some(FileId::new(42)));
        assert!("".parse::<FileId>().is_err());
        assert!("+42".parse::<FileId>().is_err());
        assert!("4a".parse::<FileId>().is_err());
        assert!("99999999999999999999999".parse::<FileId>().is_err());
    }

    #[test]
    fn test_version_from_mtime() {
        let version = VersionId::from(1_700_000_000u64);
        assert_eq!(version.as_str(), "1700000000");
    }

    #[test]
    fn test_serde_transparent() {
        let owner = OwnerId::new("bob").expect("valid owner");
        assert_eq!(serde_json::to_string(&owner).expect("serialize"), "\"bob\"");

        let version: VersionId = serde_json::from_str("\"rev-7\"").expect("deserialize");
        assert_eq!(version.as_str(), "rev-7");
    }
}
