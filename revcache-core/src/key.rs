//! Artifact key scheme.
//!
//! Every cached version owns two artifacts, named
//! `history_<file>_<version>.json` and `changes_<file>_<version>.zip`.
//! The file id is rendered in decimal digits and always followed by `_`, so
//! the file prefix `history_1_` can never match a name belonging to file `12`.
//! Version ids may contain `_` themselves: parsing splits at the first `_`
//! after the file id, which is unambiguous because file ids are digits-only.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{FileId, VersionId};

/// Separator between the name fields.
pub const SEPARATOR: char = '_';

/// The two artifact kinds stored per (file, version).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Structured edit history plus the `prev` marker.
    History,
    /// Opaque diff package.
    Changes,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::History, ArtifactKind::Changes];

    pub fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::History => "history",
            ArtifactKind::Changes => "changes",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::History => "json",
            ArtifactKind::Changes => "zip",
        }
    }

    fn extension_suffix(self) -> String {
        format!(".{}", self.extension())
    }
}

/// Address of one artifact inside an owner namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey {
    kind: ArtifactKind,
    file_id: FileId,
    version_id: VersionId,
}

impl ArtifactKey {
    pub fn new(kind: ArtifactKind, file_id: FileId, version_id: VersionId) -> Self {
        Self {
            kind,
            file_id,
            version_id,
        }
    }

    pub fn history(file_id: FileId, version_id: VersionId) -> Self {
        Self::new(ArtifactKind::History, file_id, version_id)
    }

    pub fn changes(file_id: FileId, version_id: VersionId) -> Self {
        Self::new(ArtifactKind::Changes, file_id, version_id)
    }

    /// Both keys of the pair stored for a version, changes first.
    pub fn pair(file_id: FileId, version_id: &VersionId) -> [ArtifactKey; 2] {
        [
            Self::changes(file_id, version_id.clone()),
            Self::history(file_id, version_id.clone()),
        ]
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn version_id(&self) -> &VersionId {
        &self.version_id
    }

    /// Physical object name, e.g. `history_12_1700000000.json`.
    pub fn name(&self) -> String {
        format!(
            "{}{}{}",
            Self::file_prefix(self.kind, self.file_id),
            self.version_id,
            self.kind.extension_suffix()
        )
    }

    /// Name prefix shared by every version of `file_id` for one kind.
    pub fn file_prefix(kind: ArtifactKind, file_id: FileId) -> String {
        format!("{}{SEPARATOR}{}{SEPARATOR}", kind.prefix(), file_id)
    }

    /// Parse a physical object name back into a key.
    ///
    /// Returns `None` for names that were not produced by [`ArtifactKey::name`].
    pub fn parse(name: &str) -> Option<Self> {
        let kind = ArtifactKind::ALL
            .into_iter()
            .find(|kind| name.starts_with(kind.prefix()))?;

        let rest = name[kind.prefix().len()..].strip_prefix(SEPARATOR)?;
        let rest = rest.strip_suffix(kind.extension_suffix().as_str())?;

        let (file, version) = rest.split_once(SEPARATOR)?;
        let file_id = file.parse::<FileId>().ok()?;
        let version_id = VersionId::new(version).ok()?;

        Some(Self::new(kind, file_id, version_id))
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
