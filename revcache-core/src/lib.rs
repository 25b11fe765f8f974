//! revcache Core - Identifiers, Key Scheme and Ports
//!
//! Plain data types shared by every revcache crate: owner/file/version
//! identifiers, the artifact naming scheme, the history record format, the
//! error taxonomy, configuration, and the traits through which the host
//! application's file and version subsystems are reached.

mod config;
mod error;
mod history;
mod ids;
mod key;
mod ports;

pub use config::{LmdbConfig, RevcacheConfig, DEFAULT_APP_NAME, DEFAULT_LMDB_MAX_SIZE_MB};
pub use error::{
    ConfigError, RevcacheError, RevcacheResult, SignalError, StorageError, UpstreamError,
    ValidationError,
};
pub use history::{HistoryPayload, HistoryRecord, PREV_FIELD};
pub use ids::{FileId, OwnerId, VersionId};
pub use key::{ArtifactKey, ArtifactKind, SEPARATOR};
pub use ports::{FileReference, PathResolver, RemoteFetch, VersionInfo, VersionProvider};
