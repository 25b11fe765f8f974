//! revcache Storage - Version Artifact Store
//!
//! Caches one history record and one change package per file version,
//! scoped to the owning user. Reads are self-healing: a record whose `prev`
//! marker no longer matches the expected predecessor is removed on sight.
//!
//! # Layers
//!
//! - [`blob`]: namespaced blob backends (in-memory and LMDB)
//! - [`VersionArtifactStore`]: put/get/delete of artifact pairs
//! - [`consistency`]: `prev` check and self-heal
//! - [`ChangesResolver`]: UI ordinal to change package

pub mod blob;
pub mod consistency;
pub mod resolver;
mod save;
pub mod stats;
mod store;

pub use blob::{
    BlobStore, InMemoryBlobStore, InMemoryNamespace, LmdbBlobError, LmdbBlobStore, LmdbNamespace,
    Namespace, NamespaceKey,
};
pub use consistency::Consistency;
pub use resolver::{resolve_ordinal, ChangesResolver, ResolvedVersion};
pub use save::SaveOutcome;
pub use stats::StoreStats;
pub use store::VersionArtifactStore;
