//! Namespaced blob storage backends.
//!
//! The version artifact store never talks to a filesystem or database
//! directly; it goes through the [`BlobStore`] / [`Namespace`] contract.
//!
//! # Backends
//!
//! - [`InMemoryBlobStore`]: structured `BTreeMap` index per owner, for tests
//!   and ephemeral deployments
//! - [`LmdbBlobStore`]: durable LMDB environment, owner-scoped binary keys
//!   built by [`NamespaceKey`]

pub mod lmdb_backend;
pub mod memory;
pub mod namespace_key;
pub mod traits;

pub use lmdb_backend::{LmdbBlobError, LmdbBlobStore, LmdbNamespace};
pub use memory::{InMemoryBlobStore, InMemoryNamespace};
pub use namespace_key::NamespaceKey;
pub use traits::{BlobStore, Namespace};
