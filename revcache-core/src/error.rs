//! Error types for revcache operations
//!
//! "Not found" is never an error here: backends report absence as `Ok(None)`.
//! Everything below is a genuine failure that callers log and degrade on.

use thiserror::Error;

/// Blob store and record errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Backend failure during {operation}: {reason}")]
    Backend { operation: String, reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("Failed to encode {name}: {reason}")]
    Encode { name: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Failures of collaborators this crate does not own.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Fetch of {url} failed: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Owner of {path} could not be resolved: {reason}")]
    OwnerUnresolved { path: String, reason: String },

    #[error("File {path} could not be resolved: {reason}")]
    FileUnresolved { path: String, reason: String },

    #[error("Version listing failed for file {file_id}: {reason}")]
    VersionListing { file_id: String, reason: String },
}

/// Validation errors for identifiers and inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field must not be empty: {field}")]
    Empty { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Errors reading a lifecycle notification's parameter map.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("Notification parameter missing: {key}")]
    MissingParam { key: String },

    #[error("Notification parameter {key} has unsupported type")]
    InvalidParam { key: String },

    #[error("Malformed version path: {path}")]
    MalformedVersionPath { path: String },
}

/// Master error type for all revcache errors.
#[derive(Debug, Clone, Error)]
pub enum RevcacheError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

impl RevcacheError {
    /// True for malformed stored payloads, which readers treat as absent.
    pub fn is_decode(&self) -> bool {
        matches!(self, RevcacheError::Storage(StorageError::Decode { .. }))
    }
}

/// Result type alias for revcache operations.
pub type RevcacheResult<T> = Result<T, RevcacheError>;

// =============================================================================
// TESTS
// =============================================================================
