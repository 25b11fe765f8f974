//! Configuration types

use crate::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default application name, used as the `app` field on every log line.
pub const DEFAULT_APP_NAME: &str = "onlyoffice";

/// Default LMDB map size in megabytes.
pub const DEFAULT_LMDB_MAX_SIZE_MB: usize = 256;

/// LMDB backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmdbConfig {
    /// Directory holding the LMDB environment.
    pub path: PathBuf,
    /// Maximum map size in megabytes.
    pub max_size_mb: usize,
}

impl Default for LmdbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("appdata/revcache"),
            max_size_mb: DEFAULT_LMDB_MAX_SIZE_MB,
        }
    }
}

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevcacheConfig {
    /// Application name reported in logs.
    pub app_name: String,
    pub lmdb: LmdbConfig,
}

impl Default for RevcacheConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            lmdb: LmdbConfig::default(),
        }
    }
}

impl RevcacheConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `REVCACHE_APP_NAME`: Application name for log context (default: onlyoffice)
    /// - `REVCACHE_LMDB_PATH`: LMDB environment directory (default: appdata/revcache)
    /// - `REVCACHE_LMDB_MAX_SIZE_MB`: LMDB map size (default: 256)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            app_name: std::env::var("REVCACHE_APP_NAME").unwrap_or(defaults.app_name),
            lmdb: LmdbConfig {
                path: std::env::var("REVCACHE_LMDB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.lmdb.path),
                max_size_mb: std::env::var("REVCACHE_LMDB_MAX_SIZE_MB")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.lmdb.max_size_mb),
            },
        }
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - app_name is not empty
    /// - lmdb.path is not empty
    /// - lmdb.max_size_mb > 0
    pub fn validate(&self) -> RevcacheResult<()> {
        if self.app_name.trim().is_empty() {
            return Err(RevcacheError::Config(ConfigError::MissingRequired {
                field: "app_name".to_string(),
            }));
        }

        if self.lmdb.path.as_os_str().is_empty() {
            return Err(RevcacheError::Config(ConfigError::MissingRequired {
                field: "lmdb.path".to_string(),
            }));
        }

        if self.lmdb.max_size_mb == 0 {
            return Err(RevcacheError::Config(ConfigError::InvalidValue {
                field: "lmdb.max_size_mb".to_string(),
                value: self.lmdb.max_size_mb.to_string(),
                reason: "max_size_mb must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
