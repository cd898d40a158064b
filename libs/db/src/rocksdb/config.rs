//! Configuration types for RocksDB store handles.
//!
//! `RocksConfig` is the typed, immutable configuration consumed by
//! [`Store::open`](super::Store::open). `RocksSettings` is the loosely typed
//! bundle (e.g. parsed from JSON) that is validated into a `RocksConfig` once.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use super::handle::AccessMode;
use crate::error::{Result, StoreError};

// ============================================================================
// BlockCacheConfig
// ============================================================================

/// Configuration for the RocksDB block cache.
///
/// The block cache stores uncompressed data blocks. A store handle creates one
/// LRU cache and attaches it to the default column family.
#[derive(Debug, Clone)]
pub struct BlockCacheConfig {
    /// Total block cache size in bytes.
    /// Default: 64MB.
    pub cache_size_bytes: usize,

    /// Block size for the default column family.
    /// Default: 4KB.
    pub block_size: usize,

    /// Whether to cache index and filter blocks in the block cache.
    /// Default: true.
    pub cache_index_and_filter_blocks: bool,
}

impl Default for BlockCacheConfig {
    fn default() -> Self {
        Self {
            cache_size_bytes: 64 * 1024 * 1024, // 64MB
            block_size: 4 * 1024,               // 4KB
            cache_index_and_filter_blocks: true,
        }
    }
}

impl BlockCacheConfig {
    /// Create config with specified cache size, using defaults for other settings.
    pub fn with_cache_size(cache_size_bytes: usize) -> Self {
        Self {
            cache_size_bytes,
            ..Default::default()
        }
    }
}

// ============================================================================
// RocksConfig
// ============================================================================

/// Default memtable size for read-write handles.
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Typed configuration for opening a [`Store`](super::Store).
///
/// # Example
///
/// ```ignore
/// let config = RocksConfig::new("/data/videos.rkdb")
///     .with_access_mode(AccessMode::Secondary)
///     .with_secondary_path("/tmp/videos.replica");
/// let store = Store::open(config)?;
/// ```
#[derive(Debug, Clone)]
pub struct RocksConfig {
    /// Primary database directory
    pub db_path: PathBuf,

    /// Access mode bound to the handle
    pub access_mode: AccessMode,

    /// Secondary working directory override (secondary mode only).
    /// When `None`, derived as `<db_path>.secondary.<pid>`.
    pub secondary_path: Option<PathBuf>,

    /// Leave the secondary working directory on disk when the handle closes.
    pub keep_secondary_path: bool,

    /// Block cache sizing
    pub block_cache: BlockCacheConfig,

    /// Memtable size for read-write handles
    pub write_buffer_size: usize,
}

impl RocksConfig {
    /// Create a read-write config for `db_path` with defaults for everything else.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            access_mode: AccessMode::default(),
            secondary_path: None,
            keep_secondary_path: false,
            block_cache: BlockCacheConfig::default(),
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        }
    }

    pub fn with_access_mode(mut self, access_mode: AccessMode) -> Self {
        self.access_mode = access_mode;
        self
    }

    pub fn with_secondary_path(mut self, secondary_path: impl Into<PathBuf>) -> Self {
        self.secondary_path = Some(secondary_path.into());
        self
    }

    pub fn with_keep_secondary_path(mut self, keep: bool) -> Self {
        self.keep_secondary_path = keep;
        self
    }

    pub fn with_block_cache(mut self, block_cache: BlockCacheConfig) -> Self {
        self.block_cache = block_cache;
        self
    }

    pub fn with_write_buffer_size(mut self, write_buffer_size: usize) -> Self {
        self.write_buffer_size = write_buffer_size;
        self
    }
}

/// Derive the per-process secondary directory: `<db_path>.secondary.<pid>`.
pub fn default_secondary_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(format!(".secondary.{}", std::process::id()));
    PathBuf::from(name)
}

// ============================================================================
// RocksSettings
// ============================================================================

/// Loosely typed settings bundle, e.g. loaded from a JSON file.
///
/// ```json
/// { "db_path": "/data/videos.rkdb", "access_type": "secondary" }
/// ```
///
/// Missing fields take the defaults of [`RocksConfig::new`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RocksSettings {
    pub db_path: Option<PathBuf>,
    #[serde(alias = "access_mode")]
    pub access_type: Option<String>,
    pub secondary_path: Option<PathBuf>,
    pub keep_secondary_path: Option<bool>,
    pub cache_size_bytes: Option<usize>,
    pub write_buffer_size: Option<usize>,
}

impl RocksSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            StoreError::invalid_configuration(format!("failed to parse settings: {}", e))
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Self::from_json_str(&contents)
    }

    /// Validate and merge over the defaults.
    ///
    /// Fails with `InvalidConfiguration` when `db_path` is missing or
    /// `access_type` is not a recognized mode.
    pub fn into_config(self) -> Result<RocksConfig> {
        let db_path = self
            .db_path
            .ok_or_else(|| StoreError::invalid_configuration("db_path is required"))?;

        let mut config = RocksConfig::new(db_path);
        if let Some(access_type) = self.access_type {
            config.access_mode = AccessMode::from_str(&access_type)?;
        }
        config.secondary_path = self.secondary_path;
        if let Some(keep) = self.keep_secondary_path {
            config.keep_secondary_path = keep;
        }
        if let Some(cache_size_bytes) = self.cache_size_bytes {
            config.block_cache = BlockCacheConfig::with_cache_size(cache_size_bytes);
        }
        if let Some(write_buffer_size) = self.write_buffer_size {
            config.write_buffer_size = write_buffer_size;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_cache_config_default() {
        let config = BlockCacheConfig::default();
        assert_eq!(config.cache_size_bytes, 64 * 1024 * 1024);
        assert_eq!(config.block_size, 4 * 1024);
        assert!(config.cache_index_and_filter_blocks);
    }

    #[test]
    fn test_block_cache_config_with_cache_size() {
        let config = BlockCacheConfig::with_cache_size(8 * 1024 * 1024);
        assert_eq!(config.cache_size_bytes, 8 * 1024 * 1024);
        // Other defaults preserved
        assert_eq!(config.block_size, 4 * 1024);
    }

    #[test]
    fn test_rocks_config_defaults() {
        let config = RocksConfig::new("/tmp/test.rkdb");
        assert_eq!(config.access_mode, AccessMode::ReadWrite);
        assert!(config.secondary_path.is_none());
        assert!(!config.keep_secondary_path);
        assert_eq!(config.write_buffer_size, DEFAULT_WRITE_BUFFER_SIZE);
    }

    #[test]
    fn test_default_secondary_path_suffix() {
        let path = default_secondary_path(Path::new("/data/test.rkdb"));
        let expected = format!("/data/test.rkdb.secondary.{}", std::process::id());
        assert_eq!(path, PathBuf::from(expected));
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = RocksConfig::new("/data/test.rkdb")
            .with_access_mode(AccessMode::Secondary)
            .with_secondary_path("/tmp/custom")
            .with_keep_secondary_path(true)
            .with_write_buffer_size(1024)
            .with_block_cache(BlockCacheConfig::with_cache_size(2048));
        assert_eq!(config.access_mode, AccessMode::Secondary);
        assert_eq!(config.secondary_path, Some(PathBuf::from("/tmp/custom")));
        assert!(config.keep_secondary_path);
        assert_eq!(config.write_buffer_size, 1024);
        assert_eq!(config.block_cache.cache_size_bytes, 2048);
    }

    #[test]
    fn test_settings_default_mode_is_read_write() {
        let settings = RocksSettings::from_json_str(r#"{"db_path": "/tmp/a.rkdb"}"#).unwrap();
        let config = settings.into_config().unwrap();
        assert_eq!(config.access_mode, AccessMode::ReadWrite);
        assert_eq!(config.db_path, PathBuf::from("/tmp/a.rkdb"));
    }

    #[test]
    fn test_settings_all_fields() {
        let settings = RocksSettings::from_json_str(
            r#"{
                "db_path": "/tmp/a.rkdb",
                "access_type": "secondary",
                "secondary_path": "/tmp/a.replica",
                "keep_secondary_path": true,
                "cache_size_bytes": 1048576,
                "write_buffer_size": 2097152
            }"#,
        )
        .unwrap();
        let config = settings.into_config().unwrap();
        assert_eq!(config.access_mode, AccessMode::Secondary);
        assert_eq!(config.secondary_path, Some(PathBuf::from("/tmp/a.replica")));
        assert!(config.keep_secondary_path);
        assert_eq!(config.block_cache.cache_size_bytes, 1048576);
        assert_eq!(config.write_buffer_size, 2097152);
    }

    #[test]
    fn test_settings_access_mode_alias() {
        let settings =
            RocksSettings::from_json_str(r#"{"db_path": "/tmp/a", "access_mode": "read_only"}"#)
                .unwrap();
        assert_eq!(
            settings.into_config().unwrap().access_mode,
            AccessMode::ReadOnly
        );
    }

    #[test]
    fn test_settings_invalid_access_type() {
        let settings =
            RocksSettings::from_json_str(r#"{"db_path": "/tmp/a", "access_type": "invalid"}"#)
                .unwrap();
        let err = settings.into_config().unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("Invalid access_type"));
    }

    #[test]
    fn test_settings_missing_db_path() {
        let settings = RocksSettings::from_json_str("{}").unwrap();
        assert!(matches!(
            settings.into_config(),
            Err(StoreError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_settings_malformed_json() {
        assert!(matches!(
            RocksSettings::from_json_str("{not json"),
            Err(StoreError::InvalidConfiguration { .. })
        ));
    }
}
