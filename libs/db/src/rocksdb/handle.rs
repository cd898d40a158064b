//! Database handle types for RocksDB storage.
//!
//! Provides abstractions for different database access modes:
//! - `AccessMode`: Which of the three modes a store is opened in
//! - `DatabaseHandle`: Enum wrapping read-write, read-only, and secondary DB instances
//! - `StorageOptions`: Default RocksDB options per access mode

use std::fmt;
use std::str::FromStr;

use rocksdb::{BlockBasedOptions, Cache, Options, DB};

use super::config::RocksConfig;
use crate::error::StoreError;

// ============================================================================
// AccessMode
// ============================================================================

/// Storage access mode.
///
/// Determines how the database is opened and what operations are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessMode {
    /// Exclusive writer; creates the database if missing
    #[default]
    ReadWrite,
    /// Read-only view; any number may coexist with each other and a writer
    ReadOnly,
    /// Read replica that follows the primary via explicit catch-up
    Secondary,
}

impl AccessMode {
    pub const ALL: [AccessMode; 3] = [
        AccessMode::ReadWrite,
        AccessMode::ReadOnly,
        AccessMode::Secondary,
    ];

    /// Configuration string for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadWrite => "read_write",
            AccessMode::ReadOnly => "read_only",
            AccessMode::Secondary => "secondary",
        }
    }

    /// Only read-write handles may mutate the primary path.
    pub fn is_writable(&self) -> bool {
        match self {
            AccessMode::ReadWrite => true,
            AccessMode::ReadOnly | AccessMode::Secondary => false,
        }
    }

    /// Whether opening requires the primary path to already exist.
    pub fn requires_existing(&self) -> bool {
        match self {
            AccessMode::ReadWrite => false,
            AccessMode::ReadOnly | AccessMode::Secondary => true,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read_write" => Ok(AccessMode::ReadWrite),
            "read_only" => Ok(AccessMode::ReadOnly),
            "secondary" => Ok(AccessMode::Secondary),
            other => Err(StoreError::invalid_configuration(format!(
                "Invalid access_type {:?}: expected one of 'read_write', 'read_only', 'secondary'",
                other
            ))),
        }
    }
}

// ============================================================================
// DatabaseHandle
// ============================================================================

/// An open RocksDB instance, tagged with the mode it was opened in.
pub enum DatabaseHandle {
    /// Read-write access to the primary
    ReadWrite(DB),
    /// Read-only view of the primary
    ReadOnly(DB),
    /// Secondary instance that follows a primary database
    Secondary(DB),
}

impl DatabaseHandle {
    /// Underlying DB for read operations, regardless of mode.
    pub fn db(&self) -> &DB {
        match self {
            DatabaseHandle::ReadWrite(db)
            | DatabaseHandle::ReadOnly(db)
            | DatabaseHandle::Secondary(db) => db,
        }
    }
}

// ============================================================================
// StorageOptions
// ============================================================================

/// Default RocksDB options factory for each access mode.
pub struct StorageOptions;

impl StorageOptions {
    /// Options for opening the handle described by `config`.
    pub fn for_config(config: &RocksConfig) -> Options {
        let mut options = match config.access_mode {
            AccessMode::ReadWrite => Self::default_for_readwrite(config.write_buffer_size),
            AccessMode::ReadOnly => Self::default_for_readonly(),
            AccessMode::Secondary => Self::default_for_secondary(),
        };

        let cache = Cache::new_lru_cache(config.block_cache.cache_size_bytes);
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_block_cache(&cache);
        block_opts.set_block_size(config.block_cache.block_size);
        block_opts
            .set_cache_index_and_filter_blocks(config.block_cache.cache_index_and_filter_blocks);
        options.set_block_based_table_factory(&block_opts);

        options
    }

    /// Default options for read-write mode.
    ///
    /// Settings:
    /// - `error_if_exists`: false (allow opening existing DBs)
    /// - `create_if_missing`: true (create new DBs)
    /// - Parallelism: uses available CPUs, capped at 4 background jobs
    pub fn default_for_readwrite(write_buffer_size: usize) -> Options {
        let mut options = Options::default();
        options.set_error_if_exists(false);
        options.create_if_missing(true);

        let num_cpus = std::thread::available_parallelism()
            .map(|p| p.get() as i32)
            .unwrap_or(2);
        options.increase_parallelism(num_cpus);
        options.set_max_background_jobs(num_cpus.min(4));

        options.set_write_buffer_size(write_buffer_size);

        options
    }

    /// Default options for read-only mode.
    ///
    /// Settings:
    /// - `error_if_exists`: false
    /// - `create_if_missing`: false (DB must exist)
    pub fn default_for_readonly() -> Options {
        let mut options = Options::default();
        options.set_error_if_exists(false);
        options.create_if_missing(false);
        options
    }

    /// Default options for secondary mode.
    ///
    /// Key requirement: `max_open_files = -1` (must keep all file descriptors open)
    pub fn default_for_secondary() -> Options {
        let mut options = Options::default();
        options.set_error_if_exists(false);
        options.create_if_missing(false);
        options.set_max_open_files(-1);
        options
    }
}
