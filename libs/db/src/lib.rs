//! Database access library for sedb.
//!
//! The [`rocksdb`] module provides [`Store`], a handle on an embedded RocksDB
//! database bound to one [`AccessMode`]: read-write, read-only, or a
//! secondary replica that follows the primary through explicit catch-up.

pub mod error;
pub mod rocksdb;

pub use error::{Result, StoreError};
pub use self::rocksdb::{AccessMode, KeyBatches, RocksConfig, RocksSettings, Store};
