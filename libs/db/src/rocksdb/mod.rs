//! Mode-gated access to an embedded RocksDB database.
//!
//! A single database directory can be opened concurrently, from this and
//! other processes, in three modes:
//!
//! ```text
//!                      primary path (RocksDB dir)
//!                 ┌──────────────┴───────────────┐
//!                 │                              │
//!        ┌────────┴────────┐            ┌────────┴────────┐
//!        │   read_write    │            │    read_only    │  (any number)
//!        │ set/mset/flush  │            │ get/mget/iter   │
//!        └────────┬────────┘            └─────────────────┘
//!                 │ WAL + MANIFEST
//!                 ▼
//!        ┌─────────────────┐
//!        │    secondary    │  <primary>.secondary.<pid>/
//!        │ get/mget/iter   │  replays the primary's log on catch_up()
//!        └─────────────────┘
//! ```
//!
//! Only one `read_write` handle may hold a path at a time; RocksDB's `LOCK`
//! file rejects a second writer, and that error is surfaced unchanged.
//!
//! # Usage
//!
//! ```ignore
//! Store::scoped(RocksConfig::new(&path), |store| {
//!     store.set("hello", "world")?;
//!     store.flush()
//! })?;
//!
//! let mut replica = Store::open(
//!     RocksConfig::new(&path).with_access_mode(AccessMode::Secondary),
//! )?;
//! replica.catch_up()?;
//! let value: Option<String> = replica.get("hello")?;
//! ```

mod codec;
mod config;
mod handle;
mod keys;
mod store;

// Re-exports
pub use codec::{decode_value, encode_value};
pub use config::{
    default_secondary_path, BlockCacheConfig, RocksConfig, RocksSettings,
    DEFAULT_WRITE_BUFFER_SIZE,
};
pub use handle::{AccessMode, DatabaseHandle, StorageOptions};
pub use keys::KeyBatches;
pub use store::Store;
