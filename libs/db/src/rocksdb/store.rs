//! Mode-gated RocksDB store handle.
//!
//! A `Store` owns one open RocksDB instance bound to exactly one
//! [`AccessMode`]. Reads are allowed in every mode; `set`/`mset` only on
//! read-write handles; `catch_up` only on secondary handles. Secondary
//! handles additionally own a private working directory, removed on close.

use std::path::{Path, PathBuf};

use rocksdb::{WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::codec::{decode_value, encode_value};
use super::config::{default_secondary_path, RocksConfig};
use super::handle::{AccessMode, DatabaseHandle, StorageOptions};
use super::keys::KeyBatches;
use crate::error::{Result, StoreError};

// ============================================================================
// SecondaryDir
// ============================================================================

/// Upper bound on numbered siblings tried when deriving a secondary directory.
const MAX_SECONDARY_SUFFIX: usize = 1024;

/// Working directory of a secondary handle.
#[derive(Debug)]
struct SecondaryDir {
    path: PathBuf,
    /// Removed on close when true
    owned: bool,
}

impl SecondaryDir {
    /// Create the working directory for a secondary handle.
    ///
    /// An explicit override is created by this handle. If it already exists it
    /// is only accepted with `keep_secondary_path`, and is then never removed.
    /// The derived `<db_path>.secondary.<pid>` directory must not already
    /// exist; if another handle in this process holds it, a numbered sibling
    /// (`<db_path>.secondary.<pid>.1`, ...) is claimed instead.
    fn claim(config: &RocksConfig) -> Result<Self> {
        let owned = !config.keep_secondary_path;

        if let Some(path) = &config.secondary_path {
            return Self::claim_override(path, config.keep_secondary_path);
        }

        let base = default_secondary_path(&config.db_path);
        let mut candidate = base.clone();
        for n in 1..=MAX_SECONDARY_SUFFIX {
            match std::fs::create_dir(&candidate) {
                Ok(()) => {
                    return Ok(Self {
                        path: candidate,
                        owned,
                    })
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    let mut name = base.as_os_str().to_owned();
                    name.push(format!(".{}", n));
                    candidate = PathBuf::from(name);
                }
                Err(e) => return Err(StoreError::io(&candidate, e)),
            }
        }
        Err(StoreError::io(
            &base,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "no free secondary working directory",
            ),
        ))
    }

    fn claim_override(path: &Path, keep: bool) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        match std::fs::create_dir(path) {
            Ok(()) => Ok(Self {
                path: path.to_path_buf(),
                owned: !keep,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && keep => {
                tracing::debug!(path = %path.display(), "[rocks] Reusing kept secondary directory");
                Ok(Self {
                    path: path.to_path_buf(),
                    owned: false,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::invalid_configuration(format!(
                    "secondary_path already exists: {} (in use by another handle, or set keep_secondary_path to reuse it)",
                    path.display()
                )))
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn remove(&self) -> Result<()> {
        if !self.owned {
            return Ok(());
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// A handle on one RocksDB database, opened in a single access mode.
///
/// Lifecycle: a `Store` value exists only after a successful [`Store::open`],
/// and stays open until [`Store::close`] (or drop). Closing is idempotent.
///
/// # Example
///
/// ```ignore
/// let mut writer = Store::open(RocksConfig::new(&path))?;
/// writer.mset([("key1", "value1"), ("key2", "value2")])?;
/// writer.flush()?;
///
/// let mut replica = Store::open(
///     RocksConfig::new(&path).with_access_mode(AccessMode::Secondary),
/// )?;
/// writer.set("key3", &3)?;
/// writer.flush()?;
/// replica.catch_up()?;
/// assert_eq!(replica.get::<i64>("key3")?, Some(3));
/// ```
pub struct Store {
    db_path: PathBuf,
    mode: AccessMode,
    secondary: Option<SecondaryDir>,
    db: Option<DatabaseHandle>,
}

impl Store {
    // =========================================================================
    // Open / Close
    // =========================================================================

    /// Open a store as described by `config`.
    ///
    /// - `ReadWrite`: creates the database if it does not exist.
    /// - `ReadOnly`/`Secondary`: fails with `NotFound` if it does not exist.
    /// - `Secondary`: creates the working directory before opening; it is
    ///   removed again if the open fails.
    #[tracing::instrument(skip(config), fields(path = ?config.db_path, mode = %config.access_mode))]
    pub fn open(config: RocksConfig) -> Result<Self> {
        let mode = config.access_mode;
        let db_path = config.db_path.clone();

        let existed = validate_db_path(&db_path)?;
        if !existed && mode.requires_existing() {
            return Err(StoreError::NotFound { path: db_path });
        }

        let options = StorageOptions::for_config(&config);

        let (handle, secondary) = match mode {
            AccessMode::ReadWrite => {
                let db = DB::open(&options, &db_path)?;
                (DatabaseHandle::ReadWrite(db), None)
            }
            AccessMode::ReadOnly => {
                let db = DB::open_for_read_only(&options, &db_path, false)?;
                (DatabaseHandle::ReadOnly(db), None)
            }
            AccessMode::Secondary => {
                let secondary = SecondaryDir::claim(&config)?;

                match DB::open_as_secondary(&options, &db_path, &secondary.path) {
                    Ok(db) => (DatabaseHandle::Secondary(db), Some(secondary)),
                    Err(e) => {
                        if let Err(cleanup) = secondary.remove() {
                            tracing::warn!(
                                error = %cleanup,
                                "[rocks] Failed to remove secondary directory after open failure"
                            );
                        }
                        return Err(e.into());
                    }
                }
            }
        };

        let status = if existed { "Opened" } else { "Created" };
        tracing::info!(
            mode = %mode,
            path = %db_path.display(),
            secondary_path = ?secondary.as_ref().map(|s| &s.path),
            "[rocks] {}",
            status
        );

        Ok(Self {
            db_path,
            mode,
            secondary,
            db: Some(handle),
        })
    }

    /// Open a store, run `f` on it, then close it on every exit path.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub fn scoped<T, E, F>(config: RocksConfig, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Store) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        let mut store = Store::open(config)?;
        let result = f(&mut store);
        let closed = store.close();
        match result {
            Ok(value) => {
                closed?;
                Ok(value)
            }
            Err(e) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "[rocks] Close failed after scoped error");
                }
                Err(e)
            }
        }
    }

    /// Close the database and release the secondary working directory.
    ///
    /// Calling this on an already closed store is a no-op, except that a
    /// secondary directory whose removal failed is retried.
    pub fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.db.take() {
            drop(handle);
            tracing::info!(mode = %self.mode, path = %self.db_path.display(), "[rocks] Closed");
        }

        if let Some(secondary) = self.secondary.as_mut() {
            if let Err(e) = secondary.remove() {
                tracing::warn!(
                    path = %secondary.path.display(),
                    error = %e,
                    "[rocks] Secondary directory still pending removal"
                );
                return Err(e);
            }
            // Removed once; the path may be claimed again by a later handle.
            secondary.owned = false;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn is_writable(&self) -> bool {
        self.mode.is_writable()
    }

    pub fn is_open(&self) -> bool {
        self.db.is_some()
    }

    /// Primary database path.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Secondary working directory, if this is a secondary handle.
    pub fn secondary_path(&self) -> Option<&Path> {
        self.secondary.as_ref().map(|s| s.path.as_path())
    }

    fn handle(&self) -> Result<&DatabaseHandle> {
        self.db.as_ref().ok_or(StoreError::Closed)
    }

    /// DB for mutations; rejects every mode but read-write.
    fn writable_db(&self, operation: &'static str) -> Result<&DB> {
        match self.handle()? {
            DatabaseHandle::ReadWrite(db) => Ok(db),
            DatabaseHandle::ReadOnly(_) | DatabaseHandle::Secondary(_) => {
                Err(StoreError::NotWritable {
                    operation,
                    mode: self.mode,
                })
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Value stored under `key`, or `None` if absent.
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>> {
        let db = self.handle()?.db();
        match db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(decode_value(key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Values for `keys`, in the same order; absent keys yield `None`.
    pub fn mget<V, K>(&self, keys: &[K]) -> Result<Vec<Option<V>>>
    where
        V: DeserializeOwned,
        K: AsRef<str>,
    {
        let db = self.handle()?.db();
        let raw = db.multi_get(keys.iter().map(|k| k.as_ref().as_bytes()));

        keys.iter()
            .zip(raw)
            .map(|(key, item)| -> Result<Option<V>> {
                match item? {
                    Some(bytes) => Ok(Some(decode_value(key.as_ref(), &bytes)?)),
                    None => Ok(None),
                }
            })
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        let db = self.handle()?.db();
        Ok(db.get_pinned(key.as_bytes())?.is_some())
    }

    /// Iterate over all keys in batches of `batch_size` (0 is treated as 1).
    ///
    /// Each call starts a fresh pass over the database.
    pub fn iter_keys(&self, batch_size: usize) -> Result<KeyBatches<'_>> {
        let db = self.handle()?.db();
        Ok(KeyBatches::new(db, batch_size))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub fn set<V: Serialize + ?Sized>(&mut self, key: &str, value: &V) -> Result<()> {
        let db = self.writable_db("set")?;
        let bytes = encode_value(key, value)?;
        db.put(key.as_bytes(), bytes)?;
        Ok(())
    }

    /// Write all entries atomically in one batch.
    pub fn mset<I, K, V>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let db = self.writable_db("mset")?;
        let mut batch = WriteBatch::default();
        for (key, value) in entries {
            let key = key.as_ref();
            batch.put(key.as_bytes(), encode_value(key, &value)?);
        }
        let count = batch.len();
        db.write(batch)?;
        tracing::debug!(count, "[rocks] Wrote batch");
        Ok(())
    }

    /// Flush memtables to disk.
    ///
    /// A no-op on read-only and secondary handles, so callers can flush
    /// unconditionally.
    #[tracing::instrument(skip(self), fields(mode = %self.mode))]
    pub fn flush(&mut self) -> Result<()> {
        match self.handle()? {
            DatabaseHandle::ReadWrite(db) => {
                db.flush()?;
                Ok(())
            }
            DatabaseHandle::ReadOnly(_) | DatabaseHandle::Secondary(_) => {
                tracing::debug!("[rocks] Flush skipped for non-writable handle");
                Ok(())
            }
        }
    }

    // =========================================================================
    // Secondary
    // =========================================================================

    /// Replay the primary's MANIFEST and WAL so later reads see its commits.
    ///
    /// Only valid on secondary handles. Engine errors are returned as-is.
    #[tracing::instrument(skip(self), fields(mode = %self.mode))]
    pub fn catch_up(&mut self) -> Result<()> {
        match self.handle()? {
            DatabaseHandle::Secondary(db) => {
                db.try_catch_up_with_primary()?;
                tracing::debug!(path = %self.db_path.display(), "[rocks] Caught up with primary");
                Ok(())
            }
            DatabaseHandle::ReadWrite(_) | DatabaseHandle::ReadOnly(_) => {
                Err(StoreError::WrongMode {
                    operation: "catch_up",
                    required: AccessMode::Secondary,
                    mode: self.mode,
                })
            }
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, path = %self.db_path.display(), "[rocks] Close on drop failed");
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("db_path", &self.db_path)
            .field("mode", &self.mode)
            .field("secondary_path", &self.secondary_path())
            .field("open", &self.is_open())
            .finish()
    }
}

/// Check the primary path; returns whether it already exists.
fn validate_db_path(db_path: &Path) -> Result<bool> {
    match db_path.try_exists() {
        Err(e) => Err(StoreError::io(db_path, e)),
        Ok(true) => {
            if db_path.is_file() {
                return Err(StoreError::invalid_configuration(format!(
                    "Path is a file: {}",
                    db_path.display()
                )));
            }
            Ok(true)
        }
        Ok(false) => Ok(false),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
