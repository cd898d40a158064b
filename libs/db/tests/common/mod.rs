#![allow(dead_code)]

pub mod concurrent_test_utils;

use sedb_db::{RocksConfig, Store};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temp dir holding a not-yet-created database path.
pub fn tmp_db_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.rkdb");
    (temp_dir, db_path)
}

/// Create and populate a database with three string entries, then close it.
pub fn populated_db() -> (TempDir, PathBuf) {
    let (temp_dir, db_path) = tmp_db_path();
    populate(&db_path);
    (temp_dir, db_path)
}

pub fn populate(db_path: &Path) {
    let mut store = Store::open(RocksConfig::new(db_path)).expect("Failed to open writer");
    store
        .mset([("key1", "value1"), ("key2", "value2"), ("key3", "value3")])
        .expect("Failed to populate");
    store.flush().expect("Failed to flush");
    store.close().expect("Failed to close");
}
