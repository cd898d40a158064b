//! Error types for store handles.

use std::path::PathBuf;

use thiserror::Error;

use crate::rocksdb::AccessMode;

/// Convenience alias used throughout `sedb_db`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by [`Store`](crate::rocksdb::Store) and its configuration.
///
/// Construction-time failures (`InvalidConfiguration`, `NotFound`) never leave
/// a handle behind. Usage errors (`NotWritable`, `WrongMode`) leave the handle
/// open and usable for the operations its mode permits.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration could not be turned into a valid store config.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong
        message: String,
    },

    /// A read-only or secondary handle was requested for a missing database.
    #[error("Cannot open non-existent DB: {}", path.display())]
    NotFound {
        /// The primary path that does not exist
        path: PathBuf,
    },

    /// A mutation was attempted on a handle that is not read-write.
    #[error("Cannot {operation} in '{mode}' mode")]
    NotWritable {
        /// Attempted operation (`set`, `mset`)
        operation: &'static str,
        /// Mode of the handle
        mode: AccessMode,
    },

    /// An operation was invoked on a handle opened in the wrong mode.
    #[error("{operation}() is only available in '{required}' mode, not '{mode}'")]
    WrongMode {
        /// Attempted operation
        operation: &'static str,
        /// Mode the operation requires
        required: AccessMode,
        /// Mode of the handle
        mode: AccessMode,
    },

    /// The handle has already been closed.
    #[error("Store is closed")]
    Closed,

    /// Failure reported by RocksDB, passed through unchanged.
    #[error(transparent)]
    Engine(#[from] rocksdb::Error),

    /// Filesystem failure while managing a secondary working directory.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode value for key {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: rmp_serde::encode::Error,
    },

    #[error("Failed to decode value for key {key:?}: {source}")]
    Decode {
        key: String,
        #[source]
        source: rmp_serde::decode::Error,
    },

    /// A stored key is not valid UTF-8.
    #[error("Invalid key: {source}")]
    InvalidKey {
        #[from]
        source: std::string::FromUtf8Error,
    },
}

impl StoreError {
    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        StoreError::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_writable_message() {
        let err = StoreError::NotWritable {
            operation: "set",
            mode: AccessMode::ReadOnly,
        };
        assert_eq!(err.to_string(), "Cannot set in 'read_only' mode");
    }

    #[test]
    fn test_wrong_mode_message() {
        let err = StoreError::WrongMode {
            operation: "catch_up",
            required: AccessMode::Secondary,
            mode: AccessMode::ReadWrite,
        };
        let msg = err.to_string();
        assert!(msg.contains("catch_up"));
        assert!(msg.contains("only available in 'secondary' mode"));
        assert!(msg.contains("read_write"));
    }

    #[test]
    fn test_not_found_message() {
        let err = StoreError::NotFound {
            path: PathBuf::from("/tmp/missing.rkdb"),
        };
        assert_eq!(
            err.to_string(),
            "Cannot open non-existent DB: /tmp/missing.rkdb"
        );
    }
}
