//! Value serialization using MessagePack.
//!
//! MessagePack is self-describing, so scalars keep their type across a
//! round-trip: an integer stored with `set` comes back as an integer, a string
//! as a string. Keys are stored as raw UTF-8 bytes so that RocksDB's byte-wise
//! ordering is also the lexicographic key order.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Serialize a value for storage under `key`.
pub fn encode_value<V: Serialize + ?Sized>(key: &str, value: &V) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

/// Deserialize a value read from `key`.
pub fn decode_value<V: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<V> {
    rmp_serde::from_slice(bytes).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}

/// Convert a stored key back to a `String`.
pub fn decode_key(bytes: &[u8]) -> Result<String> {
    Ok(String::from_utf8(bytes.to_vec())?)
}
