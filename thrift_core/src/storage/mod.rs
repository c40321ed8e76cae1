//! # Durable Storage
//!
//! A small key-value interface over wherever the state blob lives. The store
//! writes one JSON blob under a schema-versioned key (`thrift-v1`) and never
//! needs more than get/set/list.
//!
//! - [`FileStore`]: one `<key>.json` file per key in a data directory, with
//!   atomic writes and an exclusive OS lock while writing
//! - [`MemoryStore`]: in-process map, for tests and embedders

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

use std::collections::BTreeMap;

use crate::errors::{ThriftError, ThriftResult};
use crate::state::SCHEMA_VERSION;

/// Prefix shared by every schema version's key
pub const STORAGE_KEY_PREFIX: &str = "thrift-v";

/// Key the current schema version persists under
pub fn storage_key() -> String {
    format!("{STORAGE_KEY_PREFIX}{SCHEMA_VERSION}")
}

/// Key-value storage for serialized state.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> ThriftResult<Option<String>>;

    /// Overwrite the value under `key`
    fn set(&mut self, key: &str, value: &str) -> ThriftResult<()>;

    fn remove(&mut self, key: &str) -> ThriftResult<()>;

    /// All keys currently stored
    fn keys(&self) -> ThriftResult<Vec<String>>;

    fn contains(&self, key: &str) -> ThriftResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Keys must be usable as file names on every platform
pub(crate) fn validate_key(key: &str) -> ThriftResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ThriftError::invalid_input("key", key, "Storage keys may only contain letters, digits, '-', '_' and '.'"))
    }
}

/// In-memory storage.
///
/// Can be told to fail writes, so callers can exercise their failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Make every subsequent `set` fail (or succeed again)
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ThriftResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> ThriftResult<()> {
        validate_key(key)?;
        if self.fail_writes {
            return Err(ThriftError::storage("write", key, "storage unavailable"));
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ThriftResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> ThriftResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key(), "thrift-v1");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("thrift-v1").is_ok());
        assert!(validate_key("thrift_v1.backup").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../thrift-v1").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("thrift-v1").unwrap(), None);

        store.set("thrift-v1", "{}").unwrap();
        assert_eq!(store.get("thrift-v1").unwrap().as_deref(), Some("{}"));
        assert!(store.contains("thrift-v1").unwrap());
        assert_eq!(store.keys().unwrap(), vec!["thrift-v1".to_string()]);
        assert_eq!(store.write_count(), 1);

        store.set_fail_writes(true);
        let err = store.set("thrift-v1", "[]").unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(store.get("thrift-v1").unwrap().as_deref(), Some("{}"));

        store.remove("thrift-v1").unwrap();
        assert!(!store.contains("thrift-v1").unwrap());
    }
}
