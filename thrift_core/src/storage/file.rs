//! File-backed key-value storage.
//!
//! Each key is stored as `<data_dir>/<key>.json`. Writes are atomic:
//!
//! 1. Take an exclusive OS lock on `<key>.json.lock` (fs2)
//! 2. Write the value to `<key>.json.tmp` and fsync
//! 3. Rename over `<key>.json`
//!
//! The lock guard removes the lock file when dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, trace};

use super::{validate_key, KeyValueStore};
use crate::errors::{ThriftError, ThriftResult};

const VALUE_EXTENSION: &str = "json";

/// Stores each key as a JSON file in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Use `data_dir` for storage. The directory is created on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        FileStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.{VALUE_EXTENSION}"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ThriftResult<Option<String>> {
        validate_key(key)?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                trace!("Read {} bytes from {}", contents.len(), path.display());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ThriftError::storage("read", key, e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> ThriftResult<()> {
        validate_key(key)?;
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| ThriftError::storage("create data dir", key, e.to_string()))?;

        let path = self.path_for(key);
        let _lock = WriteLock::acquire(&path, key)?;
        write_atomic(&path, value).map_err(|e| ThriftError::storage("write", key, e.to_string()))?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ThriftResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ThriftError::storage("remove", key, e.to_string())),
        }
    }

    fn keys(&self) -> ThriftResult<Vec<String>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ThriftError::storage("list", self.data_dir.display().to_string(), e.to_string())),
        };

        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension()? != VALUE_EXTENSION {
                    return None;
                }
                path.file_stem()?.to_str().map(str::to_string)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Write to a sibling temp file, fsync, then rename into place
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp_path = path.with_extension(format!("{VALUE_EXTENSION}.tmp"));

    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(contents.as_bytes())?;
    tmp_file.sync_all()?;

    fs::rename(&tmp_path, path).inspect_err(|_| {
        // Clean up temp file if rename fails
        let _ = fs::remove_file(&tmp_path);
    })
}

/// Exclusive lock held for the duration of one write.
struct WriteLock {
    lock_path: PathBuf,
    _lock_file: File,
}

impl WriteLock {
    fn acquire(path: &Path, key: &str) -> ThriftResult<Self> {
        let lock_path = path.with_extension(format!("{VALUE_EXTENSION}.lock"));

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| ThriftError::storage("create lock", key, e.to_string()))?;

        // Non-blocking: another writer means the caller retries on its next tick
        lock_file
            .try_lock_exclusive()
            .map_err(|_| ThriftError::StorageLocked { key: key.to_string() })?;

        Ok(WriteLock {
            lock_path,
            _lock_file: lock_file,
        })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        // OS lock is released when _lock_file is dropped
    }
}
