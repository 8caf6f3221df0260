// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable key-value substrate.
//!
//! A synchronous string-to-string map with `get`, `set`, `remove` and a
//! count of occupied keys. Two backends:
//! - `MemoryKvStore`: in-process only, lost on restart
//! - `FileKvStore`: the same map mirrored to a JSON file on every write

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors from the key-value substrate.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt store file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Synchronous key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key. Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Set a value, overwriting any existing one.
    fn set(&self, key: &str, value: String) -> Result<(), KvError>;

    /// Remove a key. No-op if the key doesn't exist.
    fn remove(&self, key: &str) -> Result<(), KvError>;

    /// Number of occupied keys.
    fn len(&self) -> usize;

    /// All occupied keys, in no particular order.
    fn keys(&self) -> Vec<String>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &str) -> Result<bool, KvError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        (**self).remove(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_map(map: BTreeMap<String, String>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        self.entries.remove(key);
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

/// Key-value store persisted as a single JSON object on disk.
///
/// Every mutation rewrites the file through a temporary sibling and an
/// atomic rename, so a crash leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    inner: MemoryKvStore,
}

impl FileKvStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KvError> {
        let path = path.as_ref().to_path_buf();

        let map = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| KvError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(KvError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        tracing::info!(path = %path.display(), keys = map.len(), "Opened key-value store");

        Ok(Self {
            path,
            inner: MemoryKvStore::from_map(map),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents` to disk. Callers update the in-memory map only after
    /// this succeeds.
    fn write_file(&self, contents: &BTreeMap<String, String>) -> Result<(), KvError> {
        let io_err = |source| KvError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(contents)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        let mut contents = self.inner.snapshot();
        contents.insert(key.to_string(), value.clone());
        self.write_file(&contents)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut contents = self.inner.snapshot();
        if contents.remove(key).is_none() {
            return Ok(());
        }
        self.write_file(&contents)?;
        self.inner.remove(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}
