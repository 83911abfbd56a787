// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Key-value storage backends and the project repository.
//!
//! Everything the designer persists (projects, the event list, guest
//! lists, the shared guest bundle) lives under a string key in a
//! [`KeyValueStore`]. The desktop build uses [`FileStore`], one JSON file
//! per key; tests use an in-memory store.

use crate::models::project::ProjectData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of the per-event project key.
pub const PROJECT_KEY_PREFIX: &str = "dex_designer_v12_";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize record for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read and deserialize a JSON record. A missing key is `Ok(None)`.
pub fn get_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serialize and write a JSON record.
pub fn put_json<T: serde::Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.put(key, &raw)
}

/// Keys are opaque, but never empty.
fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        Err(StoreError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// File name for a key: ASCII letters, digits, `_` and `-` are kept, every
/// other byte becomes `%XX`. The mapping is injective and never yields a
/// path separator or a leading dot.
fn file_name_for(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 5);
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name.push_str(".json");
    name
}

/// One `<key>.json` file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(file_name_for(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a half-written record.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }
}

/// Process-local store.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, std::collections::HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.entries().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Per-event access to project records.
pub struct ProjectRepository<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn key_for(event_id: &str) -> String {
        format!("{PROJECT_KEY_PREFIX}{event_id}")
    }

    /// Load the project for `event_id`, `Ok(None)` if there is none yet.
    pub fn get(&self, event_id: &str) -> Result<Option<ProjectData>, StoreError> {
        get_json(self.store, &Self::key_for(event_id))
    }

    pub fn put(&self, event_id: &str, project: &ProjectData) -> Result<(), StoreError> {
        put_json(self.store, &Self::key_for(event_id), project)
    }
}
