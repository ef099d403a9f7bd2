// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client-local keyed storage for session snapshots.
//!
//! Stores hold opaque serialized text; decoding (and discarding malformed
//! data) is the session context's job.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{SessionError, SessionResult};

/// Keyed text storage.
pub trait SessionStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn load(&self, key: &str) -> SessionResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> SessionResult<()>;

    /// Removes the value under `key`; missing keys are not an error.
    fn remove(&self, key: &str) -> SessionResult<()>;
}

// =============================================================================
// MemorySessionStore
// =============================================================================

/// In-memory store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a value exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Stores raw text, bypassing the session context.
    pub fn put_raw(&self, key: &str, value: impl Into<String>) {
        self.entries.write().insert(key.to_string(), value.into());
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> SessionResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

// =============================================================================
// FileSessionStore
// =============================================================================

/// One JSON file per key under a directory.
///
/// Writes go to a temporary sibling first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `dir`, creating it if necessary.
    pub fn new(dir: impl AsRef<Path>) -> SessionResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            SessionError::storage_io(format!("Failed to create {}", dir.display()), e)
        })?;
        Ok(Self { dir })
    }

    /// Returns the directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &str) -> SessionResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            // Non-UTF-8 content is corruption, not an IO outage.
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(SessionError::malformed(format!("{}: {}", path.display(), e)))
            }
            Err(e) => Err(SessionError::storage_io(
                format!("Failed to read {}", path.display()),
                e,
            )),
        }
    }

    fn save(&self, key: &str, value: &str) -> SessionResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| SessionError::storage_io(format!("Failed to write {}", path.display()), e))
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::storage_io(
                format!("Failed to remove {}", path.display()),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert!(store.load("k").unwrap().is_none());

        store.save("k", "v").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));
        assert!(store.clone().contains("k"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(!store.contains("k"));
    }

    #[test]
    fn test_file_store() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions")).unwrap();

        store.save("warden.session", "{\"a\":1}").unwrap();
        assert_eq!(
            store.load("warden.session").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(dir.path().join("sessions/warden.session.json").exists());

        store.remove("warden.session").unwrap();
        assert!(store.load("warden.session").unwrap().is_none());
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        store.save("../escape", "x").unwrap();
        assert!(dir.path().join(".._escape.json").exists());
    }
}
