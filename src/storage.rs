//! Key/value persistence behind the session store.
//!
//! [`KeyValueStore`] mirrors the shape of browser local storage: string keys,
//! string values, reads that never fail. Two backends:
//! - [`MemoryStore`] - process-local, for tests and throwaway runs
//! - [`FileStore`] - one JSON object on disk, rewritten on every mutation

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Error;

/// String key/value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), Error>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }
    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set_item(key, value)
    }
    fn remove_item(&self, key: &str) -> Result<(), Error> {
        (**self).remove_item(key)
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        self.items.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        self.items.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// File-backed store.
///
/// The whole map lives in memory and is written back as one JSON object
/// after each `set_item`/`remove_item`. A mutation becomes visible to
/// readers only once the file write succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, creating parent directories as needed.
    /// A missing file starts an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the file exists but cannot be read or
    /// is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("create '{}': {e}", parent.display()))
            })?;
        }

        let items = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| Error::Storage(format!("parse '{}': {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(Error::Storage(format!("read '{}': {e}", path.display()))),
        };

        tracing::debug!(path = %path.display(), keys = items.len(), "Opened storage file");
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(items)
            .map_err(|e| Error::Storage(format!("serialize: {e}")))?;
        std::fs::write(&self.path, json)
            .map_err(|e| Error::Storage(format!("write '{}': {e}", self.path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(FILE_MODE))
                .map_err(|e| Error::Storage(format!("chmod '{}': {e}", self.path.display())))?;
        }

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut items = self.items.lock();
        let mut next = items.clone();
        next.insert(key.to_owned(), value.to_owned());
        self.flush(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        let mut items = self.items.lock();
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.flush(&next)?;
        *items = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k"), None);
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").as_deref(), Some("v"));
        store.remove_item("k").unwrap();
        store.remove_item("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::open(&path).unwrap();
        store.set_item("speckle_user_id", "u1").unwrap();
        store.set_item("pkce_challenge", "abc").unwrap();
        store.remove_item("pkce_challenge").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("speckle_user_id").as_deref(), Some("u1"));
        assert_eq!(reopened.get_item("pkce_challenge"), None);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(Error::Storage(_))));
    }

    #[test]
    fn test_file_store_keeps_state_when_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("state");
        let store = FileStore::open(parent.join("storage.json")).unwrap();
        store.set_item("pkce_challenge", "abc").unwrap();

        // A regular file where the directory was makes every write fail.
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "").unwrap();

        assert!(matches!(
            store.set_item("speckle_user_id", "u1"),
            Err(Error::Storage(_))
        ));
        assert_eq!(store.get_item("speckle_user_id"), None);

        assert!(matches!(
            store.remove_item("pkce_challenge"),
            Err(Error::Storage(_))
        ));
        assert_eq!(store.get_item("pkce_challenge").as_deref(), Some("abc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = FileStore::open(&path).unwrap();
        store.set_item("speckle_token", "t").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, FILE_MODE);
    }
}
