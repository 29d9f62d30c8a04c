//! Key/value storage backends for persisted routes
//!
//! A single trait, [`StorageBackend`], with three implementations:
//!
//! - `WebLocalStorage` (wasm32): `window.localStorage`, scoped to the page origin.
//! - `FileStorage` (native): one JSON file holding a map of keys to string
//!   values, in the per-user configuration directory.
//! - [`MemoryStorage`]: an in-process map, used in tests and as a fallback
//!   when the platform backend cannot be opened.
//!
//! Values are plain strings; [`save_json_backend`] and [`load_json_backend`]
//! layer `serde_json` on top.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    #[cfg(not(target_arch = "wasm32"))]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Platform storage error: {0}")]
    Platform(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous string key/value store
pub trait StorageBackend: Send + Sync {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// `Ok(None)` when the key is missing
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// No-op if the key does not exist
    fn remove(&self, key: &str) -> StorageResult<()>;

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }
}

pub fn save_json_backend<T: Serialize + ?Sized>(
    backend: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let s = serde_json::to_string(value).map_err(|e| StorageError::Json(e.to_string()))?;
    backend.set_string(key, &s)
}

pub fn load_json_backend<T: DeserializeOwned>(
    backend: &dyn StorageBackend,
    key: &str,
) -> StorageResult<Option<T>> {
    match backend.get_string(key)? {
        Some(s) => serde_json::from_str::<T>(&s)
            .map(Some)
            .map_err(|e| StorageError::Json(e.to_string())),
        None => Ok(None),
    }
}

fn lock_poisoned<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Platform(format!("mutex poisoned: {}", e))
}

/// In-memory backend
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        self.inner
            .lock()
            .map_err(lock_poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.inner.lock().map_err(lock_poisoned)?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.lock().map_err(lock_poisoned)?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .inner
            .lock()
            .map_err(lock_poisoned)?
            .keys()
            .cloned()
            .collect())
    }
}

//
// Web implementation (localStorage)
//
#[cfg(target_arch = "wasm32")]
mod web_storage {
    use super::*;
    use wasm_bindgen::JsValue;
    use web_sys::Storage;

    fn local_storage() -> Result<Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError::Platform("no window".into()))?
            .local_storage()
            .map_err(|e| StorageError::Platform(format!("local_storage() failed: {:?}", e)))?
            .ok_or_else(|| StorageError::Platform("local_storage not available".into()))
    }

    /// Browser-backed localStorage implementation.
    ///
    /// `web_sys::Storage` is not `Send`, so the handle is looked up on every call.
    pub struct WebLocalStorage;

    impl StorageBackend for WebLocalStorage {
        fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
            local_storage()?.set_item(key, value).map_err(|e| {
                StorageError::Platform(format!("set_item error: {:?}", JsValue::from(e)))
            })
        }

        fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
            local_storage()?.get_item(key).map_err(|e| {
                StorageError::Platform(format!("get_item error: {:?}", JsValue::from(e)))
            })
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            local_storage()?.remove_item(key).map_err(|e| {
                StorageError::Platform(format!("remove_item error: {:?}", JsValue::from(e)))
            })
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            let storage = local_storage()?;
            let len = storage.length().map_err(|e| {
                StorageError::Platform(format!(
                    "local_storage length error: {:?}",
                    JsValue::from(e)
                ))
            })?;
            Ok((0..len).filter_map(|i| storage.key(i).ok().flatten()).collect())
        }
    }

    pub fn default_backend(
        _path: Option<std::path::PathBuf>,
    ) -> Result<Box<dyn StorageBackend>, StorageError> {
        Ok(Box::new(WebLocalStorage))
    }
}

//
// Native file-backed implementation
//
#[cfg(not(target_arch = "wasm32"))]
mod file_storage {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// A single JSON file holding a map of key -> string value.
    ///
    /// The file is read into memory on open; every mutation rewrites it.
    pub struct FileStorage {
        path: PathBuf,
        inner: Mutex<HashMap<String, String>>,
    }

    impl FileStorage {
        /// - Windows: %APPDATA%/RoutePlanner/storage.json
        /// - Else: $HOME/.config/route-planner/storage.json
        pub fn default_storage_path() -> PathBuf {
            if cfg!(windows)
                && let Ok(appdata) = std::env::var("APPDATA")
            {
                return Path::new(&appdata).join("RoutePlanner").join("storage.json");
            }

            if let Ok(home) = std::env::var("HOME") {
                return Path::new(&home)
                    .join(".config")
                    .join("route-planner")
                    .join("storage.json");
            }

            Path::new(".").join("route-planner-storage.json")
        }

        pub fn open(path: Option<PathBuf>) -> Result<Self, StorageError> {
            let path = path.unwrap_or_else(Self::default_storage_path);

            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Io(format!("Failed to create storage directory: {}", e))
                })?;
            }

            let mut map = HashMap::new();
            if path.exists() {
                let s = fs::read_to_string(&path)
                    .map_err(|e| StorageError::Io(format!("Failed to read storage file: {}", e)))?;
                if !s.trim().is_empty() {
                    match serde_json::from_str(&s) {
                        Ok(parsed) => map = parsed,
                        Err(e) => Self::set_aside(&path, &e)?,
                    }
                }
            }

            tracing::debug!("Opened file storage at {}", path.display());
            Ok(FileStorage {
                path,
                inner: Mutex::new(map),
            })
        }

        /// Move an unparseable storage file to `<name>.bak` so a fresh one can be written
        fn set_aside(path: &Path, error: &serde_json::Error) -> StorageResult<()> {
            let mut backup = path.as_os_str().to_owned();
            backup.push(".bak");
            let backup = PathBuf::from(backup);
            tracing::warn!(
                "Storage file {} is not valid JSON ({}), moving it to {} and starting empty",
                path.display(),
                error,
                backup.display()
            );
            fs::rename(path, &backup).map_err(|e| {
                StorageError::Io(format!("Failed to move aside corrupt storage file: {}", e))
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush_locked(&self, locked: &HashMap<String, String>) -> StorageResult<()> {
            let s = serde_json::to_string_pretty(locked)
                .map_err(|e| StorageError::Json(e.to_string()))?;
            fs::write(&self.path, s).map_err(|e| StorageError::Io(format!("write failed: {}", e)))
        }
    }

    impl StorageBackend for FileStorage {
        fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut guard = self.inner.lock().map_err(lock_poisoned)?;
            guard.insert(key.to_string(), value.to_string());
            self.flush_locked(&guard)
        }

        fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.inner.lock().map_err(lock_poisoned)?.get(key).cloned())
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            let mut guard = self.inner.lock().map_err(lock_poisoned)?;
            if guard.remove(key).is_some() {
                self.flush_locked(&guard)?;
            }
            Ok(())
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            Ok(self
                .inner
                .lock()
                .map_err(lock_poisoned)?
                .keys()
                .cloned()
                .collect())
        }
    }

    pub fn default_backend(path: Option<PathBuf>) -> Result<Box<dyn StorageBackend>, StorageError> {
        Ok(Box::new(FileStorage::open(path)?))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file_storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use web_storage::WebLocalStorage;

/// Open the platform's default backend.
///
/// `path` selects the storage file on native targets and is ignored on the web.
#[cfg(target_arch = "wasm32")]
pub use web_storage::default_backend as default_storage_backend;

#[cfg(not(target_arch = "wasm32"))]
pub use file_storage::default_backend as default_storage_backend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_string("k").unwrap(), None);

        storage.set_string("k", "v").unwrap();
        assert_eq!(storage.get_string("k").unwrap().as_deref(), Some("v"));
        assert_eq!(storage.keys().unwrap(), vec!["k".to_string()]);

        storage.remove("k").unwrap();
        assert_eq!(storage.get_string("k").unwrap(), None);
    }

    #[test]
    fn test_json_helpers() {
        let storage = MemoryStorage::new();
        save_json_backend(&storage, "numbers", &vec![1, 2, 3]).unwrap();
        let numbers: Option<Vec<i32>> = load_json_backend(&storage, "numbers").unwrap();
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        storage.set_string("broken", "{not json").unwrap();
        let broken: StorageResult<Option<Vec<i32>>> = load_json_backend(&storage, "broken");
        assert!(matches!(broken, Err(StorageError::Json(_))));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_persists_between_opens() {
        let dir = std::env::temp_dir().join(format!(
            "route-planner-storage-test-{}",
            std::process::id()
        ));
        let path = dir.join("storage.json");
        let _ = std::fs::remove_file(&path);

        {
            let storage = FileStorage::open(Some(path.clone())).unwrap();
            storage.set_string("savedRoutes", "[]").unwrap();
        }

        let reopened = FileStorage::open(Some(path.clone())).unwrap();
        assert_eq!(
            reopened.get_string("savedRoutes").unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(reopened.path(), path.as_path());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_corrupt_file_is_set_aside() {
        let dir = std::env::temp_dir().join(format!(
            "route-planner-corrupt-storage-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("storage.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let storage = default_storage_backend(Some(path.clone())).unwrap();
        assert_eq!(storage.get_string("savedRoutes").unwrap(), None);
        assert_eq!(
            std::fs::read_to_string(dir.join("storage.json.bak")).unwrap(),
            "{ truncated"
        );

        // Later writes reach disk again
        storage.set_string("savedRoutes", "[]").unwrap();
        let reopened = FileStorage::open(Some(path)).unwrap();
        assert_eq!(
            reopened.get_string("savedRoutes").unwrap().as_deref(),
            Some("[]")
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
