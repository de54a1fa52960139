use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use percent_encoding::{percent_encode, NON_ALPHANUMERIC};

use crate::host::constants::{DEFAULT_STORAGE_DIR, STORAGE_DIR_ENV};
use crate::host::error::{storage_error, HostResult};

/// Durable key/value storage owned by the host.
pub trait HostStorage: Send + Sync {
    fn get_item(&self, key: &str) -> HostResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> HostResult<()>;
    fn remove_item(&self, key: &str) -> HostResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryHostStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryHostStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostStorage for MemoryHostStorage {
    fn get_item(&self, key: &str) -> HostResult<Option<String>> {
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> HostResult<()> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> HostResult<()> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }
}

/// One JSON file per key under a base directory.
#[derive(Clone, Debug)]
pub struct FileHostStorage {
    base_dir: Arc<PathBuf>,
}

impl FileHostStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> HostResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|err| {
            storage_error(format!(
                "Failed to create storage directory '{}': {}",
                base_dir.display(),
                err
            ))
        })?;
        Ok(Self {
            base_dir: Arc::new(base_dir),
        })
    }

    /// `$WEBVIEW_BRIDGE_STORAGE_DIR`, else `.webview-bridge` in the working directory.
    pub fn from_env() -> HostResult<Self> {
        if let Ok(dir) = std::env::var(STORAGE_DIR_ENV) {
            return Self::new(PathBuf::from(dir));
        }

        let dir = std::env::current_dir()
            .map_err(|err| storage_error(format!("Failed to obtain working directory: {err}")))?
            .join(DEFAULT_STORAGE_DIR);
        Self::new(dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_for(&self, key: &str) -> PathBuf {
        let encoded = percent_encode(key.as_bytes(), NON_ALPHANUMERIC).to_string();
        self.base_dir.join(format!("{encoded}.json"))
    }
}

impl HostStorage for FileHostStorage {
    fn get_item(&self, key: &str) -> HostResult<Option<String>> {
        let path = self.file_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|err| {
            storage_error(format!("Failed to read '{}': {}", path.display(), err))
        })?;
        let value = serde_json::from_slice::<String>(&bytes).map_err(|err| {
            storage_error(format!("Failed to parse '{}': {}", path.display(), err))
        })?;
        Ok(Some(value))
    }

    fn set_item(&self, key: &str, value: &str) -> HostResult<()> {
        let path = self.file_for(key);
        let bytes = serde_json::to_vec(value).map_err(|err| {
            storage_error(format!("Failed to serialize '{}': {}", path.display(), err))
        })?;
        fs::write(&path, bytes)
            .map_err(|err| storage_error(format!("Failed to write '{}': {}", path.display(), err)))
    }

    fn remove_item(&self, key: &str) -> HostResult<()> {
        let path = self.file_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|err| {
                storage_error(format!("Failed to delete '{}': {}", path.display(), err))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        std::env::temp_dir().join(format!(
            "webview-bridge-storage-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ))
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryHostStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = temp_dir();
        let storage = FileHostStorage::new(dir.clone()).unwrap();

        storage.set_item("fcm_token", "{\"token\":\"t\"}").unwrap();
        assert_eq!(
            storage.get_item("fcm_token").unwrap().as_deref(),
            Some("{\"token\":\"t\"}")
        );

        // survives a fresh handle on the same directory
        let reopened = FileHostStorage::new(dir.clone()).unwrap();
        assert!(reopened.get_item("fcm_token").unwrap().is_some());

        reopened.remove_item("fcm_token").unwrap();
        reopened.remove_item("fcm_token").unwrap();
        assert_eq!(storage.get_item("fcm_token").unwrap(), None);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn file_names_are_percent_encoded() {
        let dir = temp_dir();
        let storage = FileHostStorage::new(dir.clone()).unwrap();
        storage.set_item("../escape", "x").unwrap();
        assert!(dir.join("%2E%2E%2Fescape.json").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = temp_dir();
        let storage = FileHostStorage::new(dir.clone()).unwrap();
        fs::write(dir.join("device%5Fid.json"), b"not json").unwrap();
        let err = storage.get_item("device_id").unwrap_err();
        assert_eq!(err.code_str(), "host/storage");
        fs::remove_dir_all(dir).ok();
    }
}
