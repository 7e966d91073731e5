//! File-backed storage: one JSON document holding all keys.

use crate::{ClientStorage, StorageError, StorageResult};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// File-backed key/value storage.
///
/// The whole document is rewritten on every mutation via a temp-file
/// rename, so a crash mid-write leaves the previous document intact.
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a file storage rooted at `path`. The file is created lazily
    /// on first write; its parent directory must exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StorageResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                // A corrupt document loses the stored keys but must not
                // wedge the client.
                warn!(path = %self.path.display(), "Corrupt storage document, starting fresh");
                Ok(Map::new())
            }
        }
    }

    fn write_document(&self, map: &Map<String, Value>) -> StorageResult<()> {
        let contents = serde_json::to_string_pretty(&Value::Object(map.clone()))
            .map_err(|e| StorageError::Encoding(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ClientStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().expect("storage lock poisoned");
        let mut map = self.read_document()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_document(&map)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().expect("storage lock poisoned");
        let map = self.read_document()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock().expect("storage lock poisoned");
        let mut map = self.read_document()?;
        let existed = map.remove(key).is_some();
        if existed {
            self.write_document(&map)?;
        }
        Ok(existed)
    }
}
