//! In-memory storage backend, used in tests and for ephemeral runs.

use crate::{ClientStorage, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory key/value storage. Contents do not survive the process.
#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .data
            .lock()
            .expect("storage lock poisoned")
            .get(key)
            .cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        Ok(self
            .data
            .lock()
            .expect("storage lock poisoned")
            .remove(key)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
        assert!(storage.has("k").unwrap());

        assert!(storage.delete("k").unwrap());
        assert!(!storage.delete("k").unwrap());
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let storage = MemoryStorage::new();
        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v2".to_string()));
    }
}
