//! Persistence of customization records
//!
//! Records live under a single key in a string key-value store as one JSON
//! array that is replaced wholesale on every write. The key-value backend is
//! pluggable: memory for tests, files for native builds, and browser
//! `localStorage` in the web frontend.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

use crate::record::CustomizationRecord;

pub const DEFAULT_STORAGE_KEY: &str = "boxArtCustomizations";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage write failed: {0}")]
    WriteFailed(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Minimal string key-value storage, shaped like the browser Storage API
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Collection operations over saved records, unique by title
pub trait RecordRepository: Send + Sync {
    fn get_all(&self) -> Result<Vec<CustomizationRecord>, StoreError>;
    /// Insert or replace by title. Returns true if a record was replaced.
    fn upsert(&mut self, record: CustomizationRecord) -> Result<bool, StoreError>;
    /// Remove by title. Returns true if a record was removed.
    fn delete(&mut self, title: &str) -> Result<bool, StoreError>;
}

impl<R: RecordRepository + ?Sized> RecordRepository for Box<R> {
    fn get_all(&self) -> Result<Vec<CustomizationRecord>, StoreError> {
        (**self).get_all()
    }

    fn upsert(&mut self, record: CustomizationRecord) -> Result<bool, StoreError> {
        (**self).upsert(record)
    }

    fn delete(&mut self, title: &str) -> Result<bool, StoreError> {
        (**self).delete(title)
    }
}

/// Records stored as a JSON array under one key
pub struct JsonRecordRepository<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> JsonRecordRepository<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    fn write_all(&mut self, records: &[CustomizationRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)?;
        self.storage.set_item(&self.key, &json)?;
        debug!("Wrote {} records to '{}'", records.len(), self.key);
        Ok(())
    }
}

impl<S: KeyValueStorage> RecordRepository for JsonRecordRepository<S> {
    fn get_all(&self) -> Result<Vec<CustomizationRecord>, StoreError> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Vec<CustomizationRecord>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                // Unparseable data reads as an empty collection
                warn!("Ignoring malformed saved records under '{}': {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    fn upsert(&mut self, record: CustomizationRecord) -> Result<bool, StoreError> {
        let mut records = self.get_all()?;
        let before = records.len();
        records.retain(|r| r.title != record.title);
        let replaced = records.len() != before;
        records.push(record);
        self.write_all(&records)?;
        Ok(replaced)
    }

    fn delete(&mut self, title: &str) -> Result<bool, StoreError> {
        let mut records = self.get_all()?;
        let before = records.len();
        records.retain(|r| r.title != title);
        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records)?;
        Ok(true)
    }
}

/// In-process storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let items = self
            .items
            .lock()
            .map_err(|_| StoreError::Unavailable("memory storage poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StoreError::Unavailable("memory storage poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CustomizationRecord, InitialData};
    use tempfile::TempDir;

    fn record(title: &str) -> CustomizationRecord {
        CustomizationRecord::from_initial(&InitialData {
            title: Some(title.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_upsert_replaces_by_title() {
        let mut repo = JsonRecordRepository::new(MemoryStorage::new(), DEFAULT_STORAGE_KEY);
        assert!(!repo.upsert(record("Halo")).unwrap());
        let mut again = record("Halo");
        again.frame_color = "#000000".to_string();
        assert!(repo.upsert(again).unwrap());

        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].frame_color, "#000000");
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut repo = JsonRecordRepository::new(MemoryStorage::new(), DEFAULT_STORAGE_KEY);
        repo.upsert(record("A")).unwrap();
        assert!(!repo.delete("B").unwrap());
        assert!(repo.delete("A").unwrap());
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_data_reads_as_empty() {
        let mut storage = MemoryStorage::new();
        storage.set_item(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let mut repo = JsonRecordRepository::new(storage.clone(), DEFAULT_STORAGE_KEY);
        assert!(repo.get_all().unwrap().is_empty());

        // A save over malformed data starts a fresh collection
        repo.upsert(record("Fresh")).unwrap();
        let raw = storage.get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        assert!(raw.starts_with('['));
    }

    #[test]
    fn test_file_storage_persists() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        let mut repo = JsonRecordRepository::new(storage, DEFAULT_STORAGE_KEY);
        repo.upsert(record("Persisted")).unwrap();

        let reopened = JsonRecordRepository::new(
            FileStorage::new(temp_dir.path()).unwrap(),
            DEFAULT_STORAGE_KEY,
        );
        let all = reopened.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Persisted");
    }

    #[test]
    fn test_file_storage_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("nested")).unwrap();
        assert_eq!(storage.get_item("nothing").unwrap(), None);
    }
}
