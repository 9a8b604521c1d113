//! Persistence backends for saved customizations
//!
//! Browser builds keep records in `window.localStorage`; native builds keep
//! them as JSON files in a data directory.

use boxart_core::{JsonRecordRepository, RecordRepository, StoreError};

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod local {
    use boxart_core::{KeyValueStorage, StoreError};

    /// `window.localStorage`, looked up on every access
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LocalStorage;

    impl LocalStorage {
        fn storage() -> Result<web_sys::Storage, StoreError> {
            let window = web_sys::window()
                .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
            window
                .local_storage()
                .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?
                .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
        }
    }

    impl KeyValueStorage for LocalStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
            Self::storage()?
                .get_item(key)
                .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            // Quota errors surface here
            Self::storage()?
                .set_item(key, value)
                .map_err(|e| StoreError::WriteFailed(format!("{:?}", e)))
        }
    }
}

/// Repository over browser local storage
#[cfg(target_arch = "wasm32")]
pub fn open_repository(key: &str) -> Result<Box<dyn RecordRepository>, StoreError> {
    Ok(Box::new(JsonRecordRepository::new(LocalStorage, key)))
}

/// Repository over JSON files in `dir`
#[cfg(not(target_arch = "wasm32"))]
pub fn open_repository(
    key: &str,
    dir: &std::path::Path,
) -> Result<Box<dyn RecordRepository>, StoreError> {
    let storage = boxart_core::FileStorage::new(dir)?;
    tracing::info!("Saving customizations under {}", dir.display());
    Ok(Box::new(JsonRecordRepository::new(storage, key)))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use boxart_core::{CustomizationRecord, InitialData};
    use tempfile::TempDir;

    #[test]
    fn test_file_repository_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let mut record = CustomizationRecord::from_initial(&InitialData::default());
        record.title = "Persisted".to_string();

        {
            let mut repo = open_repository("boxArtCustomizations", dir.path()).unwrap();
            assert!(!repo.upsert(record.clone()).unwrap());
        }

        let repo = open_repository("boxArtCustomizations", dir.path()).unwrap();
        let all = repo.get_all().unwrap();
        assert_eq!(all, vec![record]);
    }
}
