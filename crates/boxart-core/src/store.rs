//! Customization state store - the current record plus its saved collection

use chrono::Utc;
use tracing::{error, info};

use crate::image_ref::{encode_data_url, ImageSlot};
use crate::record::{CustomizationRecord, FieldUpdate, InitialData};
use crate::repository::{RecordRepository, StoreError};

/// Result of a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Replaced,
}

/// Holds exactly one current record for a customizer session
pub struct CustomizationStore<R> {
    repository: R,
    initial: InitialData,
    current: CustomizationRecord,
}

impl<R: RecordRepository> CustomizationStore<R> {
    pub fn new(repository: R, initial: InitialData) -> Self {
        let current = CustomizationRecord::from_initial(&initial);
        Self {
            repository,
            initial,
            current,
        }
    }

    pub fn current(&self) -> &CustomizationRecord {
        &self.current
    }

    /// Start a new session with different initial data, discarding edits
    pub fn begin_session(&mut self, initial: InitialData) {
        self.initial = initial;
        self.reset();
    }

    pub fn update(&mut self, update: FieldUpdate) {
        self.current.apply(update);
        self.current.last_modified = Utc::now();
    }

    pub fn save(&mut self) -> Result<SaveOutcome, StoreError> {
        self.current.last_modified = Utc::now();
        match self.repository.upsert(self.current.clone()) {
            Ok(replaced) => {
                info!("Saved customization '{}'", self.current.title);
                Ok(if replaced { SaveOutcome::Replaced } else { SaveOutcome::Created })
            }
            Err(e) => {
                error!("Failed to save customization '{}': {}", self.current.title, e);
                Err(e)
            }
        }
    }

    /// Returns `Ok(false)` and leaves the current record alone if `title` is not saved
    pub fn load(&mut self, title: &str) -> Result<bool, StoreError> {
        let records = self.repository.get_all().map_err(|e| {
            error!("Failed to read saved customizations: {}", e);
            e
        })?;
        match records.into_iter().find(|r| r.title == title) {
            Some(record) => {
                info!("Loaded customization '{}'", title);
                self.current = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete(&mut self, title: &str) -> Result<bool, StoreError> {
        self.repository.delete(title).map_err(|e| {
            error!("Failed to delete customization '{}': {}", title, e);
            e
        })
    }

    pub fn reset(&mut self) {
        self.current = CustomizationRecord::from_initial(&self.initial);
    }

    /// Replace one image slot with uploaded file content
    pub fn upload_image(&mut self, slot: ImageSlot, mime: &str, bytes: &[u8]) {
        let source = encode_data_url(mime, bytes);
        info!("Uploaded {} image ({} bytes, {})", slot.label(), bytes.len(), mime);
        self.update(FieldUpdate::Image(slot, source));
    }

    /// Saved records sorted by title
    pub fn saved(&self) -> Result<Vec<CustomizationRecord>, StoreError> {
        let mut records = self.repository.get_all()?;
        records.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(records)
    }

    /// Current record as pretty JSON, for export
    pub fn export_current(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.current)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::record::AssetSet;
    use crate::repository::{JsonRecordRepository, KeyValueStorage, MemoryStorage, DEFAULT_STORAGE_KEY};

    fn store() -> CustomizationStore<JsonRecordRepository<MemoryStorage>> {
        CustomizationStore::new(
            JsonRecordRepository::new(MemoryStorage::new(), DEFAULT_STORAGE_KEY),
            InitialData {
                assets: Some(AssetSet::new("front.png", None, None)),
                platform: Some(Platform::Xbox),
                title: Some("Halo".to_string()),
            },
        )
    }

    /// Storage that refuses every write, like a full browser quota
    struct FullStorage;

    impl KeyValueStorage for FullStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_save_then_load_roundtrips() {
        let mut store = store();
        store.update(FieldUpdate::FrameColor("#FF8C00".to_string()));
        store.update(FieldUpdate::Saturation(1.5));
        assert_eq!(store.save().unwrap(), SaveOutcome::Created);
        let saved = store.current().clone();

        store.reset();
        assert_ne!(store.current().frame_color, "#FF8C00");
        assert!(store.load("Halo").unwrap());
        assert_eq!(store.current(), &saved);
    }

    #[test]
    fn test_delete_then_load_misses() {
        let mut store = store();
        store.save().unwrap();
        assert!(store.delete("Halo").unwrap());
        assert!(store.saved().unwrap().iter().all(|r| r.title != "Halo"));

        let before = store.current().clone();
        assert!(!store.load("Halo").unwrap());
        assert_eq!(store.current(), &before);
    }

    #[test]
    fn test_same_title_keeps_latest() {
        let mut store = store();
        store.save().unwrap();
        store.update(FieldUpdate::FrameColor("#000000".to_string()));
        assert_eq!(store.save().unwrap(), SaveOutcome::Replaced);

        let saved = store.saved().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].frame_color, "#000000");
    }

    #[test]
    fn test_reset_restores_platform_defaults() {
        let mut store = store();
        store.update(FieldUpdate::Platform(Platform::Playstation));
        store.update(FieldUpdate::FrameColor("#E60012".to_string()));
        store.update(FieldUpdate::Brightness(1.7));
        store.update(FieldUpdate::Contrast(0.6));
        store.update(FieldUpdate::Saturation(0.2));
        store.reset();

        let current = store.current();
        assert_eq!(current.frame_color, Platform::Xbox.base_color());
        assert_eq!(current.brightness, 1.0);
        assert_eq!(current.contrast, 1.0);
        assert_eq!(current.saturation, 1.0);
    }

    #[test]
    fn test_platform_switch_overwrites_custom_color() {
        let mut store = store();
        assert_eq!(store.current().frame_color, "#107C10");
        store.update(FieldUpdate::FrameColor("#FFD700".to_string()));
        store.update(FieldUpdate::Platform(Platform::Playstation));
        assert_eq!(store.current().frame_color, "#0070D1");
    }

    #[test]
    fn test_upload_only_touches_its_slot() {
        let mut store = store();
        store.update(FieldUpdate::Image(ImageSlot::Back, "back.png".to_string()));
        store.upload_image(ImageSlot::Front, "image/png", &[137, 80, 78, 71]);

        let current = store.current();
        assert!(current.front_image.starts_with("data:image/png;base64,"));
        assert_eq!(current.back_image, "back.png");
        assert_eq!(current.spine_image, "front.png");
    }

    #[test]
    fn test_update_stamps_last_modified() {
        let mut store = store();
        let before = store.current().last_modified;
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.update(FieldUpdate::Title("Halo 2".to_string()));
        assert!(store.current().last_modified > before);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let mut store = CustomizationStore::new(
            JsonRecordRepository::new(FullStorage, DEFAULT_STORAGE_KEY),
            InitialData::default(),
        );
        assert!(matches!(store.save(), Err(StoreError::WriteFailed(_))));
    }

    #[test]
    fn test_saved_is_sorted_by_title() {
        let mut store = store();
        for title in ["Zelda", "Alan Wake", "Metroid"] {
            store.update(FieldUpdate::Title(title.to_string()));
            store.save().unwrap();
        }
        let titles: Vec<_> = store.saved().unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Alan Wake", "Metroid", "Zelda"]);
    }

    #[test]
    fn test_begin_session_replaces_defaults() {
        let mut store = store();
        store.update(FieldUpdate::FrameColor("#FFFFFF".to_string()));
        store.begin_session(InitialData {
            platform: Some(Platform::Pc),
            ..Default::default()
        });
        assert_eq!(store.current().frame_color, Platform::Pc.base_color());
        assert_eq!(store.current().front_image, "");
    }

    #[test]
    fn test_export_is_json() {
        let store = store();
        let json = store.export_current().unwrap();
        let parsed: CustomizationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, store.current());
    }
}
