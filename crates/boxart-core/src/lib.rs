//! BoxArt Core - engine-independent types and logic for the box art viewer
//!
//! This crate provides:
//! - The platform table (dimensions, base color, material per platform)
//! - Customization records and the state store with pluggable persistence
//! - Image source parsing and the brightness/contrast/saturation pass
//! - Face layout, texture load tracking, and spin animation math
//! - Viewer configuration

pub mod adjust;
pub mod animation;
pub mod color;
pub mod config;
pub mod faces;
pub mod image_ref;
pub mod loading;
pub mod platform;
pub mod record;
pub mod repository;
pub mod store;

pub use adjust::ImageAdjustments;
pub use animation::{Orientation, SpinState};
pub use config::{ConfigError, ViewerConfig};
pub use faces::{BoxFace, FaceMaterial, ResolvedFace};
pub use image_ref::{ImageRef, ImageRefError, ImageSlot};
pub use loading::{SlotStatus, TextureSetStatus};
pub use platform::{Platform, PlatformConfig, PlatformError};
pub use record::{AssetSet, CustomizationRecord, FieldUpdate, InitialData};
pub use repository::{
    FileStorage, JsonRecordRepository, KeyValueStorage, MemoryStorage, RecordRepository,
    StoreError,
};
pub use store::{CustomizationStore, SaveOutcome};
