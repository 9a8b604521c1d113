//! Asset sets and customization records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::image_ref::ImageSlot;
use crate::platform::Platform;

pub const BRIGHTNESS_RANGE: RangeInclusive<f32> = 0.5..=2.0;
pub const CONTRAST_RANGE: RangeInclusive<f32> = 0.5..=2.0;
pub const SATURATION_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const SLIDER_STEP: f64 = 0.01;

pub const DEFAULT_TITLE: &str = "My Custom Box Art";

/// The front/back/spine image sources bound to one box
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetSet {
    pub front: String,
    pub back: String,
    pub spine: String,
}

impl AssetSet {
    /// Back and spine fall back to the front image when absent or blank
    pub fn new(front: impl Into<String>, back: Option<String>, spine: Option<String>) -> Self {
        let front = front.into();
        let or_front = |v: Option<String>| {
            v.filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| front.clone())
        };
        Self {
            back: or_front(back),
            spine: or_front(spine),
            front,
        }
    }

    pub fn get(&self, slot: ImageSlot) -> &str {
        match slot {
            ImageSlot::Front => &self.front,
            ImageSlot::Back => &self.back,
            ImageSlot::Spine => &self.spine,
        }
    }

    pub fn set(&mut self, slot: ImageSlot, source: String) {
        match slot {
            ImageSlot::Front => self.front = source,
            ImageSlot::Back => self.back = source,
            ImageSlot::Spine => self.spine = source,
        }
    }
}

/// Data the host hands to the customizer when opening it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialData {
    pub assets: Option<AssetSet>,
    pub platform: Option<Platform>,
    pub title: Option<String>,
}

/// The saved/loadable unit of user edits, keyed by title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationRecord {
    pub title: String,
    pub front_image: String,
    pub back_image: String,
    pub spine_image: String,
    pub frame_color: String,
    pub platform: Platform,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub last_modified: DateTime<Utc>,
}

impl CustomizationRecord {
    /// Defaults derived from the session's initial data
    pub fn from_initial(initial: &InitialData) -> Self {
        let platform = initial.platform.unwrap_or_default();
        let assets = initial.assets.clone().unwrap_or_default();
        Self {
            title: initial
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            front_image: assets.front,
            back_image: assets.back,
            spine_image: assets.spine,
            frame_color: platform.base_color().to_string(),
            platform,
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            last_modified: Utc::now(),
        }
    }

    pub fn image(&self, slot: ImageSlot) -> &str {
        match slot {
            ImageSlot::Front => &self.front_image,
            ImageSlot::Back => &self.back_image,
            ImageSlot::Spine => &self.spine_image,
        }
    }

    pub fn assets(&self) -> AssetSet {
        AssetSet {
            front: self.front_image.clone(),
            back: self.back_image.clone(),
            spine: self.spine_image.clone(),
        }
    }

    /// Apply one field edit. Platform changes also reset the frame color.
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Title(title) => self.title = title,
            FieldUpdate::Image(ImageSlot::Front, source) => self.front_image = source,
            FieldUpdate::Image(ImageSlot::Back, source) => self.back_image = source,
            FieldUpdate::Image(ImageSlot::Spine, source) => self.spine_image = source,
            FieldUpdate::FrameColor(color) => self.frame_color = color,
            FieldUpdate::Platform(platform) => {
                self.platform = platform;
                self.frame_color = platform.base_color().to_string();
            }
            FieldUpdate::Brightness(v) => self.brightness = clamp(v, &BRIGHTNESS_RANGE),
            FieldUpdate::Contrast(v) => self.contrast = clamp(v, &CONTRAST_RANGE),
            FieldUpdate::Saturation(v) => self.saturation = clamp(v, &SATURATION_RANGE),
        }
    }
}

/// A single field replacement on the current record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Title(String),
    Image(ImageSlot, String),
    FrameColor(String),
    Platform(Platform),
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
}

fn clamp(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return 1.0_f32.clamp(*range.start(), *range.end());
    }
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_set_defaults_to_front() {
        let set = AssetSet::new("front.png", None, Some("  ".to_string()));
        assert_eq!(set.back, "front.png");
        assert_eq!(set.spine, "front.png");

        let set = AssetSet::new("f.png", Some("b.png".to_string()), Some("s.png".to_string()));
        assert_eq!(set.get(ImageSlot::Back), "b.png");
        assert_eq!(set.get(ImageSlot::Spine), "s.png");
    }

    #[test]
    fn test_defaults_from_initial() {
        let record = CustomizationRecord::from_initial(&InitialData {
            assets: Some(AssetSet::new("f.png", None, None)),
            platform: Some(Platform::Xbox),
            title: None,
        });
        assert_eq!(record.frame_color, "#107C10");
        assert_eq!(record.title, DEFAULT_TITLE);
        assert_eq!(record.back_image, "f.png");
        assert_eq!((record.brightness, record.contrast, record.saturation), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_platform_change_resets_color() {
        let mut record = CustomizationRecord::from_initial(&InitialData::default());
        record.apply(FieldUpdate::FrameColor("#123456".to_string()));
        record.apply(FieldUpdate::Platform(Platform::Playstation));
        assert_eq!(record.frame_color, "#0070D1");
    }

    #[test]
    fn test_sliders_are_clamped() {
        let mut record = CustomizationRecord::from_initial(&InitialData::default());
        record.apply(FieldUpdate::Brightness(5.0));
        record.apply(FieldUpdate::Contrast(0.1));
        record.apply(FieldUpdate::Saturation(-1.0));
        assert_eq!(record.brightness, 2.0);
        assert_eq!(record.contrast, 0.5);
        assert_eq!(record.saturation, 0.0);
    }

    #[test]
    fn test_serialized_layout_is_camel_case() {
        let record = CustomizationRecord::from_initial(&InitialData::default());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("frontImage").is_some());
        assert!(json.get("frameColor").is_some());
        assert!(json.get("lastModified").is_some());
        assert_eq!(json["platform"], "xbox");
    }
}
