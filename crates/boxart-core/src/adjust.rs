//! Brightness/contrast/saturation pass over RGBA8 pixel data
//!
//! Same model as CSS filters: brightness scales, contrast pivots around mid
//! gray, saturation mixes with Rec. 709 luma. Alpha is left untouched.

use crate::record::CustomizationRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageAdjustments {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}

impl From<&CustomizationRecord> for ImageAdjustments {
    fn from(record: &CustomizationRecord) -> Self {
        Self {
            brightness: record.brightness,
            contrast: record.contrast,
            saturation: record.saturation,
        }
    }
}

impl ImageAdjustments {
    pub fn is_identity(&self) -> bool {
        const EPS: f32 = 1e-4;
        (self.brightness - 1.0).abs() < EPS
            && (self.contrast - 1.0).abs() < EPS
            && (self.saturation - 1.0).abs() < EPS
    }

    /// Adjust tightly packed RGBA8 pixels in place
    pub fn apply_rgba8(&self, pixels: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        for px in pixels.chunks_exact_mut(4) {
            let mut rgb = [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            ];
            for c in rgb.iter_mut() {
                *c *= self.brightness;
                *c = (*c - 0.5) * self.contrast + 0.5;
            }
            let luma = 0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2];
            for (i, c) in rgb.iter().enumerate() {
                let v = luma + (c - luma) * self.saturation;
                px[i] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }
    }
}
