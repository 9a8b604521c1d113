//! Box art texture loading
//!
//! Sources are fetched asynchronously (browser `fetch` on wasm, the filesystem
//! natively), decoded with the `image` crate, run through the
//! brightness/contrast/saturation pass, and uploaded as Bevy images. Each box
//! tracks a load generation so results for a superseded asset set are dropped.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use boxart_core::config::with_cors_proxy;
use boxart_core::image_ref::describe_source;
use boxart_core::{ImageAdjustments, ImageRef, ImageSlot, TextureSetStatus};

use crate::box_model::BoxModel;

#[derive(Error, Debug, Clone)]
pub enum TextureError {
    #[error("Invalid image source: {0}")]
    InvalidSource(String),
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
    #[error("HTTP {status}: {text}")]
    Http { status: u16, text: String },
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
    #[error("Not supported on this platform: {0}")]
    Unsupported(String),
}

/// Global texture loading options
#[derive(Resource, Debug, Clone, Default)]
pub struct TextureSettings {
    /// Prefix for remote URLs that need a CORS relay
    pub cors_proxy: Option<String>,
}

impl TextureSettings {
    pub fn resolve(&self, source: &str) -> String {
        with_cors_proxy(self.cors_proxy.as_deref(), source)
    }
}

/// A finished fetch, waiting to be decoded on the main thread
#[derive(Debug)]
pub struct FetchedImage {
    pub entity: Entity,
    pub generation: u64,
    pub slot: ImageSlot,
    pub result: Result<Vec<u8>, TextureError>,
}

/// Completed fetches from async callbacks
#[derive(Resource, Default, Clone)]
pub struct PendingTextures(pub Arc<Mutex<VecDeque<FetchedImage>>>);

impl PendingTextures {
    fn push(&self, fetched: FetchedImage) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push_back(fetched);
        }
    }
}

/// Per-box texture state
#[derive(Component, Default)]
pub struct BoxTextures {
    pub status: TextureSetStatus,
    /// Sources of the current generation (after proxy resolution)
    sources: [String; 3],
    /// Decoded, unadjusted pixels, kept so slider changes can re-derive textures
    originals: [Option<image::RgbaImage>; 3],
    handles: [Option<Handle<Image>>; 3],
    applied: ImageAdjustments,
}

fn slot_index(slot: ImageSlot) -> usize {
    match slot {
        ImageSlot::Front => 0,
        ImageSlot::Back => 1,
        ImageSlot::Spine => 2,
    }
}

impl BoxTextures {
    pub fn handle(&self, slot: ImageSlot) -> Option<&Handle<Image>> {
        self.handles[slot_index(slot)].as_ref()
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}

/// Fetch, decode and adjustment systems; box materials run after these
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureSystems;

pub struct TexturesPlugin;

impl Plugin for TexturesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingTextures>()
            .init_resource::<TextureSettings>()
            .add_systems(
                Update,
                (request_textures, receive_textures, reapply_adjustments)
                    .chain()
                    .in_set(TextureSystems),
            );
    }
}

/// Start a new load generation whenever a box's asset set changes
fn request_textures(
    mut boxes: Query<(Entity, &BoxModel, &mut BoxTextures), Changed<BoxModel>>,
    pending: Res<PendingTextures>,
    settings: Res<TextureSettings>,
) {
    for (entity, model, mut textures) in boxes.iter_mut() {
        let sources = ImageSlot::ALL.map(|slot| settings.resolve(model.assets.get(slot).trim()));
        if textures.sources == sources && textures.status.generation() != 0 {
            continue;
        }

        let has_source = sources.clone().map(|s| !s.is_empty());
        let generation = textures.status.begin(has_source);
        textures.originals = [None, None, None];
        textures.handles = [None, None, None];
        textures.sources = sources.clone();
        textures.applied = model.adjustments;

        for slot in ImageSlot::ALL {
            let source = &sources[slot_index(slot)];
            if source.is_empty() {
                continue;
            }
            tracing::debug!(
                "Loading {} art (generation {}): {}",
                slot.label(),
                generation,
                describe_source(source)
            );
            start_fetch(source, entity, generation, slot, pending.clone());
        }
    }
}

fn start_fetch(source: &str, entity: Entity, generation: u64, slot: ImageSlot, pending: PendingTextures) {
    let done = move |result: Result<Vec<u8>, TextureError>| {
        pending.push(FetchedImage {
            entity,
            generation,
            slot,
            result,
        });
    };

    match ImageRef::parse(source) {
        Ok(ImageRef::Empty) => {}
        Ok(ImageRef::Embedded { bytes, .. }) => done(Ok(bytes)),
        Ok(ImageRef::Remote(url)) => fetch::remote(url, done),
        Ok(ImageRef::Local(path)) => fetch::local(path, done),
        Err(e) => done(Err(TextureError::InvalidSource(e.to_string()))),
    }
}

/// Decode finished fetches and settle their slots
fn receive_textures(
    pending: Res<PendingTextures>,
    mut boxes: Query<&mut BoxTextures>,
    mut images: ResMut<Assets<Image>>,
) {
    let fetched: Vec<FetchedImage> = match pending.0.try_lock() {
        Ok(mut queue) => queue.drain(..).collect(),
        Err(_) => return,
    };

    for item in fetched {
        let Ok(mut textures) = boxes.get_mut(item.entity) else {
            continue;
        };
        if !textures.status.is_current(item.generation) {
            tracing::debug!(
                "Discarding stale {} art (generation {})",
                item.slot.label(),
                item.generation
            );
            continue;
        }

        let decoded = item
            .result
            .and_then(|bytes| decode_rgba(&bytes));

        match decoded {
            Ok(original) => {
                let index = slot_index(item.slot);
                let image = to_bevy_image(&original, &textures.applied);
                textures.handles[index] = Some(images.add(image));
                textures.originals[index] = Some(original);
                textures.status.finish(item.generation, item.slot, true);
            }
            Err(e) => {
                tracing::warn!("{} art unavailable, using frame color: {}", item.slot.label(), e);
                textures.status.finish(item.generation, item.slot, false);
            }
        }
    }
}

/// Re-derive textures from the kept originals when the sliders move
fn reapply_adjustments(
    mut boxes: Query<(&BoxModel, &mut BoxTextures), Changed<BoxModel>>,
    mut images: ResMut<Assets<Image>>,
) {
    for (model, mut textures) in boxes.iter_mut() {
        if textures.applied == model.adjustments {
            continue;
        }
        let adjustments = model.adjustments;
        textures.applied = adjustments;
        let textures = &mut *textures;
        for index in 0..3 {
            if let Some(original) = &textures.originals[index] {
                textures.handles[index] = Some(images.add(to_bevy_image(original, &adjustments)));
            }
        }
    }
}

pub fn decode_rgba(bytes: &[u8]) -> Result<image::RgbaImage, TextureError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| TextureError::DecodeFailed(e.to_string()))
}

fn to_bevy_image(original: &image::RgbaImage, adjustments: &ImageAdjustments) -> Image {
    let mut data = original.as_raw().clone();
    adjustments.apply_rgba8(&mut data);
    Image::new(
        Extent3d {
            width: original.width(),
            height: original.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

#[cfg(target_arch = "wasm32")]
mod fetch {
    use super::TextureError;

    /// Browser fetch; relative paths resolve against the page URL
    pub fn remote(url: String, done: impl FnOnce(Result<Vec<u8>, TextureError>) + 'static) {
        wasm_bindgen_futures::spawn_local(async move {
            let result = async {
                let resp = gloo_net::http::Request::get(&url)
                    .send()
                    .await
                    .map_err(|e| TextureError::FetchFailed(e.to_string()))?;
                if !resp.ok() {
                    return Err(TextureError::Http {
                        status: resp.status(),
                        text: resp.status_text(),
                    });
                }
                resp.binary()
                    .await
                    .map_err(|e| TextureError::FetchFailed(e.to_string()))
            }
            .await;
            done(result);
        });
    }

    pub fn local(path: String, done: impl FnOnce(Result<Vec<u8>, TextureError>) + 'static) {
        remote(path, done);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod fetch {
    use super::TextureError;

    pub fn remote(url: String, done: impl FnOnce(Result<Vec<u8>, TextureError>) + Send + 'static) {
        // Native: remote fetch not supported yet
        done(Err(TextureError::Unsupported(format!("remote image {}", url))));
    }

    /// Read happens on a background thread
    pub fn local(path: String, done: impl FnOnce(Result<Vec<u8>, TextureError>) + Send + 'static) {
        std::thread::spawn(move || {
            done(std::fs::read(&path).map_err(|e| TextureError::FetchFailed(format!("{}: {}", path, e))));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let rgba = decode_rgba(&png_bytes()).unwrap();
        assert_eq!(rgba.dimensions(), (2, 2));
        assert_eq!(rgba.get_pixel(1, 1).0, [200, 100, 50, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(decode_rgba(b"not an image"), Err(TextureError::DecodeFailed(_))));
    }

    #[test]
    fn test_bevy_image_applies_adjustments() {
        let rgba = decode_rgba(&png_bytes()).unwrap();
        let image = to_bevy_image(
            &rgba,
            &ImageAdjustments {
                saturation: 0.0,
                ..Default::default()
            },
        );
        let data = image.data.expect("image data");
        assert_eq!(data.len(), 16);
        assert_eq!(data[0], data[1]);
        assert_eq!(data[1], data[2]);
    }

    #[test]
    fn test_embedded_source_is_delivered_immediately() {
        let pending = PendingTextures::default();
        let url = boxart_core::image_ref::encode_data_url("image/png", &png_bytes());
        start_fetch(&url, Entity::PLACEHOLDER, 7, ImageSlot::Spine, pending.clone());

        let queue = pending.0.lock().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].generation, 7);
        assert!(queue[0].result.is_ok());
    }

    #[test]
    fn test_invalid_source_reports_error() {
        let pending = PendingTextures::default();
        start_fetch("data:image/png;base64", Entity::PLACEHOLDER, 1, ImageSlot::Front, pending.clone());
        let queue = pending.0.lock().unwrap();
        assert!(matches!(queue[0].result, Err(TextureError::InvalidSource(_))));
    }

    #[test]
    fn test_proxy_resolution() {
        let settings = TextureSettings {
            cors_proxy: Some("https://relay/?u=".to_string()),
        };
        assert_eq!(settings.resolve("http://a/b.png"), "https://relay/?u=http://a/b.png");
        assert_eq!(settings.resolve("b.png"), "b.png");
    }
}
