//! BoxArt Scene - 3D rendering of game box art
//!
//! Camera, lighting, texture loading and the box model itself. Used by the
//! web/native front end (boxart-web) for both the main viewer and the
//! customizer's offscreen preview.

pub mod box_model;
pub mod camera;
pub mod preview;
pub mod scene;
pub mod textures;

use bevy::prelude::*;

/// Plugin that sets up the box art scene
pub struct BoxArtScenePlugin;

impl Plugin for BoxArtScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(preview::PreviewPlugin)
            .add_plugins(textures::TexturesPlugin)
            .add_plugins(box_model::BoxModelPlugin);
    }
}

// Re-export commonly used types
pub use box_model::{spawn_box_model, BoxInstance, BoxModel, Spin};
pub use camera::{MainCamera, OrbitSettings};
pub use preview::{PreviewActive, PreviewTarget};
pub use textures::{BoxTextures, TextureError, TextureSettings};
