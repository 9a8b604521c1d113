//! Offscreen render target for the customizer's live preview box
//!
//! The preview box lives on its own render layer and is drawn by a second
//! camera into an image that the UI shows inside the customizer window.

use bevy::asset::RenderAssetUsages;
use bevy::camera::visibility::RenderLayers;
use bevy::camera::RenderTarget;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages};

pub const PREVIEW_LAYER: usize = 1;
pub const PREVIEW_SIZE: u32 = 512;

/// Image the preview camera renders into
#[derive(Resource, Debug, Clone)]
pub struct PreviewTarget {
    pub image: Handle<Image>,
    pub size: UVec2,
}

/// Marker component for the preview camera
#[derive(Component)]
pub struct PreviewCamera;

/// Whether the preview camera should render this frame
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewActive(pub bool);

pub struct PreviewPlugin;

impl Plugin for PreviewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PreviewActive>()
            .add_systems(Startup, setup_preview)
            .add_systems(Update, toggle_preview_camera);
    }
}

pub fn preview_layers() -> RenderLayers {
    RenderLayers::layer(PREVIEW_LAYER)
}

fn setup_preview(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let size = Extent3d {
        width: PREVIEW_SIZE,
        height: PREVIEW_SIZE,
        depth_or_array_layers: 1,
    };
    let mut image = Image::new_fill(
        size,
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Bgra8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.texture_descriptor.usage =
        TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST | TextureUsages::RENDER_ATTACHMENT;
    let handle = images.add(image);

    commands.spawn((
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(handle.clone().into()),
            order: -1,
            is_active: false,
            clear_color: ClearColorConfig::Custom(Color::srgb(0.12, 0.12, 0.16)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 4.2).looking_at(Vec3::ZERO, Vec3::Y),
        preview_layers(),
        PreviewCamera,
    ));

    commands.insert_resource(PreviewTarget {
        image: handle,
        size: UVec2::splat(PREVIEW_SIZE),
    });
}

fn toggle_preview_camera(
    active: Res<PreviewActive>,
    mut cameras: Query<&mut Camera, With<PreviewCamera>>,
) {
    if !active.is_changed() {
        return;
    }
    for mut camera in cameras.iter_mut() {
        camera.is_active = active.0;
    }
}
