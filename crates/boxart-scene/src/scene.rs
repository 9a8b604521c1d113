//! Scene setup - camera and the static lighting rig

use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;
use bevy_egui::{EguiGlobalSettings, PrimaryEguiContext};

use crate::camera::{MainCamera, OrbitSettings};
use crate::preview::PREVIEW_LAYER;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.09, 0.09, 0.12)))
            .insert_resource(AmbientLight {
                color: Color::WHITE,
                brightness: 400.0,
                ..default()
            })
            .add_systems(Startup, setup_scene);
    }
}

/// Layers lit by the rig: the main view and the customizer preview
pub fn lit_layers() -> RenderLayers {
    RenderLayers::from_layers(&[0, PREVIEW_LAYER])
}

fn setup_scene(
    mut commands: Commands,
    orbit: Res<OrbitSettings>,
    mut egui_global_settings: ResMut<EguiGlobalSettings>,
) {
    // The preview camera must never own the UI; bind egui to the main view
    egui_global_settings.auto_create_primary_context = false;

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            ..default()
        }),
        Transform::from_translation(orbit.eye()).looking_at(orbit.target, Vec3::Y),
        MainCamera,
        PrimaryEguiContext,
    ));

    // Key light, upper right front
    commands.spawn((
        DirectionalLight {
            illuminance: 6000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(4.0, 6.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        lit_layers(),
    ));

    // Fill light from the opposite side so the back cover is readable
    commands.spawn((
        DirectionalLight {
            illuminance: 2500.0,
            shadows_enabled: false,
            color: Color::srgb(0.95, 0.97, 1.0),
            ..default()
        },
        Transform::from_xyz(-5.0, 2.0, -4.0).looking_at(Vec3::ZERO, Vec3::Y),
        lit_layers(),
    ));
}
