//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};

use boxart_core::{RecordRepository, ViewerConfig};
use boxart_scene::{BoxArtScenePlugin, TextureSettings};

use crate::customizer::{CustomizerPlugin, CustomizerStore};
use crate::file_picker::FilePickerPlugin;
use crate::viewer::ViewerPlugin;

/// Startup configuration, kept around for the viewer and customizer
#[derive(Debug, Clone, Resource)]
pub struct AppConfig(pub ViewerConfig);

/// Run the Bevy application
pub fn run(config: ViewerConfig, repository: Box<dyn RecordRepository>) {
    tracing::info!(
        platform = %config.platform,
        front = config.front.is_some(),
        "Starting box art viewer"
    );

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "BoxArt - Game Box Viewer".to_string(),
                        canvas: Some("#boxart-canvas".to_string()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    // Don't look for .meta files - static hosting doesn't have them
                    meta_check: bevy::asset::AssetMetaCheck::Never,
                    ..default()
                }),
        )
        // Picking must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .insert_resource(TextureSettings {
            cors_proxy: config.cors_proxy.clone(),
        })
        .add_plugins(BoxArtScenePlugin)
        .add_plugins(FilePickerPlugin)
        .add_plugins(ViewerPlugin)
        .insert_resource(CustomizerStore::new(repository, config.initial_data()))
        .add_plugins(CustomizerPlugin)
        .insert_resource(AppConfig(config))
        .run();
}
