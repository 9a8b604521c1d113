//! Viewer shell - the main box, its loading placeholder, and the toolbar

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use boxart_core::AssetSet;
use boxart_scene::{spawn_box_model, BoxInstance, BoxModel, BoxTextures, OrbitSettings, Spin};

use crate::app::AppConfig;
use crate::customizer::{CustomizerClosed, CustomizerRequest};

/// The main box root
#[derive(Resource, Debug, Clone, Copy)]
pub struct ViewerBox(pub Entity);

pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_viewer_box, open_customizer_on_start))
            .add_systems(Update, on_customizer_closed)
            .add_systems(EguiPrimaryContextPass, viewer_overlay);
    }
}

fn spawn_viewer_box(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<AppConfig>,
) {
    let config = &config.0;
    let assets = config.asset_set().unwrap_or_default();
    if assets == AssetSet::default() {
        tracing::warn!("No front art configured, showing a plain box");
    }

    let entity = spawn_box_model(
        &mut commands,
        &mut meshes,
        &mut materials,
        BoxModel::new(config.platform, assets),
        BoxInstance::Viewer,
        config.auto_rotate,
    );
    commands.insert_resource(ViewerBox(entity));
}

fn open_customizer_on_start(config: Res<AppConfig>, mut request: ResMut<CustomizerRequest>) {
    if config.0.open_customizer {
        request.open = true;
        request.initial = Some(config.0.initial_data());
    }
}

fn on_customizer_closed(mut closed: MessageReader<CustomizerClosed>) {
    for _ in closed.read() {
        // Edits are not handed back; the main box keeps the configured art
        tracing::info!("Customizer closed");
    }
}

fn viewer_overlay(
    mut contexts: EguiContexts,
    viewer: Option<Res<ViewerBox>>,
    boxes: Query<(&BoxTextures, &Spin)>,
    config: Res<AppConfig>,
    mut request: ResMut<CustomizerRequest>,
    mut orbit: ResMut<OrbitSettings>,
) {
    let state = viewer.and_then(|v| boxes.get(v.0).ok());
    let loading = state.is_some_and(|(textures, _)| !textures.is_settled());
    let rotating = state.is_some_and(|(_, spin)| spin.0.auto_rotate);

    let Ok(ctx) = contexts.ctx_mut() else { return };

    // Loading placeholder until every face has loaded or failed
    if loading {
        egui::Area::new(egui::Id::new("boxart_loading"))
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading box art...");
                    });
                });
            });
    }

    egui::Area::new(egui::Id::new("boxart_toolbar"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Customize").clicked() && !request.open {
                        request.open = true;
                        request.initial = Some(config.0.initial_data());
                    }
                    if ui.button("Reset view").clicked() {
                        orbit.reset_view();
                    }
                });
                ui.small(if rotating {
                    "Click the box to stop rotation"
                } else {
                    "Click the box to resume rotation"
                });
            });
        });
}
