//! Customizer panel - tabbed modal over the customization store
//!
//! UI code only collects [`CustomizerAction`]s; they are applied to the store
//! after the frame's widgets are drawn so no widget holds a borrow of it.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass, EguiTextureHandle};

use boxart_core::color::{parse_hex, to_hex, COLOR_PRESETS};
use boxart_core::image_ref::{describe_source, guess_mime};
use boxart_core::record::{BRIGHTNESS_RANGE, CONTRAST_RANGE, SATURATION_RANGE, SLIDER_STEP};
use boxart_core::{
    CustomizationRecord, CustomizationStore, FieldUpdate, ImageAdjustments, ImageSlot,
    InitialData, Platform, RecordRepository, SaveOutcome, SpinState,
};
use boxart_scene::{
    spawn_box_model, BoxInstance, BoxModel, BoxTextures, PreviewActive, PreviewTarget, Spin,
};

use crate::file_picker::{
    export_filename, trigger_file_open, trigger_file_save, FileFilter, FileOperation,
    FilePickerContext, FilePickerState, PendingFileResults,
};

/// Store behind the customizer
#[derive(Resource)]
pub struct CustomizerStore(pub CustomizationStore<Box<dyn RecordRepository>>);

impl CustomizerStore {
    pub fn new(repository: Box<dyn RecordRepository>, initial: InitialData) -> Self {
        Self(CustomizationStore::new(repository, initial))
    }
}

/// Open request for the customizer. `initial`, when set, starts a fresh
/// session from that data on open; otherwise the previous session continues.
#[derive(Resource, Debug, Clone, Default)]
pub struct CustomizerRequest {
    pub open: bool,
    pub initial: Option<InitialData>,
}

/// Written when the customizer is closed. Carries no edited result.
#[derive(Message, Debug, Clone, Copy)]
pub struct CustomizerClosed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomizerTab {
    #[default]
    Settings,
    Images,
    Colors,
    Saved,
}

/// User-facing result of the last action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Panel state that is not part of the record
#[derive(Resource, Default)]
pub struct CustomizerUi {
    pub tab: CustomizerTab,
    pub status: Option<StatusMessage>,
    /// URL fields on the Images tab, applied on demand
    pub url_inputs: [String; 3],
    pub saved: Vec<CustomizationRecord>,
    pub saved_error: Option<String>,
    was_open: bool,
    preview_texture: Option<egui::TextureId>,
}

/// The preview box root
#[derive(Resource, Debug, Clone, Copy)]
pub struct PreviewBox(pub Entity);

/// Everything the panel can ask for
#[derive(Debug, Clone, PartialEq)]
pub enum CustomizerAction {
    Update(FieldUpdate),
    Reset,
    Save,
    Load(String),
    Delete(String),
    Upload(ImageSlot),
    Export,
    Close,
}

pub struct CustomizerPlugin;

impl Plugin for CustomizerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CustomizerRequest>()
            .init_resource::<CustomizerUi>()
            .add_message::<CustomizerClosed>()
            .add_systems(Startup, spawn_preview_box)
            .add_systems(Update, (handle_file_results, sync_preview_model).chain())
            .add_systems(EguiPrimaryContextPass, customizer_ui);
    }
}

/// Model the preview box should show for a record
pub fn preview_model(record: &CustomizationRecord) -> BoxModel {
    BoxModel {
        platform: record.platform,
        frame_color: record.frame_color.clone(),
        assets: record.assets(),
        adjustments: ImageAdjustments::from(record),
    }
}

fn spawn_preview_box(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    store: Res<CustomizerStore>,
) {
    let entity = spawn_box_model(
        &mut commands,
        &mut meshes,
        &mut materials,
        preview_model(store.0.current()),
        BoxInstance::Preview,
        true,
    );
    commands.insert_resource(PreviewBox(entity));
}

fn sync_preview_model(
    store: Res<CustomizerStore>,
    preview: Option<Res<PreviewBox>>,
    mut models: Query<&mut BoxModel>,
) {
    if !store.is_changed() {
        return;
    }
    let Some(preview) = preview else {
        return;
    };
    let Ok(mut model) = models.get_mut(preview.0) else {
        return;
    };
    let wanted = preview_model(store.0.current());
    if *model != wanted {
        *model = wanted;
    }
}

/// Route finished uploads into the store
fn handle_file_results(
    mut picker: ResMut<FilePickerState>,
    mut store: ResMut<CustomizerStore>,
    mut ui_state: ResMut<CustomizerUi>,
) {
    while let Some(result) = picker.take_result() {
        let status = match (&result.context, result.operation) {
            (FilePickerContext::ImageUpload(slot), FileOperation::Open) => {
                match (&result.error, &result.content) {
                    (None, Some(bytes)) => {
                        let mime = result
                            .mime
                            .clone()
                            .unwrap_or_else(|| guess_mime(&result.filename).to_string());
                        store.0.upload_image(*slot, &mime, bytes);
                        StatusMessage::info(format!("{} art set from {}", slot.label(), result.filename))
                    }
                    (Some(e), _) => StatusMessage::error(format!("Upload failed: {}", e)),
                    (None, None) => StatusMessage::error("Upload failed: empty file"),
                }
            }
            (FilePickerContext::RecordExport, _) => match &result.error {
                None => StatusMessage::info(format!("Exported {}", result.filename)),
                Some(e) => StatusMessage::error(format!("Export failed: {}", e)),
            },
            (context, operation) => {
                tracing::debug!("Ignoring {:?} result for {:?}", operation, context);
                continue;
            }
        };
        ui_state.status = Some(status);
    }
}

/// Apply a store action. Returns the message to show, if any.
pub fn perform<R: RecordRepository>(
    store: &mut CustomizationStore<R>,
    action: CustomizerAction,
) -> Option<StatusMessage> {
    match action {
        CustomizerAction::Update(update) => {
            store.update(update);
            None
        }
        CustomizerAction::Reset => {
            store.reset();
            Some(StatusMessage::info("Reset to defaults"))
        }
        CustomizerAction::Save => {
            let title = store.current().title.clone();
            Some(match store.save() {
                Ok(SaveOutcome::Created) => StatusMessage::info(format!("Saved \"{}\"", title)),
                Ok(SaveOutcome::Replaced) => StatusMessage::info(format!("Updated \"{}\"", title)),
                Err(e) => StatusMessage::error(format!("Could not save \"{}\": {}", title, e)),
            })
        }
        CustomizerAction::Load(title) => Some(match store.load(&title) {
            Ok(true) => StatusMessage::info(format!("Loaded \"{}\"", title)),
            Ok(false) => StatusMessage::error(format!("\"{}\" is no longer saved", title)),
            Err(e) => StatusMessage::error(format!("Could not load \"{}\": {}", title, e)),
        }),
        CustomizerAction::Delete(title) => Some(match store.delete(&title) {
            Ok(true) => StatusMessage::info(format!("Deleted \"{}\"", title)),
            Ok(false) => StatusMessage::error(format!("\"{}\" was already deleted", title)),
            Err(e) => StatusMessage::error(format!("Could not delete \"{}\": {}", title, e)),
        }),
        CustomizerAction::Upload(_) | CustomizerAction::Export | CustomizerAction::Close => None,
    }
}

fn refresh_saved<R: RecordRepository>(store: &CustomizationStore<R>, ui_state: &mut CustomizerUi) {
    match store.saved() {
        Ok(saved) => {
            ui_state.saved = saved;
            ui_state.saved_error = None;
        }
        Err(e) => {
            ui_state.saved.clear();
            ui_state.saved_error = Some(e.to_string());
        }
    }
}

/// Pointer interaction on the preview image drives the preview box like a
/// click or hover on the main box does
fn drive_preview_spin(spin: &mut SpinState, hovered: bool, clicked: bool) {
    spin.set_hovered(hovered);
    if clicked {
        spin.toggle();
    }
}

fn customizer_ui(
    mut contexts: EguiContexts,
    mut store: ResMut<CustomizerStore>,
    mut request: ResMut<CustomizerRequest>,
    mut ui_state: ResMut<CustomizerUi>,
    mut preview_active: ResMut<PreviewActive>,
    preview_target: Option<Res<PreviewTarget>>,
    preview_box: Option<Res<PreviewBox>>,
    mut previews: Query<(&BoxTextures, &mut Spin)>,
    pending_files: Res<PendingFileResults>,
    mut closed: MessageWriter<CustomizerClosed>,
) {
    if !request.open {
        if preview_active.0 {
            preview_active.0 = false;
        }
        ui_state.was_open = false;
        return;
    }

    if !ui_state.was_open {
        ui_state.was_open = true;
        if let Some(initial) = request.initial.take() {
            store.0.begin_session(initial);
        }
        ui_state.status = None;
        refresh_saved(&store.0, &mut ui_state);
        preview_active.0 = true;
        tracing::debug!("Customizer opened for '{}'", store.0.current().title);
    }

    if ui_state.preview_texture.is_none() {
        if let Some(target) = &preview_target {
            ui_state.preview_texture =
                Some(contexts.add_image(EguiTextureHandle::Strong(target.image.clone())));
        }
    }
    let preview_entity = preview_box.map(|b| b.0);
    let preview_loading = preview_entity
        .and_then(|e| previews.get(e).ok())
        .is_some_and(|(t, _)| !t.is_settled());

    let Ok(ctx) = contexts.ctx_mut() else { return };

    let record = store.0.current().clone();
    let mut actions: Vec<CustomizerAction> = Vec::new();
    let panel = &mut *ui_state;
    let mut preview_hovered = false;
    let mut preview_clicked = false;

    let modal = egui::Modal::new(egui::Id::new("boxart_customizer")).show(ctx, |ui| {
        ui.set_width(420.0);
        ui.horizontal(|ui| {
            ui.heading("Customize Box Art");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").clicked() {
                    actions.push(CustomizerAction::Close);
                }
            });
        });
        ui.separator();

        // Live preview
        ui.vertical_centered(|ui| {
            if let Some(texture) = panel.preview_texture {
                let response = ui.add(
                    egui::Image::new(egui::load::SizedTexture::new(texture, egui::vec2(260.0, 260.0)))
                        .sense(egui::Sense::click()),
                );
                preview_hovered = response.hovered();
                preview_clicked = response.clicked();
            }
            if preview_loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading preview...");
                });
            }
        });
        ui.separator();

        ui.horizontal(|ui| {
            ui.selectable_value(&mut panel.tab, CustomizerTab::Settings, "Settings");
            ui.selectable_value(&mut panel.tab, CustomizerTab::Images, "Images");
            ui.selectable_value(&mut panel.tab, CustomizerTab::Colors, "Colors");
            ui.selectable_value(&mut panel.tab, CustomizerTab::Saved, "Saved");
        });
        ui.separator();

        match panel.tab {
            CustomizerTab::Settings => settings_tab(ui, &record, &mut actions),
            CustomizerTab::Images => images_tab(ui, &record, &mut panel.url_inputs, &mut actions),
            CustomizerTab::Colors => colors_tab(ui, &record, &mut actions),
            CustomizerTab::Saved => saved_tab(ui, &panel.saved, panel.saved_error.as_deref(), &mut actions),
        }

        if let Some(status) = &panel.status {
            ui.separator();
            let color = if status.is_error {
                egui::Color32::from_rgb(230, 90, 90)
            } else {
                egui::Color32::from_rgb(120, 200, 120)
            };
            ui.colored_label(color, &status.text);
        }
    });

    if let Some(mut spin) = preview_entity.and_then(|e| previews.get_mut(e).ok()).map(|(_, s)| s) {
        drive_preview_spin(&mut spin.0, preview_hovered, preview_clicked);
    }

    // Escape or a click outside the modal
    if modal.should_close() && !actions.contains(&CustomizerAction::Close) {
        actions.push(CustomizerAction::Close);
    }

    for action in actions {
        match action {
            CustomizerAction::Upload(slot) => {
                trigger_file_open(
                    &pending_files,
                    FilePickerContext::ImageUpload(slot),
                    FileFilter::images(),
                );
            }
            CustomizerAction::Export => match store.0.export_current() {
                Ok(json) => {
                    trigger_file_save(
                        &pending_files,
                        FilePickerContext::RecordExport,
                        &export_filename(&store.0.current().title),
                        json.as_bytes(),
                        "application/json",
                    );
                }
                Err(e) => ui_state.status = Some(StatusMessage::error(format!("Export failed: {}", e))),
            },
            CustomizerAction::Close => {
                request.open = false;
                preview_active.0 = false;
                ui_state.was_open = false;
                closed.write(CustomizerClosed);
                tracing::debug!("Customizer closed");
                break;
            }
            action => {
                let refresh = matches!(action, CustomizerAction::Save | CustomizerAction::Delete(_));
                if let Some(status) = perform(&mut store.0, action) {
                    ui_state.status = Some(status);
                }
                if refresh {
                    refresh_saved(&store.0, &mut ui_state);
                }
            }
        }
    }
}

fn settings_tab(ui: &mut egui::Ui, record: &CustomizationRecord, actions: &mut Vec<CustomizerAction>) {
    let mut title = record.title.clone();
    ui.horizontal(|ui| {
        ui.label("Title");
        if ui.text_edit_singleline(&mut title).changed() {
            actions.push(CustomizerAction::Update(FieldUpdate::Title(title.clone())));
        }
    });

    let mut platform = record.platform;
    egui::ComboBox::from_label("Platform")
        .selected_text(platform.label())
        .show_ui(ui, |ui| {
            for option in Platform::ALL {
                ui.selectable_value(&mut platform, option, option.label());
            }
        });
    if platform != record.platform {
        actions.push(CustomizerAction::Update(FieldUpdate::Platform(platform)));
    }

    ui.add_space(6.0);
    let mut brightness = record.brightness;
    if ui
        .add(egui::Slider::new(&mut brightness, BRIGHTNESS_RANGE).step_by(SLIDER_STEP).text("Brightness"))
        .changed()
    {
        actions.push(CustomizerAction::Update(FieldUpdate::Brightness(brightness)));
    }
    let mut contrast = record.contrast;
    if ui
        .add(egui::Slider::new(&mut contrast, CONTRAST_RANGE).step_by(SLIDER_STEP).text("Contrast"))
        .changed()
    {
        actions.push(CustomizerAction::Update(FieldUpdate::Contrast(contrast)));
    }
    let mut saturation = record.saturation;
    if ui
        .add(egui::Slider::new(&mut saturation, SATURATION_RANGE).step_by(SLIDER_STEP).text("Saturation"))
        .changed()
    {
        actions.push(CustomizerAction::Update(FieldUpdate::Saturation(saturation)));
    }

    ui.add_space(6.0);
    if ui.button("Reset to defaults").clicked() {
        actions.push(CustomizerAction::Reset);
    }
}

fn images_tab(
    ui: &mut egui::Ui,
    record: &CustomizationRecord,
    url_inputs: &mut [String; 3],
    actions: &mut Vec<CustomizerAction>,
) {
    for (slot, input) in ImageSlot::ALL.into_iter().zip(url_inputs.iter_mut()) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.strong(slot.label());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Upload...").clicked() {
                        actions.push(CustomizerAction::Upload(slot));
                    }
                });
            });
            let current = record.image(slot);
            ui.label(if current.is_empty() {
                "No image".to_string()
            } else {
                describe_source(current)
            });
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(input).hint_text("https://...").desired_width(300.0));
                if ui.button("Use URL").clicked() && !input.trim().is_empty() {
                    actions.push(CustomizerAction::Update(FieldUpdate::Image(slot, input.trim().to_string())));
                }
            });
        });
    }
}

fn colors_tab(ui: &mut egui::Ui, record: &CustomizationRecord, actions: &mut Vec<CustomizerAction>) {
    let mut hex = record.frame_color.clone();
    ui.horizontal(|ui| {
        ui.label("Frame color");
        if ui.add(egui::TextEdit::singleline(&mut hex).desired_width(90.0)).changed() {
            actions.push(CustomizerAction::Update(FieldUpdate::FrameColor(hex.clone())));
        }

        let mut rgb = parse_hex(&record.frame_color)
            .or_else(|| parse_hex(record.platform.base_color()))
            .unwrap_or([255, 255, 255]);
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            actions.push(CustomizerAction::Update(FieldUpdate::FrameColor(to_hex(rgb))));
        }
    });

    ui.add_space(6.0);
    ui.label("Presets");
    egui::Grid::new("color_presets").num_columns(2).show(ui, |ui| {
        for (i, preset) in COLOR_PRESETS.iter().enumerate() {
            let [r, g, b] = parse_hex(preset.hex).unwrap_or([0, 0, 0]);
            let fill = egui::Color32::from_rgb(r, g, b);
            // Dark text on light swatches
            let luma = 0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32;
            let text_color = if luma > 140.0 {
                egui::Color32::BLACK
            } else {
                egui::Color32::WHITE
            };
            let button = egui::Button::new(egui::RichText::new(preset.name).color(text_color))
                .fill(fill)
                .min_size(egui::vec2(180.0, 24.0));
            if ui.add(button).clicked() {
                actions.push(CustomizerAction::Update(FieldUpdate::FrameColor(preset.hex.to_string())));
            }
            if i % 2 == 1 {
                ui.end_row();
            }
        }
    });
}

fn saved_tab(
    ui: &mut egui::Ui,
    saved: &[CustomizationRecord],
    error: Option<&str>,
    actions: &mut Vec<CustomizerAction>,
) {
    ui.horizontal(|ui| {
        if ui.button("Save current").clicked() {
            actions.push(CustomizerAction::Save);
        }
        if ui.button("Export JSON").clicked() {
            actions.push(CustomizerAction::Export);
        }
    });
    ui.separator();

    if let Some(error) = error {
        ui.colored_label(egui::Color32::from_rgb(230, 90, 90), format!("Saved designs unavailable: {}", error));
        return;
    }
    if saved.is_empty() {
        ui.label("No saved designs yet");
        return;
    }

    egui::ScrollArea::vertical().max_height(180.0).show(ui, |ui| {
        for record in saved {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.strong(&record.title);
                    ui.small(format!(
                        "{} · {}",
                        record.platform.label(),
                        record.last_modified.format("%Y-%m-%d %H:%M")
                    ));
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Delete").clicked() {
                        actions.push(CustomizerAction::Delete(record.title.clone()));
                    }
                    if ui.button("Load").clicked() {
                        actions.push(CustomizerAction::Load(record.title.clone()));
                    }
                });
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxart_core::{AssetSet, JsonRecordRepository, KeyValueStorage, MemoryStorage, StoreError};

    fn memory_store() -> CustomizationStore<JsonRecordRepository<MemoryStorage>> {
        let initial = InitialData {
            assets: Some(AssetSet::new("front.png", None, None)),
            platform: Some(Platform::Xbox),
            title: None,
        };
        CustomizationStore::new(JsonRecordRepository::new(MemoryStorage::new(), "k"), initial)
    }

    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_save_status_reflects_outcome() {
        let mut store = memory_store();
        let first = perform(&mut store, CustomizerAction::Save).unwrap();
        assert!(!first.is_error);
        assert!(first.text.starts_with("Saved"));

        let second = perform(&mut store, CustomizerAction::Save).unwrap();
        assert!(second.text.starts_with("Updated"));

        let mut failing = CustomizationStore::new(
            JsonRecordRepository::new(ReadOnlyStorage, "k"),
            InitialData::default(),
        );
        let failed = perform(&mut failing, CustomizerAction::Save).unwrap();
        assert!(failed.is_error);
        assert!(failed.text.contains("quota exceeded"));
    }

    #[test]
    fn test_load_and_delete_missing_are_errors() {
        let mut store = memory_store();
        assert!(perform(&mut store, CustomizerAction::Load("nope".into())).unwrap().is_error);
        assert!(perform(&mut store, CustomizerAction::Delete("nope".into())).unwrap().is_error);
    }

    #[test]
    fn test_update_has_no_status() {
        let mut store = memory_store();
        let status = perform(
            &mut store,
            CustomizerAction::Update(FieldUpdate::FrameColor("#FFD700".into())),
        );
        assert!(status.is_none());
        assert_eq!(store.current().frame_color, "#FFD700");
    }

    #[test]
    fn test_preview_model_follows_record() {
        let mut store = memory_store();
        store.update(FieldUpdate::Platform(Platform::Playstation));
        store.update(FieldUpdate::Saturation(0.0));

        let model = preview_model(store.current());
        assert_eq!(model.platform, Platform::Playstation);
        assert_eq!(model.frame_color, "#0070D1");
        assert_eq!(model.assets.front, "front.png");
        assert_eq!(model.assets.spine, "front.png");
        assert_eq!(model.adjustments.saturation, 0.0);
    }

    #[test]
    fn test_preview_click_toggles_once_and_hover_scales() {
        let mut spin = SpinState::new(true);

        // Hovering while spinning keeps normal size
        drive_preview_spin(&mut spin, true, false);
        assert_eq!(spin.target_scale(), 1.0);

        drive_preview_spin(&mut spin, true, true);
        assert!(!spin.auto_rotate);
        assert!(spin.target_scale() > 1.0);

        // Later frames without a click leave rotation alone
        drive_preview_spin(&mut spin, true, false);
        assert!(!spin.auto_rotate);

        drive_preview_spin(&mut spin, false, false);
        assert_eq!(spin.target_scale(), 1.0);

        drive_preview_spin(&mut spin, true, true);
        assert!(spin.auto_rotate);
    }
}
