//! Box model - six textured quads under one root, plus spin and hover
//!
//! Each face is a unit quad scaled to the platform's dimensions and given its
//! own material, so the face layout comes from [`BoxFace`] and the material
//! from the face's resolved texture status.

use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;
use bevy_picking::events::{Click, Out, Over, Pointer};
use bevy_picking::pointer::PointerButton;
use bevy_picking::Pickable;
use std::f32::consts::{FRAC_PI_2, PI};

use boxart_core::animation::ease_towards;
use boxart_core::color::parse_hex;
use boxart_core::{AssetSet, BoxFace, ImageAdjustments, Platform, ResolvedFace, SpinState};

use crate::camera::OrbitSettings;
use crate::preview::preview_layers;
use crate::textures::{BoxTextures, TextureSystems};

/// How fast the hover scale settles (1/s)
const SCALE_EASE_RATE: f32 = 12.0;

/// Everything needed to draw one box
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub platform: Platform,
    /// `#RRGGBB`; falls back to the platform's base color when unparsable
    pub frame_color: String,
    pub assets: AssetSet,
    pub adjustments: ImageAdjustments,
}

impl BoxModel {
    pub fn new(platform: Platform, assets: AssetSet) -> Self {
        Self {
            platform,
            frame_color: platform.base_color().to_string(),
            assets,
            adjustments: ImageAdjustments::default(),
        }
    }

    pub fn frame_rgb(&self) -> [u8; 3] {
        parse_hex(&self.frame_color)
            .or_else(|| parse_hex(self.platform.base_color()))
            .unwrap_or([255, 255, 255])
    }
}

/// Which view a box belongs to
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxInstance {
    /// The main, interactive box
    Viewer,
    /// The customizer's offscreen preview
    Preview,
}

impl BoxInstance {
    pub fn render_layers(&self) -> RenderLayers {
        match self {
            BoxInstance::Viewer => RenderLayers::layer(0),
            BoxInstance::Preview => preview_layers(),
        }
    }
}

/// One face quad; `owner` is the box root
#[derive(Component, Debug, Clone, Copy)]
pub struct BoxFaceEntity {
    pub face: BoxFace,
    pub owner: Entity,
}

/// Spin and hover state of a box root
#[derive(Component, Debug, Clone, Default)]
pub struct Spin(pub SpinState);

pub struct BoxModelPlugin;

impl Plugin for BoxModelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                sync_geometry,
                sync_materials,
                reveal_when_settled,
                animate_boxes,
            )
                .after(TextureSystems),
        );
    }
}

/// Spawn a box root with its six faces; it stays hidden until its textures settle
pub fn spawn_box_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    model: BoxModel,
    instance: BoxInstance,
    auto_rotate: bool,
) -> Entity {
    let layers = instance.render_layers();
    let cfg = model.platform.config();
    let (width, height, depth) = (cfg.width, cfg.height, cfg.depth);
    let quad = meshes.add(Rectangle::new(1.0, 1.0));

    let root = commands
        .spawn((
            Transform::default(),
            Visibility::Hidden,
            model,
            instance,
            BoxTextures::default(),
            Spin(SpinState::new(auto_rotate)),
            layers.clone(),
        ))
        .id();

    for face in BoxFace::ALL {
        let material = materials.add(StandardMaterial::default());
        let mut entity = commands.spawn((
            Mesh3d(quad.clone()),
            MeshMaterial3d(material),
            face_transform(face, width, height, depth),
            BoxFaceEntity { face, owner: root },
            layers.clone(),
            ChildOf(root),
        ));
        match instance {
            BoxInstance::Viewer => {
                entity
                    .observe(on_face_click)
                    .observe(on_face_over)
                    .observe(on_face_out);
            }
            BoxInstance::Preview => {
                entity.insert(Pickable::IGNORE);
            }
        }
    }

    tracing::debug!("Spawned {:?} box for {}", instance, cfg.platform.label());
    root
}

/// Placement of a unit quad (XY plane, facing +Z) as the given face
pub fn face_transform(face: BoxFace, width: f32, height: f32, depth: f32) -> Transform {
    let rotation = match face {
        BoxFace::Front => Quat::IDENTITY,
        BoxFace::Back => Quat::from_rotation_y(PI),
        BoxFace::Right => Quat::from_rotation_y(FRAC_PI_2),
        BoxFace::Left => Quat::from_rotation_y(-FRAC_PI_2),
        BoxFace::Top => Quat::from_rotation_x(-FRAC_PI_2),
        BoxFace::Bottom => Quat::from_rotation_x(FRAC_PI_2),
    };
    let [u, v] = face.extent(width, height, depth);
    Transform {
        translation: Vec3::from_array(face.offset(width, height, depth)),
        rotation,
        scale: Vec3::new(u, v, 1.0),
    }
}

fn on_face_click(
    click: On<Pointer<Click>>,
    faces: Query<&BoxFaceEntity>,
    mut spins: Query<&mut Spin>,
    orbit: Res<OrbitSettings>,
) {
    // A drag that ends over the box is an orbit, not a click
    if click.event.button != PointerButton::Primary || !orbit.is_click() {
        return;
    }
    let Ok(face) = faces.get(click.entity) else {
        return;
    };
    if let Ok(mut spin) = spins.get_mut(face.owner) {
        spin.0.toggle();
        tracing::debug!("Auto-rotate {}", if spin.0.auto_rotate { "on" } else { "off" });
    }
}

fn on_face_over(over: On<Pointer<Over>>, faces: Query<&BoxFaceEntity>, mut spins: Query<&mut Spin>) {
    if let Ok(face) = faces.get(over.entity) {
        if let Ok(mut spin) = spins.get_mut(face.owner) {
            spin.0.set_hovered(true);
        }
    }
}

fn on_face_out(out: On<Pointer<Out>>, faces: Query<&BoxFaceEntity>, mut spins: Query<&mut Spin>) {
    if let Ok(face) = faces.get(out.entity) {
        if let Ok(mut spin) = spins.get_mut(face.owner) {
            spin.0.set_hovered(false);
        }
    }
}

/// Resize faces when the platform changes
fn sync_geometry(
    boxes: Query<(Entity, &BoxModel), Changed<BoxModel>>,
    mut faces: Query<(&BoxFaceEntity, &mut Transform)>,
) {
    for (root, model) in boxes.iter() {
        let cfg = model.platform.config();
        for (face, mut transform) in faces.iter_mut() {
            if face.owner != root {
                continue;
            }
            let target = face_transform(face.face, cfg.width, cfg.height, cfg.depth);
            if *transform != target {
                *transform = target;
            }
        }
    }
}

/// Rebuild face materials from the model and the loaded textures
fn sync_materials(
    boxes: Query<(Entity, &BoxModel, &BoxTextures), Or<(Changed<BoxModel>, Changed<BoxTextures>)>>,
    faces: Query<(&BoxFaceEntity, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (root, model, textures) in boxes.iter() {
        let cfg = model.platform.config();
        let [r, g, b] = model.frame_rgb();
        let frame_alpha = 1.0 - cfg.transparency.clamp(0.0, 1.0);

        for (face, handle) in faces.iter() {
            if face.owner != root {
                continue;
            }
            let Some(material) = materials.get_mut(&handle.0) else {
                continue;
            };

            let texture = match face.face.resolve(&textures.status) {
                ResolvedFace::Textured(slot) => textures.handle(slot).cloned(),
                ResolvedFace::Flat => None,
            };

            match texture {
                Some(image) => {
                    material.base_color = Color::WHITE;
                    material.base_color_texture = Some(image);
                    material.metallic = 0.0;
                    material.perceptual_roughness = 0.6;
                    material.alpha_mode = AlphaMode::Opaque;
                }
                None => {
                    material.base_color = Color::srgba_u8(r, g, b, (frame_alpha * 255.0).round() as u8);
                    material.base_color_texture = None;
                    material.metallic = cfg.metalness;
                    material.perceptual_roughness = cfg.roughness;
                    material.alpha_mode = if frame_alpha < 1.0 {
                        AlphaMode::Blend
                    } else {
                        AlphaMode::Opaque
                    };
                }
            }
        }
    }
}

fn reveal_when_settled(mut boxes: Query<(&BoxTextures, &mut Visibility), Changed<BoxTextures>>) {
    for (textures, mut visibility) in boxes.iter_mut() {
        let wanted = if textures.is_settled() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}

fn animate_boxes(mut boxes: Query<(&mut Transform, &mut Spin), With<BoxModel>>, time: Res<Time>) {
    let dt = time.delta_secs();
    for (mut transform, mut spin) in boxes.iter_mut() {
        let o = spin.0.advance(dt);
        transform.rotation = Quat::from_euler(EulerRot::XYZ, o.pitch, o.yaw, o.roll);

        let target = spin.0.target_scale();
        let scale = ease_towards(transform.scale.x, target, SCALE_EASE_RATE, dt);
        transform.scale = Vec3::splat(scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_transforms_point_outward() {
        for face in BoxFace::ALL {
            let t = face_transform(face, 1.35, 1.9, 0.14);
            let normal = t.rotation * Vec3::Z;
            let expected = Vec3::from_array(face.normal());
            assert!((normal - expected).length() < 1e-5, "{:?}", face);
            // Face sits on the box surface along its normal
            assert!(t.translation.dot(expected) > 0.0);
        }
    }

    #[test]
    fn test_face_transforms_cover_box_extents() {
        let (w, h, d) = (1.4, 1.9, 0.15);
        for face in BoxFace::ALL {
            let t = face_transform(face, w, h, d);
            // Local X and Y span the face in world space
            let span_u = (t.rotation * Vec3::X * t.scale.x).abs();
            let span_v = (t.rotation * Vec3::Y * t.scale.y).abs();
            let total = span_u + span_v + (t.translation.abs() * 2.0);
            assert!((total.x - w).abs() < 1e-4, "{:?} x", face);
            assert!((total.y - h).abs() < 1e-4, "{:?} y", face);
            assert!((total.z - d).abs() < 1e-4, "{:?} z", face);
        }
    }

    #[test]
    fn test_frame_rgb_falls_back_to_platform() {
        let mut model = BoxModel::new(Platform::Playstation, AssetSet::default());
        assert_eq!(model.frame_rgb(), [0x00, 0x70, 0xD1]);

        model.frame_color = "#FF8C00".to_string();
        assert_eq!(model.frame_rgb(), [0xFF, 0x8C, 0x00]);

        model.frame_color = "not a color".to_string();
        assert_eq!(model.frame_rgb(), [0x00, 0x70, 0xD1]);
    }

    #[test]
    fn test_instances_use_separate_layers() {
        assert_ne!(
            BoxInstance::Viewer.render_layers(),
            BoxInstance::Preview.render_layers()
        );
    }
}
