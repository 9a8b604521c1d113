//! Orbit camera: rotate and zoom around the box, no panning, damped release

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

/// Pointer travel (pixels) beyond which a press counts as a drag, not a click
pub const CLICK_SLOP: f32 = 6.0;

/// Orbit controller state
#[derive(Debug, Clone, Resource)]
pub struct OrbitSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    /// Rotation still to be applied; drained exponentially for damping
    pub pending_azimuth: f32,
    pub pending_elevation: f32,
    pub target: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Pointer travel since the current press started
    pub press_travel: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            distance: 5.0,
            target_distance: 5.0,
            azimuth: 0.0,
            elevation: 0.0,
            pending_azimuth: 0.0,
            pending_elevation: 0.0,
            target: Vec3::ZERO,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.08,
            min_distance: 2.5,
            max_distance: 12.0,
            press_travel: 0.0,
        }
    }
}

impl OrbitSettings {
    /// Queue rotation from a pointer drag of `delta` pixels
    pub fn drag(&mut self, delta: Vec2) {
        self.pending_azimuth -= delta.x * self.sensitivity;
        self.pending_elevation += delta.y * self.sensitivity;
    }

    /// Zoom by `steps` wheel lines; positive zooms in
    pub fn zoom(&mut self, steps: f32) {
        let factor = 1.0 - steps * self.zoom_speed;
        self.target_distance = (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Scale zoom from a pinch gesture
    pub fn zoom_by_ratio(&mut self, ratio: f32) {
        self.target_distance = (self.target_distance * ratio).clamp(self.min_distance, self.max_distance);
    }

    /// Advance smoothing by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let lerp_factor = 1.0 - (-self.smooth_factor * 60.0 * dt).exp();

        let d_az = self.pending_azimuth * lerp_factor;
        self.azimuth += d_az;
        self.pending_azimuth -= d_az;

        let d_el = self.pending_elevation * lerp_factor;
        self.elevation = (self.elevation + d_el).clamp(-1.5, 1.5);
        self.pending_elevation -= d_el;

        self.distance += (self.target_distance - self.distance) * lerp_factor;
    }

    /// Camera position for the current angles (Y up)
    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.elevation.cos() * self.azimuth.sin();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.elevation.cos() * self.azimuth.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Back to the initial view, keeping tuning parameters
    pub fn reset_view(&mut self) {
        let defaults = Self::default();
        self.azimuth = defaults.azimuth;
        self.elevation = defaults.elevation;
        self.pending_azimuth = 0.0;
        self.pending_elevation = 0.0;
        self.target_distance = defaults.target_distance;
    }

    /// A mouse button or finger went down
    pub fn begin_press(&mut self) {
        self.press_travel = 0.0;
    }

    /// Pointer moved by `delta` pixels while held
    pub fn track_press(&mut self, delta: Vec2) {
        self.press_travel += delta.length();
    }

    pub fn is_click(&self) -> bool {
        self.press_travel <= CLICK_SLOP
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitSettings>()
            .add_systems(Update, update_camera);
    }
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<OrbitSettings>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    // Check if egui wants the mouse - if so, don't process camera controls
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);

    // Click vs drag is judged per press for mouse and touch alike
    if mouse_button.just_pressed(MouseButton::Left) || touch_input.any_just_pressed() {
        settings.begin_press();
    }
    if mouse_button.pressed(MouseButton::Left) {
        settings.track_press(mouse_motion.delta);
    }
    for touch in touch_input.iter() {
        settings.track_press(touch.delta());
    }

    if !egui_wants_pointer {
        // Orbit with left mouse drag
        if mouse_button.pressed(MouseButton::Left) && mouse_motion.delta != Vec2::ZERO {
            settings.drag(mouse_motion.delta);
        }

        // Pixel deltas (touchpads, some browsers) are roughly 100x line deltas
        let steps = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y / 100.0,
        };
        if steps != 0.0 {
            settings.zoom(steps);
        }

        // One finger orbits
        if touch_input.iter().count() == 1 {
            for touch in touch_input.iter() {
                let delta = touch.delta();
                if delta != Vec2::ZERO {
                    settings.drag(delta);
                }
            }
        }

        // Pinch to zoom
        if touch_input.iter().count() == 2 {
            let touches: Vec<_> = touch_input.iter().collect();
            if let (Some(t1), Some(t2)) = (touches.first(), touches.get(1)) {
                let curr_dist = t1.position().distance(t2.position());
                let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
                settings.zoom_by_ratio(prev_dist / curr_dist.max(1.0));
            }
        }
    }

    settings.step(time.delta_secs());

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = settings.eye();
        transform.look_at(settings.target, Vec3::Y);
    }
}
