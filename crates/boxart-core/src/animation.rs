//! Box spin and hover animation state

/// Yaw speed while auto-rotating, radians per second
pub const YAW_SPEED: f32 = 0.5;
/// Pitch wobble: amplitude (rad) and angular frequency (rad/s)
pub const PITCH_AMPLITUDE: f32 = 0.3;
pub const PITCH_FREQUENCY: f32 = 0.6;
/// Roll wobble: amplitude (rad) and angular frequency (rad/s)
pub const ROLL_AMPLITUDE: f32 = 0.2;
pub const ROLL_FREQUENCY: f32 = 0.4;
/// Scale applied while hovered with auto-rotation off
pub const HOVER_SCALE: f32 = 1.05;

/// Euler angles (X, Y, Z) in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinState {
    pub auto_rotate: bool,
    pub hovered: bool,
    pub orientation: Orientation,
    /// Time spent auto-rotating; drives the wobble so it resumes smoothly
    spin_time: f32,
}

impl Default for SpinState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SpinState {
    pub fn new(auto_rotate: bool) -> Self {
        Self {
            auto_rotate,
            hovered: false,
            orientation: Orientation::default(),
            spin_time: 0.0,
        }
    }

    /// Click handler: flip auto-rotation
    pub fn toggle(&mut self) {
        self.auto_rotate = !self.auto_rotate;
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Advance by `dt` seconds. The orientation holds while auto-rotation is off.
    pub fn advance(&mut self, dt: f32) -> Orientation {
        if self.auto_rotate && dt > 0.0 {
            self.spin_time += dt;
            self.orientation.yaw += YAW_SPEED * dt;
            self.orientation.pitch = PITCH_AMPLITUDE * (PITCH_FREQUENCY * self.spin_time).sin();
            self.orientation.roll = ROLL_AMPLITUDE * (ROLL_FREQUENCY * self.spin_time).sin();
        }
        self.orientation
    }

    /// Scale the model should ease towards
    pub fn target_scale(&self) -> f32 {
        if self.hovered && !self.auto_rotate {
            HOVER_SCALE
        } else {
            1.0
        }
    }
}

/// Exponential approach of `current` to `target`, frame-rate independent
pub fn ease_towards(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = 1.0 - (-rate * dt).exp();
    current + (target - current) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_toggles_once() {
        let mut spin = SpinState::new(true);
        spin.toggle();
        assert!(!spin.auto_rotate);
        spin.toggle();
        assert!(spin.auto_rotate);
    }

    #[test]
    fn test_yaw_increases_while_rotating() {
        let mut spin = SpinState::new(true);
        let mut last = spin.orientation.yaw;
        for _ in 0..100 {
            let o = spin.advance(1.0 / 60.0);
            assert!(o.yaw > last);
            last = o.yaw;
        }
    }

    #[test]
    fn test_orientation_holds_when_stopped() {
        let mut spin = SpinState::new(true);
        spin.advance(1.3);
        spin.toggle();
        let held = spin.orientation;
        for _ in 0..10 {
            assert_eq!(spin.advance(0.5), held);
        }
    }

    #[test]
    fn test_wobble_is_bounded() {
        let mut spin = SpinState::new(true);
        for _ in 0..2000 {
            let o = spin.advance(0.05);
            assert!(o.pitch.abs() <= 0.5);
            assert!(o.roll.abs() <= 0.5);
        }
    }

    #[test]
    fn test_hover_scale_suppressed_while_rotating() {
        let mut spin = SpinState::new(true);
        spin.set_hovered(true);
        assert_eq!(spin.target_scale(), 1.0);
        spin.toggle();
        assert_eq!(spin.target_scale(), HOVER_SCALE);
        spin.set_hovered(false);
        assert_eq!(spin.target_scale(), 1.0);
    }

    #[test]
    fn test_ease_towards_converges() {
        let mut v = 1.0;
        for _ in 0..200 {
            v = ease_towards(v, HOVER_SCALE, 10.0, 1.0 / 60.0);
        }
        assert!((v - HOVER_SCALE).abs() < 1e-3);
    }
}
