use glam::{Mat4, Vec3};

use crate::config::{CameraPreset, CameraSettings};
use crate::input::{Key, KeyState};
use crate::math;

/// Pitch is kept inside this range to avoid flipping over the poles.
pub const PITCH_LIMIT: f32 = 89.0;

/// Free-flying camera steered by held keys.
///
/// Angles are in degrees. `yaw = 0, pitch = 0` looks down +X.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Movement speed in units per second
    pub speed: f32,
    /// Rotation speed in degrees per second
    pub sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
    presets: Vec<CameraPreset>,

    front: Vec3,
    right: Vec3,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

impl FlyCamera {
    #[must_use]
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        Self::from_settings(&CameraSettings {
            position,
            world_up,
            yaw,
            pitch,
            ..CameraSettings::default()
        })
    }

    #[must_use]
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let mut camera = Self {
            position: settings.position,
            world_up: settings.world_up,
            yaw: settings.yaw,
            pitch: settings.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            speed: settings.speed,
            sensitivity: settings.sensitivity,
            zoom: settings.zoom,
            near: settings.near,
            far: settings.far,
            presets: settings.presets.clone(),
            front: Vec3::X,
            right: Vec3::Z,
        };
        camera.update_vectors();
        camera
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        self.front = math::normalized(Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch));
        self.right = math::normalized(self.front.cross(self.world_up));
    }

    #[inline]
    #[must_use]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        math::look_at(self.position, self.position + self.front, self.world_up)
    }

    #[must_use]
    pub fn projection(&self, aspect: f32) -> Mat4 {
        math::perspective(self.zoom, aspect, self.near, self.far)
    }

    /// Sets yaw and pitch in degrees. Pitch is clamped.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Jumps to the preset bound to digit `index`. Returns false when there
    /// is none.
    pub fn apply_preset(&mut self, index: usize) -> bool {
        let Some(preset) = self.presets.get(index).cloned() else {
            return false;
        };
        self.position = preset.position;
        self.set_orientation(preset.yaw, preset.pitch);
        true
    }

    #[must_use]
    pub fn presets(&self) -> &[CameraPreset] {
        &self.presets
    }

    /// Moves and turns the camera for every held key over `dt` seconds.
    pub fn update(&mut self, keys: &KeyState, dt: f32) {
        let step = self.speed * dt;
        let turn = self.sensitivity * dt;

        if keys.is_held(Key::W) {
            self.position += step * self.front;
        }
        if keys.is_held(Key::S) {
            self.position -= step * self.front;
        }
        if keys.is_held(Key::A) {
            self.position -= step * self.right;
        }
        if keys.is_held(Key::D) {
            self.position += step * self.right;
        }
        if keys.is_held(Key::Q) {
            self.position += step * self.world_up;
        }
        if keys.is_held(Key::E) {
            self.position -= step * self.world_up;
        }

        let mut yaw = self.yaw;
        let mut pitch = self.pitch;
        let mut turned = false;
        for (key, d_yaw, d_pitch) in [
            (Key::Left, -turn, 0.0),
            (Key::Right, turn, 0.0),
            (Key::Up, 0.0, turn),
            (Key::Down, 0.0, -turn),
        ] {
            if keys.is_held(key) {
                yaw += d_yaw;
                pitch += d_pitch;
                turned = true;
            }
        }
        if turned {
            self.set_orientation(yaw, pitch);
        }

        for digit in 0..=9u8 {
            if keys.is_held(Key::Digit(digit)) {
                self.apply_preset(usize::from(digit));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;

    #[test]
    fn zero_angles_look_down_x() {
        let camera = FlyCamera::new(Vec3::ZERO, Vec3::Y, 0.0, 0.0);
        assert!(camera.front().abs_diff_eq(Vec3::X, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = FlyCamera::new(Vec3::ZERO, Vec3::Y, 0.0, 0.0);
        let mut keys = KeyState::new();
        keys.handle_event(&InputEvent::press(Key::Up));
        camera.update(&keys, 10.0);
        assert!((camera.pitch - PITCH_LIMIT).abs() < 1e-6);
    }

    #[test]
    fn forward_moves_by_speed_times_dt() {
        let mut camera = FlyCamera::new(Vec3::ZERO, Vec3::Y, 0.0, 0.0);
        let mut keys = KeyState::new();
        keys.handle_event(&InputEvent::press(Key::W));
        camera.update(&keys, 0.5);
        assert!(camera.position.abs_diff_eq(Vec3::new(camera.speed * 0.5, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn digit_jumps_to_preset() {
        let mut camera = FlyCamera::default();
        let mut keys = KeyState::new();
        keys.handle_event(&InputEvent::press(Key::Digit(1)));
        camera.update(&keys, 0.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(-16.0, 17.0, -103.0), 1e-5));
        assert!((camera.yaw - 78.0).abs() < 1e-6);
        assert!(!camera.apply_preset(7));
    }
}
