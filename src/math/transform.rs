use glam::{Mat4, Quat, Vec3};

use crate::math;

/// Decomposed local transform (translation, rotation, scale).
///
/// The matrix form is always `T * R * S`: scale first, then rotation, then
/// translation. This is the shape keyframe tracks produce and the shape bind
/// poses are stored in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Composes `T * R * S`.
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decomposes an affine matrix. Shear is lost.
    #[must_use]
    pub fn from_matrix(mat: Mat4) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Sets the rotation from Euler angles in degrees (yaw about Z, pitch
    /// about Y, roll about X).
    pub fn set_rotation_euler(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.rotation = math::quaternion_from_euler(yaw, pitch, roll);
    }

    /// Sets the rotation to `degrees` about `axis`.
    pub fn set_rotation_axis_angle(&mut self, axis: Vec3, degrees: f32) {
        self.rotation = math::quaternion_from_axis_angle(axis, degrees);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}
