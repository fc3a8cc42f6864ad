//! Transform Math
//!
//! Matrix, vector and quaternion helpers used by the scene graph and the
//! animation system.
//!
//! # Conventions
//!
//! - Matrices are [`glam::Mat4`]: column-major storage, column vectors.
//! - `a * b` applies `b` first, then `a`. Node composition therefore reads
//!   `world = parent_world * local`, and a TRS local is `T * R * S`.
//! - Every public angle parameter is in **degrees**; conversion to radians
//!   happens here.
//! - Projections are OpenGL style (right-handed, clip-space z in `[-1, 1]`).

pub mod transform;

pub use transform::Transform;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::errors::{CoveError, Result};

/// Squared length under which a vector is treated as zero.
pub const DEGENERATE_EPSILON: f32 = 1e-12;

/// Dot product above which slerp falls back to normalized lerp.
const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;
/// Dot products above `-HEMISPHERE_EPSILON` count as the same hemisphere, so
/// an exact half turn keeps its authored direction.
const HEMISPHERE_EPSILON: f32 = 1e-6;

// ============================================================================
// Matrix builders
// ============================================================================

#[inline]
#[must_use]
pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

#[inline]
#[must_use]
pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

#[inline]
#[must_use]
pub fn translate_v(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

/// Rotation of `degrees` about `axis`.
///
/// A degenerate axis yields the identity matrix.
#[must_use]
pub fn rotate(axis: Vec3, degrees: f32) -> Mat4 {
    Mat4::from_quat(quaternion_from_axis_angle(axis, degrees))
}

#[inline]
#[must_use]
pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(x, y, z))
}

#[inline]
#[must_use]
pub fn uniform_scale(s: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(s))
}

// ============================================================================
// Vectors
// ============================================================================

/// Normalizes `v`, failing on zero-length or non-finite input.
pub fn try_normalize(v: Vec3) -> Result<Vec3> {
    let len_sq = v.length_squared();
    if !len_sq.is_finite() || len_sq <= DEGENERATE_EPSILON {
        return Err(CoveError::DegenerateVector(v.to_array()));
    }
    Ok(v / len_sq.sqrt())
}

/// Normalizes `v`, returning [`Vec3::ZERO`] for degenerate input.
///
/// Used on per-frame paths where a bad normal must not abort the frame.
#[must_use]
pub fn normalized(v: Vec3) -> Vec3 {
    match try_normalize(v) {
        Ok(n) => n,
        Err(err) => {
            log::warn!("{err}; using zero vector");
            Vec3::ZERO
        }
    }
}

// ============================================================================
// Quaternions
// ============================================================================

#[inline]
#[must_use]
pub fn quaternion() -> Quat {
    Quat::IDENTITY
}

/// Rotation of `degrees` about `axis`. A degenerate axis yields identity.
#[must_use]
pub fn quaternion_from_axis_angle(axis: Vec3, degrees: f32) -> Quat {
    match try_normalize(axis) {
        Ok(axis) => Quat::from_axis_angle(axis, degrees.to_radians()),
        Err(err) => {
            log::warn!("{err}; using identity rotation");
            Quat::IDENTITY
        }
    }
}

/// Builds a rotation from Euler angles in degrees.
///
/// `yaw` turns about Z, `pitch` about Y and `roll` about X, composed as
/// `qz(yaw) * qy(pitch) * qx(roll)`.
#[must_use]
pub fn quaternion_from_euler(yaw: f32, pitch: f32, roll: f32) -> Quat {
    Quat::from_euler(
        EulerRot::ZYX,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Hamilton product: the result applies `b` first, then `a`.
#[inline]
#[must_use]
pub fn quaternion_mul(a: Quat, b: Quat) -> Quat {
    a * b
}

/// Normalizes `q`; a zero (or non-finite) quaternion becomes identity.
#[must_use]
pub fn normalize_quat(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if !len_sq.is_finite() || len_sq <= DEGENERATE_EPSILON {
        return Quat::IDENTITY;
    }
    q / len_sq.sqrt()
}

/// Spherical linear interpolation along the shortest arc.
///
/// When `q0` and `q1` lie in opposite hemispheres `q1` is negated first, so the
/// result never takes the long way round. Exactly orthogonal quaternions (a
/// 180° rotation apart) are blended as given. Nearly parallel inputs fall back to
/// a normalized lerp. Inputs are normalized before blending.
#[must_use]
pub fn slerp_shortest(q0: Quat, q1: Quat, t: f32) -> Quat {
    let q0 = normalize_quat(q0);
    let mut q1 = normalize_quat(q1);

    let mut dot = q0.dot(q1);
    if dot < -HEMISPHERE_EPSILON {
        q1 = -q1;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        let blended = q0 * (1.0 - t) + q1 * t;
        return normalize_quat(blended);
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;
    normalize_quat(q0 * s0 + q1 * s1)
}

// ============================================================================
// Projection & view
// ============================================================================

/// OpenGL-style perspective projection, `fovy` in degrees.
#[must_use]
pub fn perspective(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fovy_degrees.to_radians(), aspect, near, far)
}

/// OpenGL-style orthographic projection.
#[must_use]
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
}

/// OpenGL-style off-axis perspective projection (`glFrustum`).
#[must_use]
#[rustfmt::skip]
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let dx = right - left;
    let dy = top - bottom;
    let dz = far - near;
    Mat4::from_cols_array(&[
        2.0 * near / dx, 0.0, 0.0, 0.0,
        0.0, 2.0 * near / dy, 0.0, 0.0,
        (right + left) / dx, (top + bottom) / dy, -(far + near) / dz, -1.0,
        0.0, 0.0, -2.0 * far * near / dz, 0.0,
    ])
}

/// Right-handed view matrix looking from `eye` toward `target`.
///
/// If `eye == target` or `up` is parallel to the view direction the basis is
/// degenerate; the identity view is returned instead.
#[must_use]
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let Ok(forward) = try_normalize(target - eye) else {
        log::warn!("look_at: eye coincides with target");
        return Mat4::IDENTITY;
    };
    if try_normalize(forward.cross(up)).is_err() {
        log::warn!("look_at: up vector parallel to view direction");
        return Mat4::IDENTITY;
    }
    Mat4::look_at_rh(eye, target, up)
}
