use glam::{Quat, Vec3};

use crate::math;

/// A value type a [`KeyframeTrack`](super::KeyframeTrack) can blend between.
pub trait Interpolatable: Copy + Sized {
    /// Blends from `start` (at `t = 0`) to `end` (at `t = 1`).
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    /// Shortest-arc slerp; the result is always unit length.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        math::slerp_shortest(start, end, t)
    }
}
