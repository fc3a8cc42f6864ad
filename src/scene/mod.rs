//! Scene Graph Module
//!
//! Hierarchical scene representation and everything evaluated while it is
//! traversed:
//! - [`SceneGraph`]: node arena with depth-first draw and input traversal
//! - [`Node`]: name, local transform source, visibility and payload
//! - [`Drawable`]: capability implemented by node payloads
//! - [`Skeleton`]: bone hierarchy and per-frame skinning matrices
//! - [`FlyCamera`], [`CharacterController`]: interactive controls
//! - [`presets`]: procedural keyframe animations for scene construction

pub mod camera;
pub mod character;
pub mod drawable;
pub mod graph;
pub mod node;
pub mod presets;
pub mod skeleton;

pub use camera::FlyCamera;
pub use character::{CharacterController, CharacterMode};
pub use drawable::{DrawCall, DrawList, DrawSink, Drawable, RecordedDraw, SkinnedMesh, StaticMesh};
pub use graph::SceneGraph;
pub use node::{LocalTransform, Node};
pub use skeleton::{BoneDesc, BoundClip, Skeleton, SkinningPose};

use glam::{Mat4, Vec3};
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of a node inside a [`SceneGraph`].
    pub struct NodeHandle;
}

/// Rasterization mode the backend should use for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

impl PolygonMode {
    /// Fill → Line → Point → Fill.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Fill => Self::Line,
            Self::Line => Self::Point,
            Self::Point => Self::Fill,
        }
    }
}

/// Per-frame values shared by every draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub light_dir: Vec3,
    pub polygon_mode: PolygonMode,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            light_dir: Vec3::NEG_Y,
            polygon_mode: PolygonMode::Fill,
        }
    }
}

/// Everything a traversal needs from the frame: the clock sample and the
/// shared uniforms.
///
/// The time is sampled once per frame, so every node drawn within a frame is
/// evaluated at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameContext {
    /// Seconds since the animation clock epoch
    pub time: f32,
    pub uniforms: FrameUniforms,
}

impl FrameContext {
    #[must_use]
    pub fn new(time: f32, uniforms: FrameUniforms) -> Self {
        Self { time, uniforms }
    }

    /// Context with default uniforms, for traversals that only need time.
    #[must_use]
    pub fn at(time: f32) -> Self {
        Self {
            time,
            uniforms: FrameUniforms::default(),
        }
    }
}
