use std::sync::Arc;

use glam::Mat4;

use crate::animation::AnimationClip;
use crate::assets::{MeshData, MeshId};
use crate::errors::Result;
use crate::input::InputEvent;
use crate::scene::skeleton::{BoundClip, Skeleton, SkinningPose};
use crate::scene::{FrameContext, FrameUniforms};

/// Capability of a node payload.
///
/// `draw` receives the node's world transform for the current frame;
/// `handle_input` receives every input event broadcast through the graph.
/// Input does not stop at a payload that handles it.
pub trait Drawable {
    fn draw(&mut self, world: &Mat4, frame: &FrameContext, sink: &mut dyn DrawSink);

    fn handle_input(&mut self, _event: &InputEvent) {}
}

/// One draw request for the rendering backend.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub mesh: MeshId,
    /// Node world transform
    pub model: Mat4,
    /// Per-bone skinning matrices in skeleton space, for skinned meshes
    pub skinning: Option<&'a [Mat4]>,
    pub uniforms: &'a FrameUniforms,
}

/// Receives draw calls in traversal order.
pub trait DrawSink {
    fn submit(&mut self, call: &DrawCall<'_>);
}

/// Owned copy of a [`DrawCall`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub mesh: MeshId,
    pub model: Mat4,
    pub skinning: Option<Vec<Mat4>>,
    pub uniforms: FrameUniforms,
}

/// A [`DrawSink`] that records every call, for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub calls: Vec<RecordedDraw>,
}

impl DrawList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl DrawSink for DrawList {
    fn submit(&mut self, call: &DrawCall<'_>) {
        self.calls.push(RecordedDraw {
            mesh: call.mesh,
            model: call.model,
            skinning: call.skinning.map(<[Mat4]>::to_vec),
            uniforms: *call.uniforms,
        });
    }
}

/// Unskinned geometry drawn at the node's world transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticMesh {
    pub mesh: MeshId,
}

impl StaticMesh {
    #[must_use]
    pub fn new(mesh: MeshId) -> Self {
        Self { mesh }
    }

    /// Validates loader output before it becomes a payload.
    pub fn from_mesh_data(mesh: MeshId, data: &MeshData) -> Result<Self> {
        data.validate(None)?;
        Ok(Self::new(mesh))
    }
}

impl Drawable for StaticMesh {
    fn draw(&mut self, world: &Mat4, frame: &FrameContext, sink: &mut dyn DrawSink) {
        sink.submit(&DrawCall {
            mesh: self.mesh,
            model: *world,
            skinning: None,
            uniforms: &frame.uniforms,
        });
    }
}

/// Skinned geometry posed from a skeleton and an optional clip.
///
/// The pose is recomputed from the frame time on every draw. One clip plays
/// at a time: setting a clip replaces the previous one.
#[derive(Debug, Clone)]
pub struct SkinnedMesh {
    pub mesh: MeshId,
    skeleton: Arc<Skeleton>,
    clip: Option<BoundClip>,
    pose: SkinningPose,
}

impl SkinnedMesh {
    #[must_use]
    pub fn new(mesh: MeshId, skeleton: Arc<Skeleton>) -> Self {
        Self {
            mesh,
            skeleton,
            clip: None,
            pose: SkinningPose::new(),
        }
    }

    /// Checks the vertex bone references against `skeleton` first.
    pub fn from_mesh_data(mesh: MeshId, data: &MeshData, skeleton: Arc<Skeleton>) -> Result<Self> {
        data.validate(Some(skeleton.bone_count()))?;
        Ok(Self::new(mesh, skeleton))
    }

    #[must_use]
    pub fn with_clip(mut self, clip: Arc<AnimationClip>) -> Self {
        self.set_clip(clip);
        self
    }

    pub fn set_clip(&mut self, clip: Arc<AnimationClip>) {
        self.clip = Some(self.skeleton.bind_clip(clip));
    }

    pub fn clear_clip(&mut self) {
        self.clip = None;
    }

    #[must_use]
    pub fn clip(&self) -> Option<&BoundClip> {
        self.clip.as_ref()
    }

    #[must_use]
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    /// Pose from the most recent draw.
    #[must_use]
    pub fn pose(&self) -> &SkinningPose {
        &self.pose
    }
}

impl Drawable for SkinnedMesh {
    fn draw(&mut self, world: &Mat4, frame: &FrameContext, sink: &mut dyn DrawSink) {
        self.skeleton
            .compute_pose(self.clip.as_ref(), frame.time, &mut self.pose);
        sink.submit(&DrawCall {
            mesh: self.mesh,
            model: *world,
            skinning: Some(&self.pose.skinning),
            uniforms: &frame.uniforms,
        });
    }
}
