use std::fmt;
use std::sync::Arc;

use glam::Mat4;
use smallvec::SmallVec;

use crate::animation::{LoopMode, TransformTracks};
use crate::scene::NodeHandle;
use crate::scene::drawable::Drawable;

/// Where a node's local transform comes from.
#[derive(Debug, Clone)]
pub enum LocalTransform {
    /// A fixed matrix, editable between frames.
    Static(Mat4),
    /// Evaluated from keyframe tracks at the frame's clock time on every
    /// traversal. Never cached, so a clock reset shows on the next frame.
    /// `loop_mode` decides what happens past the last key.
    Keyframed {
        tracks: Arc<TransformTracks>,
        loop_mode: LoopMode,
    },
}

impl LocalTransform {
    /// The local matrix at clock time `time`.
    #[inline]
    #[must_use]
    pub fn matrix_at(&self, time: f32) -> Mat4 {
        match self {
            Self::Static(m) => *m,
            Self::Keyframed { tracks, loop_mode } => {
                tracks.matrix_at(loop_mode.wrap(time, tracks.duration()))
            }
        }
    }

    #[must_use]
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Keyframed { .. })
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::Static(Mat4::IDENTITY)
    }
}

/// A scene graph node.
///
/// # Hierarchy
///
/// Children are handles into the owning [`SceneGraph`](super::SceneGraph)
/// and are traversed in insertion order. A node may be listed under several
/// parents, which instances its whole subtree. The graph performs no cycle
/// detection when children are added; keeping the hierarchy acyclic is the
/// caller's job.
///
/// # Payload
///
/// The optional [`Drawable`] receives the node's world transform during
/// drawing and every broadcast input event.
pub struct Node {
    pub name: String,
    pub local: LocalTransform,
    /// Hidden nodes are skipped, with their subtree, when drawing
    pub visible: bool,
    pub(crate) children: SmallVec<[NodeHandle; 4]>,
    pub(crate) payload: Option<Box<dyn Drawable>>,
}

impl Node {
    /// Creates an empty group node with an identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: String::new(),
            local: LocalTransform::default(),
            visible: true,
            children: SmallVec::new(),
            payload: None,
        }
    }

    /// Group node with a static local transform.
    #[must_use]
    pub fn with_transform(local: Mat4) -> Self {
        Self {
            local: LocalTransform::Static(local),
            ..Self::new()
        }
    }

    /// Animated control node driven by `tracks`. Holds the last key once
    /// the clock passes it.
    #[must_use]
    pub fn animated(tracks: impl Into<Arc<TransformTracks>>) -> Self {
        Self {
            local: LocalTransform::Keyframed {
                tracks: tracks.into(),
                loop_mode: LoopMode::Clamp,
            },
            ..Self::new()
        }
    }

    /// Animated control node that replays `tracks` every
    /// [`TransformTracks::duration`] seconds.
    #[must_use]
    pub fn looping(tracks: impl Into<Arc<TransformTracks>>) -> Self {
        Self {
            local: LocalTransform::Keyframed {
                tracks: tracks.into(),
                loop_mode: LoopMode::Repeat,
            },
            ..Self::new()
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: impl Drawable + 'static) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&dyn Drawable> {
        self.payload.as_deref()
    }

    #[inline]
    pub fn payload_mut(&mut self) -> Option<&mut (dyn Drawable + 'static)> {
        self.payload.as_deref_mut()
    }

    pub fn set_payload(&mut self, payload: Option<Box<dyn Drawable>>) {
        self.payload = payload;
    }

    /// Replaces the local transform with a static matrix.
    pub fn set_transform(&mut self, local: Mat4) {
        self.local = LocalTransform::Static(local);
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("local", &self.local)
            .field("visible", &self.visible)
            .field("children", &self.children)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}
