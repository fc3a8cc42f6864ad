#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod clock;
pub mod config;
pub mod errors;
pub mod input;
pub mod math;
pub mod scene;
pub mod viewer;

pub use animation::{AnimationClip, InterpolationMode, KeyframeTrack, LoopMode, TransformTracks};
pub use assets::{HeightField, MeshData, MeshId};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ViewerSettings;
pub use errors::{CoveError, Result};
pub use input::{InputEvent, Key, KeyAction, KeyState};
pub use math::Transform;
pub use scene::{
    BoneDesc, CharacterController, DrawCall, DrawList, DrawSink, Drawable, FlyCamera, FrameContext,
    FrameUniforms, LocalTransform, Node, NodeHandle, PolygonMode, SceneGraph, Skeleton, SkinnedMesh,
    SkinningPose, StaticMesh,
};
pub use viewer::Viewer;
