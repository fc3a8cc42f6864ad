//! Keyframe animation: interpolatable values, tracks and clips.

pub mod clip;
pub mod tracks;
pub mod values;

pub use clip::{AnimationClip, LoopMode, TransformTracks};
pub use tracks::{InterpolationMode, Keyframe, KeyframeTrack};
pub use values::Interpolatable;
