use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::tracks::KeyframeTrack;
use crate::errors::Result;
use crate::math::Transform;

/// Translation, rotation and scale tracks for one animated target.
#[derive(Debug, Clone)]
pub struct TransformTracks {
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl TransformTracks {
    #[must_use]
    pub fn new(
        translation: KeyframeTrack<Vec3>,
        rotation: KeyframeTrack<Quat>,
        scale: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Builds all three tracks from key lists. Scale keys are uniform factors.
    pub fn from_keys(
        translation: impl IntoIterator<Item = (f32, Vec3)>,
        rotation: impl IntoIterator<Item = (f32, Quat)>,
        uniform_scale: impl IntoIterator<Item = (f32, f32)>,
    ) -> Result<Self> {
        Ok(Self {
            translation: KeyframeTrack::new("translation", translation)?,
            rotation: KeyframeTrack::new("rotation", rotation)?,
            scale: KeyframeTrack::new(
                "scale",
                uniform_scale.into_iter().map(|(t, s)| (t, Vec3::splat(s))),
            )?,
        })
    }

    /// Tracks that hold `transform` forever.
    #[must_use]
    pub fn fixed(transform: Transform) -> Self {
        Self {
            translation: KeyframeTrack::constant("translation", transform.translation),
            rotation: KeyframeTrack::constant("rotation", transform.rotation),
            scale: KeyframeTrack::constant("scale", transform.scale),
        }
    }

    /// Samples all three channels at `time`.
    #[must_use]
    pub fn evaluate(&self, time: f32) -> Transform {
        Transform {
            translation: self.translation.evaluate(time),
            rotation: self.rotation.evaluate(time),
            scale: self.scale.evaluate(time),
        }
    }

    /// `translate(t) * rotate(r) * scale(s)` at `time`.
    #[inline]
    #[must_use]
    pub fn matrix_at(&self, time: f32) -> Mat4 {
        self.evaluate(time).to_matrix()
    }

    /// Time of the latest key over all three channels.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.translation
            .last_time()
            .max(self.rotation.last_time())
            .max(self.scale.last_time())
    }
}

/// How clip time behaves past the clip's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Hold the final pose.
    #[default]
    Clamp,
    /// Wrap around to the start.
    Repeat,
}

impl LoopMode {
    /// Maps `time` into `[0, duration]`. A non-positive duration pins time
    /// to zero.
    #[must_use]
    pub fn wrap(self, time: f32, duration: f32) -> f32 {
        if duration <= 0.0 {
            return 0.0;
        }
        match self {
            Self::Clamp => time.clamp(0.0, duration),
            Self::Repeat => time.rem_euclid(duration),
        }
    }
}

/// A skeletal animation: per-bone transform tracks keyed in ticks.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Length in ticks.
    pub duration: f32,
    pub ticks_per_second: f32,
    pub loop_mode: LoopMode,
    channels: Vec<(String, TransformTracks)>,
    channel_index: FxHashMap<String, usize>,
}

impl AnimationClip {
    /// Creates a clip. `duration` defaults to the latest key over all
    /// channels; a non-positive `ticks_per_second` is treated as 1.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        channels: impl IntoIterator<Item = (String, TransformTracks)>,
        duration: Option<f32>,
        ticks_per_second: f32,
    ) -> Self {
        // A repeated target name replaces the earlier channel.
        let mut list: Vec<(String, TransformTracks)> = Vec::new();
        let mut channel_index: FxHashMap<String, usize> = FxHashMap::default();
        for (target, tracks) in channels {
            if let Some(&i) = channel_index.get(&target) {
                list[i].1 = tracks;
            } else {
                channel_index.insert(target.clone(), list.len());
                list.push((target, tracks));
            }
        }
        let channels = list;

        let duration = duration.unwrap_or_else(|| {
            channels
                .iter()
                .map(|(_, tracks)| tracks.duration())
                .fold(0.0_f32, f32::max)
        });
        let ticks_per_second = if ticks_per_second > 0.0 && ticks_per_second.is_finite() {
            ticks_per_second
        } else {
            1.0
        };

        let name = name.into();
        log::debug!(
            "AnimationClip '{name}': {} channels, {duration} ticks at {ticks_per_second} ticks/s",
            channels.len()
        );

        Self {
            name,
            duration,
            ticks_per_second,
            loop_mode: LoopMode::default(),
            channels,
            channel_index,
        }
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// Converts elapsed seconds into clip time in ticks.
    #[must_use]
    pub fn track_time(&self, seconds: f32) -> f32 {
        self.loop_mode
            .wrap(seconds * self.ticks_per_second, self.duration)
    }

    #[must_use]
    pub fn channel(&self, bone_name: &str) -> Option<&TransformTracks> {
        self.channel_index(bone_name).map(|i| &self.channels[i].1)
    }

    /// Position of the channel targeting `bone_name`, stable for the clip's
    /// lifetime.
    #[must_use]
    pub fn channel_index(&self, bone_name: &str) -> Option<usize> {
        self.channel_index.get(bone_name).copied()
    }

    #[must_use]
    pub fn channel_at(&self, index: usize) -> Option<&TransformTracks> {
        self.channels.get(index).map(|(_, tracks)| tracks)
    }

    /// Channels in insertion order.
    pub fn channels(&self) -> impl Iterator<Item = (&str, &TransformTracks)> {
        self.channels.iter().map(|(name, tracks)| (name.as_str(), tracks))
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
