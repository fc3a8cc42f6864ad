use std::cmp::Ordering;

use crate::animation::values::Interpolatable;
use crate::errors::{CoveError, Result};

/// How a key blends into the key that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Blend linearly (slerp for rotations) toward the next key.
    #[default]
    Linear,
    /// Hold this key's value until the next key, then jump.
    Step,
}

/// A single key of a [`KeyframeTrack`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    /// Value at the key and on the segment leaving it.
    pub value: T,
    /// Value the previous segment converges to, when different from `value`.
    /// `Some` marks a discontinuity at this key.
    pub arrive: Option<T>,
    pub mode: InterpolationMode,
}

impl<T: Copy> Keyframe<T> {
    #[inline]
    fn incoming(&self) -> T {
        self.arrive.unwrap_or(self.value)
    }
}

/// Sparse time → value mapping for one animation channel.
///
/// Keys are kept sorted by strictly increasing time and a track always holds
/// at least one key. Sampling outside the keyed range clamps to the first or
/// last key.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    label: String,
    keys: Vec<Keyframe<T>>,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a linear track from `(time, value)` pairs in any order.
    ///
    /// When a time appears twice the later pair wins.
    pub fn new(label: impl Into<String>, keys: impl IntoIterator<Item = (f32, T)>) -> Result<Self> {
        let label = label.into();
        let mut track = Self {
            label,
            keys: Vec::new(),
        };
        for (time, value) in keys {
            track.set(time, value)?;
        }
        if track.keys.is_empty() {
            return Err(CoveError::EmptyTrack(track.label));
        }
        Ok(track)
    }

    /// Builds a track from parallel time and value arrays, as loaders deliver
    /// them.
    pub fn from_parts(
        label: impl Into<String>,
        times: Vec<f32>,
        values: Vec<T>,
        mode: InterpolationMode,
    ) -> Result<Self> {
        let label = label.into();
        if times.len() != values.len() {
            return Err(CoveError::TrackLengthMismatch {
                track: label,
                times: times.len(),
                values: values.len(),
            });
        }
        let mut track = Self {
            label,
            keys: Vec::with_capacity(times.len()),
        };
        for (time, value) in times.into_iter().zip(values) {
            track.set_with_mode(time, value, mode)?;
        }
        if track.keys.is_empty() {
            return Err(CoveError::EmptyTrack(track.label));
        }
        Ok(track)
    }

    /// A track holding `value` at every time.
    #[must_use]
    pub fn constant(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            keys: vec![Keyframe {
                time: 0.0,
                value,
                arrive: None,
                mode: InterpolationMode::Linear,
            }],
        }
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Inserts a key, or overwrites the value of the key already at `time`
    /// (keeping that key's mode).
    pub fn set(&mut self, time: f32, value: T) -> Result<()> {
        let mode = self
            .find(time)
            .ok()
            .map_or(InterpolationMode::Linear, |i| self.keys[i].mode);
        self.insert(Keyframe {
            time,
            value,
            arrive: None,
            mode,
        })
    }

    /// Inserts or overwrites a key with an explicit interpolation mode.
    pub fn set_with_mode(&mut self, time: f32, value: T, mode: InterpolationMode) -> Result<()> {
        self.insert(Keyframe {
            time,
            value,
            arrive: None,
            mode,
        })
    }

    /// Inserts or overwrites a discontinuous key: the segment ending at
    /// `time` converges to `arrive`, while the key itself and the segment
    /// leaving it use `depart`.
    pub fn set_discontinuous(&mut self, time: f32, arrive: T, depart: T) -> Result<()> {
        self.insert(Keyframe {
            time,
            value: depart,
            arrive: Some(arrive),
            mode: InterpolationMode::Linear,
        })
    }

    fn insert(&mut self, key: Keyframe<T>) -> Result<()> {
        if !key.time.is_finite() {
            return Err(CoveError::InvalidKeyTime {
                track: self.label.clone(),
                time: key.time,
            });
        }
        match self.find(key.time) {
            Ok(i) => self.keys[i] = key,
            Err(i) => self.keys.insert(i, key),
        }
        Ok(())
    }

    /// Binary search by exact time.
    fn find(&self, time: f32) -> std::result::Result<usize, usize> {
        self.keys
            .binary_search_by(|k| k.time.partial_cmp(&time).unwrap_or(Ordering::Less))
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Samples the track at `time`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn evaluate(&self, time: f32) -> T {
        let first = &self.keys[0];
        if self.keys.len() == 1 || time.is_nan() || time <= first.time {
            return first.value;
        }

        let last = &self.keys[self.keys.len() - 1];
        if time >= last.time {
            return last.value;
        }

        // First key strictly after `time`; `time > first.time` keeps it >= 1.
        let next_idx = self.keys.partition_point(|k| k.time <= time);
        let k0 = &self.keys[next_idx - 1];
        let k1 = &self.keys[next_idx];

        if time == k0.time {
            return k0.value;
        }

        match k0.mode {
            InterpolationMode::Step => k0.value,
            InterpolationMode::Linear => {
                let t = ((time - k0.time) / (k1.time - k0.time)).clamp(0.0, 1.0);
                T::interpolate_linear(k0.value, k1.incoming(), t)
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    #[inline]
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    #[must_use]
    pub fn first_time(&self) -> f32 {
        self.keys[0].time
    }

    #[inline]
    #[must_use]
    pub fn last_time(&self) -> f32 {
        self.keys[self.keys.len() - 1].time
    }
}
