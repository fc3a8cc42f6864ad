//! Error Types
//!
//! This module defines the error types used throughout the viewer core.
//!
//! # Overview
//!
//! The main error type [`CoveError`] covers:
//! - Math-layer failures (degenerate vectors)
//! - Malformed animation data (empty tracks, bad key times)
//! - Malformed skeletons and meshes detected at load time
//! - Configuration loading errors
//!
//! # Propagation
//!
//! Structural errors are raised while assets are being assembled, before the
//! resulting nodes enter the live scene graph. The per-frame traversal never
//! returns errors: math-layer failures are recovered locally with a fallback
//! value and a `log::warn!`.
//!
//! ```rust,ignore
//! use cove::errors::{CoveError, Result};
//!
//! fn build() -> Result<()> {
//!     // Load-phase operations return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the viewer core.
#[derive(Error, Debug)]
pub enum CoveError {
    // ========================================================================
    // Math Errors
    // ========================================================================
    /// A zero-length (or non-finite) vector was normalized.
    #[error("Cannot normalize degenerate vector {0:?}")]
    DegenerateVector([f32; 3]),

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// A keyframe track was built without any keys.
    #[error("Keyframe track '{0}' has no keys")]
    EmptyTrack(String),

    /// A key time is NaN or infinite.
    #[error("Invalid key time {time} in track '{track}'")]
    InvalidKeyTime {
        /// Track label
        track: String,
        /// The offending time
        time: f32,
    },

    /// Parallel time/value arrays differ in length.
    #[error("Track '{track}' has {times} key times but {values} values")]
    TrackLengthMismatch {
        /// Track label
        track: String,
        /// Number of key times
        times: usize,
        /// Number of values
        values: usize,
    },

    /// An animation channel targets a bone the skeleton does not have.
    #[error("Animation channel targets unknown bone '{0}'")]
    MissingBone(String),

    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// A bone's parent index does not precede it.
    #[error("Bone '{name}' (index {index}) has invalid parent index {parent}")]
    InvalidBoneHierarchy {
        /// Bone name
        name: String,
        /// Bone index
        index: usize,
        /// The parent index that was given
        parent: usize,
    },

    /// Two bones share a name.
    #[error("Duplicate bone name '{0}'")]
    DuplicateBone(String),

    /// A bind-pose world matrix cannot be inverted.
    #[error("Bind pose of bone '{0}' is singular")]
    SingularBindPose(String),

    /// Supplied inverse-bind matrices do not match the bone count.
    #[error("Expected {expected} inverse bind matrices, got {actual}")]
    BoneCountMismatch {
        /// Number of bones
        expected: usize,
        /// Number of matrices supplied
        actual: usize,
    },

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// Mesh data failed validation.
    #[error("Invalid mesh '{name}': {reason}")]
    InvalidMesh {
        /// Mesh label
        name: String,
        /// What is wrong
        reason: String,
    },

    /// Height field samples do not match its dimensions.
    #[error("Invalid height field: {0}")]
    InvalidHeightField(String),

    // ========================================================================
    // Configuration & I/O Errors
    // ========================================================================
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, CoveError>`.
pub type Result<T> = std::result::Result<T, CoveError>;
