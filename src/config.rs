//! Viewer Settings
//!
//! Settings are plain serde structs. Every field has a default, so a JSON
//! file only needs the values it changes:
//!
//! ```json
//! { "window": { "width": 1280 }, "camera": { "speed": 40.0 } }
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{CoveError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            title: "Viewer".to_string(),
        }
    }
}

/// A camera placement bound to a digit key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPreset {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraPreset {
    #[must_use]
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
    /// `presets[n]` is selected with digit key `n`
    pub presets: Vec<CameraPreset>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(-80.0, 15.0, 0.0),
            world_up: Vec3::Y,
            yaw: 0.0,
            pitch: -15.0,
            speed: 20.0,
            sensitivity: 45.0,
            zoom: 45.0,
            near: 0.1,
            far: 1000.0,
            presets: vec![
                CameraPreset::new(Vec3::new(-80.0, 15.0, 0.0), 0.0, 0.0),
                CameraPreset::new(Vec3::new(-16.0, 17.0, -103.0), 78.0, -6.0),
                CameraPreset::new(Vec3::new(12.0, 19.0, -36.0), -84.0, 0.0),
            ],
        }
    }
}

/// Movement rules of the keyboard-driven character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    pub start_x: f32,
    pub start_z: f32,
    /// Distance covered per key press or repeat
    pub move_speed: f32,
    /// Position limit on both axes, in either direction
    pub bound: f32,
    pub scale: f32,
    /// Added to the character position to get height-field coordinates
    pub terrain_offset: f32,
    /// Height-field `z` below which the character wades into the water
    pub shore_z: f32,
    /// Dip per unit of distance past the shore
    pub dip_rate: f32,
    pub max_dip: f32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            start_x: 12.0,
            start_z: 12.0,
            move_speed: 0.5,
            bound: 126.0,
            scale: 0.25,
            terrain_offset: 128.0,
            shore_z: 128.0,
            dip_rate: 0.5,
            max_dip: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    /// Directional light shared by every draw call
    pub light_direction: Vec3,
    pub character: CharacterSettings,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            camera: CameraSettings::default(),
            light_direction: Vec3::new(0.6, -0.8, 0.1),
            character: CharacterSettings::default(),
        }
    }
}

impl ViewerSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&text)?;
        log::info!("Loaded viewer settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(CoveError::InvalidConfig(format!(
                "window size {}x{} is empty",
                self.window.width, self.window.height
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(CoveError::InvalidConfig(format!(
                "camera clip range [{}, {}] is invalid",
                camera.near, camera.far
            )));
        }
        if !(camera.zoom > 0.0 && camera.zoom < 180.0) {
            return Err(CoveError::InvalidConfig(format!(
                "camera field of view {} is outside (0, 180)",
                camera.zoom
            )));
        }
        if camera.world_up.length_squared() <= f32::EPSILON {
            return Err(CoveError::InvalidConfig("camera world_up is zero".to_string()));
        }
        if self.light_direction.length_squared() <= f32::EPSILON {
            return Err(CoveError::InvalidConfig("light direction is zero".to_string()));
        }
        if self.character.bound < 0.0 || self.character.move_speed < 0.0 {
            return Err(CoveError::InvalidConfig(
                "character bound and move speed must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ViewerSettings::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let settings =
            ViewerSettings::from_json_str(r#"{ "window": { "width": 1280 }, "camera": { "speed": 40.0 } }"#)
                .unwrap();
        assert_eq!(settings.window.width, 1280);
        assert_eq!(settings.window.height, 900);
        assert!((settings.camera.speed - 40.0).abs() < 1e-6);
        assert_eq!(settings.camera.presets.len(), 3);
    }

    #[test]
    fn bad_clip_range_is_rejected() {
        let err = ViewerSettings::from_json_str(r#"{ "camera": { "near": 10.0, "far": 1.0 } }"#);
        assert!(matches!(err, Err(CoveError::InvalidConfig(_))));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            ViewerSettings::from_json_str("{ nope"),
            Err(CoveError::JsonError(_))
        ));
    }
}
