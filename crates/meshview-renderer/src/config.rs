//! Viewer configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::{Camera, Projection};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid viewer config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Camera navigation speeds, applied to raw pixel deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensitivity {
    /// Pan
    pub move_speed: f32,
    /// Orbit and roll
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            move_speed: 0.005,
            rotate_speed: 0.01,
            zoom_speed: 0.01,
        }
    }
}

/// Handle sizes and hit-test tolerance, in camera-plane units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    pub pick_tolerance: f32,
    pub handle_length: f32,
    pub ring_radius: f32,
    pub ring_samples: u32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            pick_tolerance: 0.05,
            handle_length: 0.3,
            ring_radius: 0.3,
            ring_samples: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pixel deltas are divided by this before reaching the gizmo
    pub pointer_scale: f32,
    /// Side of the square viewport in pixels
    pub viewport_size: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pointer_scale: 300.0,
            viewport_size: 600.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub sensitivity: Sensitivity,
    pub gizmo: GizmoConfig,
    pub input: InputConfig,
    pub initial_camera: Camera,
    pub projection: Projection,
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
