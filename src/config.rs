//! Viewer Configuration
//!
//! [`ViewerConfig`] gathers every constant the viewer needs at startup: asset
//! paths, camera and light placement, the default animation clip and render
//! settings. All fields have defaults, so a JSON file only needs to name the
//! values it overrides:
//!
//! ```json
//! { "assets": { "model": "data/robot.glb" }, "animation": { "default_clip": "Idle" } }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;

use crate::errors::Result;

/// Environment variable overriding [`AssetConfig::model`].
pub const MODEL_ENV: &str = "ANIM_GLASS_MODEL";
/// Environment variable overriding [`AssetConfig::background`].
pub const BACKGROUND_ENV: &str = "ANIM_GLASS_BACKGROUND";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub animation: AnimationConfig,
    pub render: RenderSettings,
}

impl ViewerConfig {
    /// Reads a JSON configuration file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies `ANIM_GLASS_MODEL` / `ANIM_GLASS_BACKGROUND` when set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var(MODEL_ENV) {
            self.assets.model = PathBuf::from(model);
        }
        if let Ok(background) = std::env::var(BACKGROUND_ENV) {
            self.assets.background = Some(PathBuf::from(background));
        }
        self
    }

    #[must_use]
    pub fn with_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.assets.model = path.into();
        self
    }

    #[must_use]
    pub fn with_default_clip(mut self, name: impl Into<String>) -> Self {
        self.animation.default_clip = name.into();
        self
    }

    #[must_use]
    pub fn with_render_settings(mut self, settings: RenderSettings) -> Self {
        self.render = settings;
        self
    }
}

/// Window title and initial logical size.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "anim-glass".to_string(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Asset locations, relative to the working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Background image. `None` keeps the clear color.
    pub background: Option<PathBuf>,
    /// glTF / GLB model carrying the animation clips.
    pub model: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            background: Some(PathBuf::from("data/cac1web.jpg")),
            model: PathBuf::from("data4/model.glb"),
        }
    }
}

/// Perspective camera placement. `fov` is vertical, in degrees.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Orbit center.
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 40.0,
            near: 100.0,
            far: 1000.0,
            position: Vec3::new(0.0, 4.0, 300.0),
            target: Vec3::ZERO,
        }
    }
}

/// The single directional light. It shines from `position` toward the origin.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Packed `0xRRGGBB` color.
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: 0x00F0_0FFF,
            intensity: 80.0,
            position: Vec3::new(100.0, -500.0, 1000.0),
        }
    }
}

/// Animation controller settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Clip started as soon as the model finishes loading.
    pub default_clip: String,
    /// Cross-fade duration in seconds.
    pub fade_duration: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_clip: "Break".to_string(),
            fade_duration: 0.5,
        }
    }
}

/// GPU-side settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub vsync: bool,
    /// MSAA sample count (1 disables antialiasing).
    pub msaa_samples: u32,
    /// Linear RGBA clear color used until a background is available.
    pub clear_color: [f64; 4],
    /// Ambient term added to the directional light.
    pub ambient: [f32; 3],
    #[serde(skip, default = "default_power_preference")]
    pub power_preference: wgpu::PowerPreference,
}

fn default_power_preference() -> wgpu::PowerPreference {
    wgpu::PowerPreference::HighPerformance
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            msaa_samples: 4,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            ambient: [0.1, 0.1, 0.1],
            power_preference: default_power_preference(),
        }
    }
}

impl RenderSettings {
    #[must_use]
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

/// Converts a packed `0xRRGGBB` color to linear-ish RGB in `[0, 1]`.
#[must_use]
pub fn color_from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
    let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
    let b = (hex & 0xFF) as f32 / 255.0;
    Vec3::new(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_scene() {
        let config = ViewerConfig::default();
        assert_eq!(config.animation.default_clip, "Break");
        assert!((config.animation.fade_duration - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.camera.position, Vec3::new(0.0, 4.0, 300.0));
        assert_eq!(config.light.color, 0xF00FFF);
        assert_eq!(config.assets.model, PathBuf::from("data4/model.glb"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{ "assets": { "model": "robot.glb" }, "animation": { "default_clip": "Idle" } }"#,
        )
        .unwrap();
        assert_eq!(config.assets.model, PathBuf::from("robot.glb"));
        assert_eq!(
            config.assets.background,
            Some(PathBuf::from("data/cac1web.jpg"))
        );
        assert_eq!(config.animation.default_clip, "Idle");
        assert_eq!(config.render.msaa_samples, 4);
    }

    #[test]
    fn camera_vectors_parse_from_arrays() {
        let config =
            ViewerConfig::from_json_str(r#"{ "camera": { "position": [1.0, 2.0, 3.0] } }"#)
                .unwrap();
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((config.camera.fov - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ViewerConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn hex_color_unpacks_channels() {
        let c = color_from_hex(0xFF8000);
        assert!((c.x - 1.0).abs() < 1e-6);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert!(c.z.abs() < 1e-6);
    }
}
