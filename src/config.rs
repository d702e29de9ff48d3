use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "ClockConfig::default_max_delta")]
    pub max_delta: f32,
    #[serde(default = "ClockConfig::default_fps_sample_frames")]
    pub fps_sample_frames: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BurstConfig {
    #[serde(default = "BurstConfig::default_pick")]
    pub pick: u32,
    #[serde(default = "BurstConfig::default_button")]
    pub button: u32,
    #[serde(default = "BurstConfig::default_default")]
    pub default: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "ParticleConfig::default_gravity")]
    pub gravity: f32,
    #[serde(default = "ParticleConfig::default_floor")]
    pub floor: f32,
    #[serde(default = "ParticleConfig::default_horizontal_speed")]
    pub horizontal_speed: f32,
    #[serde(default = "ParticleConfig::default_min_launch_speed")]
    pub min_launch_speed: f32,
    #[serde(default = "ParticleConfig::default_max_launch_speed")]
    pub max_launch_speed: f32,
    #[serde(default = "ParticleConfig::default_saturation")]
    pub saturation: f32,
    #[serde(default = "ParticleConfig::default_lightness")]
    pub lightness: f32,
    #[serde(default)]
    pub bursts: BurstConfig,
    #[serde(default = "ParticleConfig::default_button_spread")]
    pub button_spread: f32,
    #[serde(default = "ParticleConfig::default_button_height")]
    pub button_height: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrbitConfig {
    pub radius: f32,
    pub rate: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "AnimationConfig::default_shape_base_speed")]
    pub shape_base_speed: f32,
    #[serde(default = "AnimationConfig::default_shape_speed_step")]
    pub shape_speed_step: f32,
    #[serde(default = "AnimationConfig::default_shape_speed_bands")]
    pub shape_speed_bands: u32,
    #[serde(default = "AnimationConfig::default_shape_yaw_ratio")]
    pub shape_yaw_ratio: f32,
    #[serde(default = "AnimationConfig::default_float_amplitude")]
    pub float_amplitude: f32,
    #[serde(default = "AnimationConfig::default_procedural_model_spin")]
    pub procedural_model_spin: f32,
    #[serde(default = "AnimationConfig::default_loaded_model_spin")]
    pub loaded_model_spin: f32,
    #[serde(default = "AnimationConfig::default_orbits")]
    pub orbits: [OrbitConfig; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "SceneConfig::default_shape_count")]
    pub shape_count: u32,
    #[serde(default = "SceneConfig::default_shape_pick_radius")]
    pub shape_pick_radius: f32,
    #[serde(default = "SceneConfig::default_palette_saturation")]
    pub shape_palette_saturation: f32,
    #[serde(default = "SceneConfig::default_palette_lightness")]
    pub shape_palette_lightness: f32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlaygroundConfig {
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub particles: ParticleConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub scene: SceneConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub gravity: Option<f32>,
    pub shape_count: Option<u32>,
}

impl ClockConfig {
    fn default_max_delta() -> f32 {
        1.0 / 15.0
    }

    const fn default_fps_sample_frames() -> u32 {
        60
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { max_delta: Self::default_max_delta(), fps_sample_frames: Self::default_fps_sample_frames() }
    }
}

impl BurstConfig {
    const fn default_pick() -> u32 {
        15
    }

    const fn default_button() -> u32 {
        30
    }

    const fn default_default() -> u32 {
        20
    }
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self { pick: Self::default_pick(), button: Self::default_button(), default: Self::default_default() }
    }
}

impl ParticleConfig {
    fn default_gravity() -> f32 {
        0.5
    }

    fn default_floor() -> f32 {
        -10.0
    }

    fn default_horizontal_speed() -> f32 {
        5.0
    }

    fn default_min_launch_speed() -> f32 {
        5.0
    }

    fn default_max_launch_speed() -> f32 {
        20.0
    }

    fn default_saturation() -> f32 {
        1.0
    }

    fn default_lightness() -> f32 {
        0.5
    }

    fn default_button_spread() -> f32 {
        15.0
    }

    fn default_button_height() -> f32 {
        10.0
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            gravity: Self::default_gravity(),
            floor: Self::default_floor(),
            horizontal_speed: Self::default_horizontal_speed(),
            min_launch_speed: Self::default_min_launch_speed(),
            max_launch_speed: Self::default_max_launch_speed(),
            saturation: Self::default_saturation(),
            lightness: Self::default_lightness(),
            bursts: BurstConfig::default(),
            button_spread: Self::default_button_spread(),
            button_height: Self::default_button_height(),
        }
    }
}

impl AnimationConfig {
    fn default_shape_base_speed() -> f32 {
        0.5
    }

    fn default_shape_speed_step() -> f32 {
        0.3
    }

    const fn default_shape_speed_bands() -> u32 {
        3
    }

    fn default_shape_yaw_ratio() -> f32 {
        0.7
    }

    fn default_float_amplitude() -> f32 {
        0.01
    }

    fn default_procedural_model_spin() -> f32 {
        0.5
    }

    fn default_loaded_model_spin() -> f32 {
        0.3
    }

    fn default_orbits() -> [OrbitConfig; 2] {
        [OrbitConfig { radius: 20.0, rate: 1.0 }, OrbitConfig { radius: 15.0, rate: 0.7 }]
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            shape_base_speed: Self::default_shape_base_speed(),
            shape_speed_step: Self::default_shape_speed_step(),
            shape_speed_bands: Self::default_shape_speed_bands(),
            shape_yaw_ratio: Self::default_shape_yaw_ratio(),
            float_amplitude: Self::default_float_amplitude(),
            procedural_model_spin: Self::default_procedural_model_spin(),
            loaded_model_spin: Self::default_loaded_model_spin(),
            orbits: Self::default_orbits(),
        }
    }
}

impl SceneConfig {
    const fn default_shape_count() -> u32 {
        25
    }

    fn default_shape_pick_radius() -> f32 {
        1.2
    }

    fn default_palette_saturation() -> f32 {
        0.7
    }

    fn default_palette_lightness() -> f32 {
        0.5
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            shape_count: Self::default_shape_count(),
            shape_pick_radius: Self::default_shape_pick_radius(),
            shape_palette_saturation: Self::default_palette_saturation(),
            shape_palette_lightness: Self::default_palette_lightness(),
        }
    }
}

impl PlaygroundConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(gravity) = overrides.gravity {
            self.particles.gravity = gravity;
        }
        if let Some(shape_count) = overrides.shape_count {
            self.scene.shape_count = shape_count;
        }
    }
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.gravity.is_none() && self.shape_count.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.gravity.is_some() {
            fields.push("gravity");
        }
        if self.shape_count.is_some() {
            fields.push("shape_count");
        }
        fields
    }
}
