use crate::config::ParticleConfig;
use bevy_ecs::prelude::*;
use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

/// Handle to a live particle; particles are plain entities in the scene world.
pub type ParticleId = Entity;

// ---------- Components ----------
/// Scene-space transform. Rotation is an XYZ Euler triple so per-axis spin
/// accumulates the same way the renderer reads it.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}
impl Default for Transform3D {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Vec3::ZERO, scale: Vec3::ONE }
    }
}
impl Transform3D {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.translation)
    }
}

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Velocity(pub Vec3);
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Tint(pub Vec4);
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Particle;
#[derive(Component, Clone, Copy, Debug)]
pub struct Shape {
    pub index: u32,
}
#[derive(Component, Clone, Copy, Debug)]
pub struct ShapeBounds {
    pub radius: f32,
}

// ---------- Resources ----------
#[derive(Resource, Clone, Copy, Debug)]
pub struct ParticleGravity(pub f32);

#[derive(Resource, Clone, Copy, Debug)]
pub struct ParticleParams {
    pub horizontal_speed: f32,
    pub min_launch_speed: f32,
    pub max_launch_speed: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub floor: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self::from_config(&ParticleConfig::default())
    }
}

impl ParticleParams {
    pub fn from_config(cfg: &ParticleConfig) -> Self {
        let min_launch_speed = cfg.min_launch_speed.min(cfg.max_launch_speed);
        Self {
            horizontal_speed: cfg.horizontal_speed.abs(),
            min_launch_speed,
            max_launch_speed: cfg.max_launch_speed.max(min_launch_speed),
            saturation: cfg.saturation.clamp(0.0, 1.0),
            lightness: cfg.lightness.clamp(0.0, 1.0),
            floor: cfg.floor,
        }
    }

    pub fn sample_velocity(&self, rng: &mut impl rand::Rng) -> Vec3 {
        let h = self.horizontal_speed;
        let vx = if h > 0.0 { rng.gen_range(-h..h) } else { 0.0 };
        let vz = if h > 0.0 { rng.gen_range(-h..h) } else { 0.0 };
        let vy = if self.max_launch_speed > self.min_launch_speed {
            rng.gen_range(self.min_launch_speed..self.max_launch_speed)
        } else {
            self.min_launch_speed
        };
        Vec3::new(vx, vy, vz)
    }

    pub fn sample_color(&self, rng: &mut impl rand::Rng) -> Vec4 {
        hsl_tint(rng.gen::<f32>(), self.saturation, self.lightness)
    }
}

/// Lifetime totals. The live count is read from the world itself.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParticleState {
    pub spawned_total: u64,
    pub culled_total: u64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

// ---------- Color ----------
/// HSL to linear RGB with hue normalized to `[0, 1)`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    let h = hue.rem_euclid(1.0) * 360.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;
    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    Vec3::new(r + m, g + m, b + m)
}

pub fn hsl_tint(hue: f32, saturation: f32, lightness: f32) -> Vec4 {
    hsl_to_rgb(hue, saturation, lightness).extend(1.0)
}
