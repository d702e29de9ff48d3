use crate::config::SceneConfig;
use crate::ecs::{AnimationRoster, SceneWorld, Transform3D};
use bevy_ecs::prelude::Entity;
use glam::{Vec3, Vec4};
use rand::Rng;
use std::f32::consts::PI;

const SHAPE_PALETTE: [u32; 8] = [0xff6b6b, 0x4ecdc4, 0x45b7d1, 0x96ceb4, 0xffeaa7, 0xdda0dd, 0xfab1a0, 0x74b9ff];

pub const PROCEDURAL_MODEL_POSITION: Vec3 = Vec3::new(-15.0, -3.5, -15.0);
pub const LOADED_MODEL_POSITION: Vec3 = Vec3::new(10.0, -5.0, -10.0);
pub const LOADED_MODEL_SCALE: f32 = 2.0;
pub const POINT_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);
pub const SPOT_LIGHT_POSITION: Vec3 = Vec3::new(0.0, 30.0, 0.0);

pub fn rgb_hex(hex: u32) -> Vec4 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec4::new(r, g, b, 1.0)
}

/// Spiral slot for shape `index` out of `count`: two full turns, radius growing from 8 to 20.
pub fn spiral_position(index: u32, count: u32) -> (f32, f32) {
    let t = index as f32 / count.max(1) as f32;
    let angle = t * PI * 4.0;
    let radius = 8.0 + t * 12.0;
    (angle.cos() * radius, angle.sin() * radius)
}

/// Populates the scene with the default animated roster: spiral shapes, the
/// procedural house, and the two orbiting lights.
pub fn spawn_demo_roster(scene: &mut SceneWorld, cfg: &SceneConfig) -> AnimationRoster {
    let mut rng = rand::thread_rng();
    let count = cfg.shape_count;
    let mut shapes = Vec::with_capacity(count as usize);
    for index in 0..count {
        let (x, z) = spiral_position(index, count);
        let transform = Transform3D {
            translation: Vec3::new(x, rng.gen_range(0.0..5.0), z),
            rotation: Vec3::new(rng.gen_range(0.0..PI), rng.gen_range(0.0..PI), rng.gen_range(0.0..PI)),
            scale: Vec3::ONE,
        };
        let color = rgb_hex(SHAPE_PALETTE[index as usize % SHAPE_PALETTE.len()]);
        shapes.push(scene.spawn_shape(index, transform, cfg.shape_pick_radius, color));
    }
    let procedural_model = scene.spawn_object(Transform3D::from_translation(PROCEDURAL_MODEL_POSITION));
    let point_light = scene.spawn_object(Transform3D::from_translation(POINT_LIGHT_POSITION));
    let spot_light = scene.spawn_object(Transform3D::from_translation(SPOT_LIGHT_POSITION));
    AnimationRoster { shapes, procedural_model, orbiting_lights: [point_light, spot_light] }
}

/// Places an externally loaded model the way the loader callback does once
/// decoding finishes.
pub fn spawn_loaded_model(scene: &mut SceneWorld) -> Entity {
    scene.spawn_object(Transform3D {
        translation: LOADED_MODEL_POSITION,
        rotation: Vec3::ZERO,
        scale: Vec3::splat(LOADED_MODEL_SCALE),
    })
}
