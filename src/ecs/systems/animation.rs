use crate::config::AnimationConfig;
use crate::ecs::profiler::SystemProfiler;
use crate::ecs::types::Transform3D;
use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::{Entity, Query, Res, ResMut, Resource};

/// Time inputs for one animation pass. `elapsed` already includes `delta`.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationFrame {
    pub elapsed: f32,
    pub delta: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectorTuning {
    pub shape_base_speed: f32,
    pub shape_speed_step: f32,
    pub shape_speed_bands: u32,
    pub shape_yaw_ratio: f32,
    pub float_amplitude: f32,
    pub procedural_model_spin: f32,
    pub loaded_model_spin: f32,
}

impl DirectorTuning {
    pub fn from_config(cfg: &AnimationConfig) -> Self {
        Self {
            shape_base_speed: cfg.shape_base_speed,
            shape_speed_step: cfg.shape_speed_step,
            shape_speed_bands: cfg.shape_speed_bands.max(1),
            shape_yaw_ratio: cfg.shape_yaw_ratio,
            float_amplitude: cfg.float_amplitude,
            procedural_model_spin: cfg.procedural_model_spin,
            loaded_model_spin: cfg.loaded_model_spin,
        }
    }

    pub fn shape_speed(&self, index: u32) -> f32 {
        self.shape_base_speed + (index % self.shape_speed_bands.max(1)) as f32 * self.shape_speed_step
    }
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeTrack {
    pub entity: Entity,
    pub index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitTrack {
    pub entity: Entity,
    pub radius: f32,
    pub rate: f32,
}

impl OrbitTrack {
    pub fn position_xz(&self, elapsed: f32) -> (f32, f32) {
        let angle = elapsed * self.rate;
        (angle.sin() * self.radius, angle.cos() * self.radius)
    }
}

/// Slot for a model that arrives asynchronously. Filled at most once.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModelSlot(Option<Entity>);

impl ModelSlot {
    pub fn get(&self) -> Option<Entity> {
        self.0
    }

    pub fn fill(&mut self, entity: Entity) -> SimResult<()> {
        match self.0 {
            Some(existing) => Err(SimError::ModelSlotOccupied(existing.index())),
            None => {
                self.0 = Some(entity);
                Ok(())
            }
        }
    }
}

/// Handles the director animates, supplied by whoever built the scene.
#[derive(Clone, Debug)]
pub struct AnimationRoster {
    pub shapes: Vec<Entity>,
    pub procedural_model: Entity,
    pub orbiting_lights: [Entity; 2],
}

#[derive(Resource, Clone, Debug, Default)]
pub struct AnimationDirector {
    shapes: Vec<ShapeTrack>,
    procedural_model: Option<Entity>,
    loaded_model: ModelSlot,
    lights: Vec<OrbitTrack>,
    tuning: DirectorTuning,
}

impl AnimationDirector {
    pub fn new(roster: AnimationRoster, cfg: &AnimationConfig) -> Self {
        let shapes = roster
            .shapes
            .iter()
            .enumerate()
            .map(|(index, &entity)| ShapeTrack { entity, index: index as u32 })
            .collect();
        let [light_a, light_b] = roster.orbiting_lights;
        let [orbit_a, orbit_b] = cfg.orbits;
        let lights = vec![
            OrbitTrack { entity: light_a, radius: orbit_a.radius, rate: orbit_a.rate },
            OrbitTrack { entity: light_b, radius: orbit_b.radius, rate: orbit_b.rate },
        ];
        Self {
            shapes,
            procedural_model: Some(roster.procedural_model),
            loaded_model: ModelSlot::default(),
            lights,
            tuning: DirectorTuning::from_config(cfg),
        }
    }

    pub fn shapes(&self) -> &[ShapeTrack] {
        &self.shapes
    }

    pub fn lights(&self) -> &[OrbitTrack] {
        &self.lights
    }

    pub fn procedural_model(&self) -> Option<Entity> {
        self.procedural_model
    }

    pub fn loaded_model(&self) -> Option<Entity> {
        self.loaded_model.get()
    }

    pub fn tuning(&self) -> &DirectorTuning {
        &self.tuning
    }

    pub fn attach_model(&mut self, entity: Entity) -> SimResult<()> {
        self.loaded_model.fill(entity)
    }
}

pub fn sys_animate_shapes(
    mut profiler: ResMut<SystemProfiler>,
    director: Res<AnimationDirector>,
    frame: Res<AnimationFrame>,
    mut transforms: Query<&mut Transform3D>,
) {
    let _span = profiler.span("sys_animate_shapes");
    let tuning = director.tuning;
    for track in &director.shapes {
        let Ok(mut transform) = transforms.get_mut(track.entity) else {
            continue;
        };
        let speed = tuning.shape_speed(track.index);
        transform.rotation.x += speed * frame.delta;
        transform.rotation.y += speed * frame.delta * tuning.shape_yaw_ratio;
        // Added every tick, so the float compounds rather than tracing a fixed sinusoid.
        transform.translation.y += (frame.elapsed * speed + track.index as f32).sin() * tuning.float_amplitude;
    }
}

pub fn sys_spin_models(
    mut profiler: ResMut<SystemProfiler>,
    director: Res<AnimationDirector>,
    frame: Res<AnimationFrame>,
    mut transforms: Query<&mut Transform3D>,
) {
    let _span = profiler.span("sys_spin_models");
    let spins = [
        (director.procedural_model, director.tuning.procedural_model_spin),
        (director.loaded_model.get(), director.tuning.loaded_model_spin),
    ];
    for (entity, spin) in spins {
        let Some(entity) = entity else {
            continue;
        };
        if let Ok(mut transform) = transforms.get_mut(entity) {
            transform.rotation.y += frame.delta * spin;
        }
    }
}

pub fn sys_orbit_lights(
    mut profiler: ResMut<SystemProfiler>,
    director: Res<AnimationDirector>,
    frame: Res<AnimationFrame>,
    mut transforms: Query<&mut Transform3D>,
) {
    let _span = profiler.span("sys_orbit_lights");
    for orbit in &director.lights {
        if let Ok(mut transform) = transforms.get_mut(orbit.entity) {
            let (x, z) = orbit.position_xz(frame.elapsed);
            transform.translation.x = x;
            transform.translation.z = z;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    #[test]
    fn shape_speed_cycles_through_bands() {
        let tuning = DirectorTuning::default();
        let speeds: Vec<f32> = (0..4).map(|i| tuning.shape_speed(i)).collect();
        assert!((speeds[0] - 0.5).abs() < 1e-6);
        assert!((speeds[1] - 0.8).abs() < 1e-6);
        assert!((speeds[2] - 1.1).abs() < 1e-6);
        assert!((speeds[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn model_slot_fills_once() {
        let mut world = World::new();
        let first = world.spawn_empty().id();
        let second = world.spawn_empty().id();
        let mut slot = ModelSlot::default();
        assert!(slot.fill(first).is_ok());
        assert_eq!(slot.fill(second), Err(SimError::ModelSlotOccupied(first.index())));
        assert_eq!(slot.get(), Some(first));
    }

    #[test]
    fn orbit_starts_on_positive_z() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let orbit = OrbitTrack { entity, radius: 20.0, rate: 1.0 };
        let (x, z) = orbit.position_xz(0.0);
        assert_eq!((x, z), (0.0, 20.0));
        let (x, z) = orbit.position_xz(std::f32::consts::FRAC_PI_2);
        assert!((x - 20.0).abs() < 1e-4 && z.abs() < 1e-4);
    }

    #[test]
    fn director_tracks_both_lights() {
        let mut world = World::new();
        let house = world.spawn_empty().id();
        let lights = [world.spawn_empty().id(), world.spawn_empty().id()];
        let roster = AnimationRoster { shapes: Vec::new(), procedural_model: house, orbiting_lights: lights };
        let director = AnimationDirector::new(roster, &AnimationConfig::default());
        let tracks: Vec<_> = director.lights().iter().map(|o| (o.entity, o.radius, o.rate)).collect();
        assert_eq!(tracks, vec![(lights[0], 20.0, 1.0), (lights[1], 15.0, 0.7)]);
    }
}
