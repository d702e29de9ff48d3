use super::*;
use crate::error::{ensure_finite, ensure_finite_vec3, SimError, SimResult};
use crate::events::{EventBus, SimEvent};
use bevy_ecs::prelude::{Entity, Schedule, With, World};
use bevy_ecs::schedule::IntoSystemConfigs;
use glam::{Vec3, Vec4};
use rand::Rng;
use tracing::{debug, info};

// ---------- World container ----------
/// Scene graph shared with the renderer. Particles and animated objects are
/// entities; the particle and animation passes run as separate schedules so
/// the controller can gate them independently.
pub struct SceneWorld {
    pub world: World,
    schedule_particles: Schedule,
    schedule_animation: Schedule,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new(ParticleParams::default())
    }
}

impl SceneWorld {
    pub fn new(params: ParticleParams) -> Self {
        let mut world = World::new();
        world.insert_resource(TimeDelta(0.0));
        world.insert_resource(AnimationFrame::default());
        world.insert_resource(ParticleGravity(0.0));
        world.insert_resource(params);
        world.insert_resource(ParticleState::default());
        world.insert_resource(AnimationDirector::default());
        world.insert_resource(EventBus::default());
        world.insert_resource(SystemProfiler::new());

        let mut schedule_particles = Schedule::default();
        schedule_particles.add_systems((sys_integrate_particles, sys_cull_particles).chain());

        let mut schedule_animation = Schedule::default();
        schedule_animation.add_systems((sys_animate_shapes, sys_spin_models, sys_orbit_lights).chain());

        Self { world, schedule_particles, schedule_animation }
    }

    fn emit(&mut self, event: SimEvent) {
        self.world.resource_mut::<EventBus>().push(event);
    }

    pub fn push_event(&mut self, event: SimEvent) {
        self.emit(event);
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.world.resource_mut::<EventBus>().drain()
    }

    // ---------- Particles ----------
    pub fn particle_params(&self) -> ParticleParams {
        *self.world.resource::<ParticleParams>()
    }

    pub fn spawn_particle(&mut self, position: Vec3) -> SimResult<ParticleId> {
        let ids = self.explode(position, 1)?;
        ids.into_iter().next().ok_or_else(|| SimError::invalid("particle spawn produced no entity"))
    }

    /// Spawns a particle with caller-chosen velocity and color instead of sampled ones.
    pub fn spawn_particle_with(&mut self, position: Vec3, velocity: Vec3, color: Vec4) -> SimResult<ParticleId> {
        ensure_finite_vec3("particle position", position)?;
        ensure_finite_vec3("particle velocity", velocity)?;
        if !color.is_finite() {
            return Err(SimError::invalid(format!("particle color must be finite, got {color:?}")));
        }
        let entity = self
            .world
            .spawn((Transform3D::from_translation(position), Velocity(velocity), Tint(color), Particle))
            .id();
        self.record_spawned(position, 1);
        Ok(entity)
    }

    /// Spawns `count` particles at one origin, each with independently sampled
    /// velocity and color.
    pub fn explode(&mut self, position: Vec3, count: usize) -> SimResult<Vec<ParticleId>> {
        ensure_finite_vec3("explosion origin", position)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let params = self.particle_params();
        let mut rng = rand::thread_rng();
        let mut batch = Vec::with_capacity(count);
        for _ in 0..count {
            batch.push((
                Transform3D::from_translation(position),
                Velocity(params.sample_velocity(&mut rng)),
                Tint(params.sample_color(&mut rng)),
                Particle,
            ));
        }
        let ids: Vec<Entity> = self.world.spawn_batch(batch).collect();
        self.record_spawned(position, ids.len());
        Ok(ids)
    }

    fn record_spawned(&mut self, origin: Vec3, count: usize) {
        self.world.resource_mut::<ParticleState>().spawned_total += count as u64;
        debug!(target: "particles", count, x = origin.x, y = origin.y, z = origin.z, "spawned particles");
        self.emit(SimEvent::ParticlesSpawned { origin, count });
    }

    /// Advances every particle by `dt` under `gravity`, then removes those below
    /// the floor. Returns how many were removed.
    pub fn integrate_particles(&mut self, dt: f32, gravity: f32) -> SimResult<usize> {
        ensure_finite("delta time", dt)?;
        ensure_finite("gravity", gravity)?;
        if dt < 0.0 {
            return Err(SimError::invalid(format!("delta time must be non-negative, got {dt}")));
        }
        self.world.resource_mut::<TimeDelta>().0 = dt;
        self.world.resource_mut::<ParticleGravity>().0 = gravity;
        let before = self.world.resource::<ParticleState>().culled_total;
        self.schedule_particles.run(&mut self.world);
        let after = self.world.resource::<ParticleState>().culled_total;
        Ok((after - before) as usize)
    }

    pub fn clear_particles(&mut self) -> usize {
        let particles: Vec<Entity> = {
            let mut query = self.world.query_filtered::<Entity, With<Particle>>();
            query.iter(&self.world).collect()
        };
        let removed = particles.len();
        for entity in particles {
            let _ = self.world.despawn(entity);
        }
        if removed > 0 {
            self.emit(SimEvent::ParticlesCleared { count: removed });
        }
        removed
    }

    /// Live particles in the world, however they were removed.
    pub fn particle_count(&self) -> usize {
        self.world.iter_entities().filter(|entity| entity.contains::<Particle>()).count()
    }

    pub fn particle_state(&self) -> ParticleState {
        *self.world.resource::<ParticleState>()
    }

    pub fn particle_ids(&mut self) -> Vec<ParticleId> {
        let mut query = self.world.query_filtered::<Entity, With<Particle>>();
        query.iter(&self.world).collect()
    }

    pub fn velocity(&self, entity: Entity) -> Option<Vec3> {
        self.world.get::<Velocity>(entity).map(|v| v.0)
    }

    pub fn tint(&self, entity: Entity) -> Option<Vec4> {
        self.world.get::<Tint>(entity).map(|t| t.0)
    }

    pub fn collect_particle_instances(&mut self) -> Vec<ParticleInstance> {
        let mut query = self.world.query_filtered::<(&Transform3D, &Tint), With<Particle>>();
        query
            .iter(&self.world)
            .map(|(transform, tint)| ParticleInstance {
                model: transform.to_matrix().to_cols_array_2d(),
                color: tint.0.to_array(),
            })
            .collect()
    }

    // ---------- Scene objects ----------
    pub fn spawn_object(&mut self, transform: Transform3D) -> Entity {
        self.world.spawn(transform).id()
    }

    pub fn spawn_shape(&mut self, index: u32, transform: Transform3D, radius: f32, color: Vec4) -> Entity {
        self.world.spawn((transform, Shape { index }, ShapeBounds { radius: radius.max(0.0) }, Tint(color))).id()
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform3D> {
        self.world.get::<Transform3D>(entity).copied()
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform3D) -> bool {
        if let Some(mut current) = self.world.get_mut::<Transform3D>(entity) {
            *current = transform;
            true
        } else {
            false
        }
    }

    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity)
    }

    pub fn entity_exists(&self, entity: Entity) -> bool {
        self.world.get_entity(entity).is_ok()
    }

    pub fn object_count(&self) -> usize {
        self.world.entities().len() as usize
    }

    pub fn randomize_shape_colors(&mut self, saturation: f32, lightness: f32) -> usize {
        let mut rng = rand::thread_rng();
        let mut query = self.world.query_filtered::<&mut Tint, With<Shape>>();
        let mut recolored = 0;
        for mut tint in query.iter_mut(&mut self.world) {
            tint.0 = hsl_tint(rng.gen::<f32>(), saturation, lightness);
            recolored += 1;
        }
        recolored
    }

    /// Nearest shape whose bounding sphere the ray crosses, with the hit point.
    pub fn pick_shape(&mut self, origin: Vec3, direction: Vec3) -> Option<(Entity, Vec3)> {
        if !origin.is_finite() || !direction.is_finite() || direction.length_squared() <= f32::EPSILON {
            return None;
        }
        let dir = direction.normalize();
        let mut query = self.world.query::<(Entity, &Transform3D, &ShapeBounds)>();
        query
            .iter(&self.world)
            .filter_map(|(entity, transform, bounds)| {
                ray_hit_shape(origin, dir, transform, bounds).map(|distance| (entity, distance))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(entity, distance)| (entity, origin + dir * distance))
    }

    // ---------- Animation ----------
    pub fn install_director(&mut self, director: AnimationDirector) {
        self.world.insert_resource(director);
    }

    pub fn director(&self) -> &AnimationDirector {
        self.world.resource::<AnimationDirector>()
    }

    pub fn attach_model(&mut self, entity: Entity) -> SimResult<()> {
        if !self.entity_exists(entity) {
            return Err(SimError::invalid(format!("model entity {} does not exist", entity.index())));
        }
        self.world.resource_mut::<AnimationDirector>().attach_model(entity)?;
        info!(target: "animation", entity = entity.index(), "loaded model attached");
        self.emit(SimEvent::ModelAttached { entity });
        Ok(())
    }

    pub fn animate(&mut self, elapsed: f32, delta: f32) {
        *self.world.resource_mut::<AnimationFrame>() = AnimationFrame { elapsed, delta };
        self.schedule_animation.run(&mut self.world);
    }

    pub fn system_timings(&self) -> Vec<SystemTimingSummary> {
        self.world.resource::<SystemProfiler>().summaries()
    }
}
