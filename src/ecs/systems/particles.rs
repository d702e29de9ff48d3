use super::TimeDelta;
use crate::ecs::profiler::SystemProfiler;
use crate::ecs::types::*;
use crate::events::{EventBus, SimEvent};
use bevy_ecs::prelude::*;
use tracing::debug;

/// Semi-implicit Euler: velocity picks up gravity before it moves the particle.
pub fn sys_integrate_particles(
    mut profiler: ResMut<SystemProfiler>,
    mut particles: Query<(&mut Transform3D, &mut Velocity), With<Particle>>,
    gravity: Res<ParticleGravity>,
    dt: Res<TimeDelta>,
) {
    let _span = profiler.span("sys_integrate_particles");
    for (mut transform, mut velocity) in &mut particles {
        velocity.0.y -= gravity.0 * dt.0;
        transform.translation += velocity.0 * dt.0;
    }
}

pub fn sys_cull_particles(
    mut profiler: ResMut<SystemProfiler>,
    mut commands: Commands,
    particles: Query<(Entity, &Transform3D), With<Particle>>,
    params: Res<ParticleParams>,
    mut state: ResMut<ParticleState>,
    mut events: ResMut<EventBus>,
) {
    let _span = profiler.span("sys_cull_particles");
    let mut culled = 0u32;
    for (entity, transform) in &particles {
        if transform.translation.y < params.floor {
            commands.entity(entity).despawn();
            culled += 1;
        }
    }
    if culled == 0 {
        return;
    }
    state.culled_total += u64::from(culled);
    debug!(target: "particles", culled, culled_total = state.culled_total, "culled particles below floor");
    events.push(SimEvent::ParticlesCulled { count: culled as usize });
}
