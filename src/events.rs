use crate::time::ClockAnomaly;
use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec3;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    ParticlesSpawned { origin: Vec3, count: usize },
    ParticlesCulled { count: usize },
    ParticlesCleared { count: usize },
    RunStateChanged { running: bool },
    Reset,
    ModelAttached { entity: Entity },
    ClockAnomaly { anomaly: ClockAnomaly },
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimEvent::ParticlesSpawned { origin, count } => {
                write!(f, "ParticlesSpawned count={} origin=({:.2}, {:.2}, {:.2})", count, origin.x, origin.y, origin.z)
            }
            SimEvent::ParticlesCulled { count } => write!(f, "ParticlesCulled count={count}"),
            SimEvent::ParticlesCleared { count } => write!(f, "ParticlesCleared count={count}"),
            SimEvent::RunStateChanged { running } => write!(f, "RunStateChanged running={running}"),
            SimEvent::Reset => write!(f, "Reset"),
            SimEvent::ModelAttached { entity } => write!(f, "ModelAttached entity={}", entity.index()),
            SimEvent::ClockAnomaly { anomaly } => write!(f, "ClockAnomaly {anomaly}"),
        }
    }
}

#[derive(Default, Resource)]
pub struct EventBus {
    events: Vec<SimEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
