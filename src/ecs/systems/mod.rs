use bevy_ecs::prelude::Resource;

mod animation;
mod particles;
mod picking;

pub use animation::*;
pub use particles::*;
pub use picking::*;

#[derive(Resource, Clone, Copy)]
pub struct TimeDelta(pub f32);
