mod profiler;
mod systems;
mod types;
mod world;

pub use profiler::*;
pub use systems::*;
pub use types::*;
pub use world::*;
