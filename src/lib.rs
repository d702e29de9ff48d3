pub mod cli;
pub mod config;
pub mod controller;
pub mod ecs;
pub mod error;
pub mod events;
pub mod scene;
pub mod time;

pub use controller::{
    CommandSender, FrameReport, RunState, SimCommand, SimStats, SimulationController, SpawnRequest, SpawnSource,
};
pub use error::{SimError, SimResult};
