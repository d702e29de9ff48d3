use crate::config::{BurstConfig, PlaygroundConfig};
use crate::ecs::{AnimationDirector, ParticleParams, SceneWorld, SystemTimingSummary};
use crate::error::{ensure_finite, ensure_finite_vec3, SimError, SimResult};
use crate::events::SimEvent;
use crate::scene::spawn_demo_roster;
use crate::time::{Clock, ClockAnomaly};
use bevy_ecs::prelude::Entity;
use glam::Vec3;
use rand::Rng;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

impl RunState {
    pub fn is_running(self) -> bool {
        matches!(self, RunState::Running)
    }

    fn toggled(self) -> Self {
        match self {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnSource {
    Pick,
    Button,
    Default,
}

/// Spawn input as it arrives from an untyped host (UI widgets, scripts).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec3,
    pub count: i64,
}

impl SpawnRequest {
    pub fn new(position: Vec3, count: i64) -> Self {
        Self { position, count }
    }

    fn validated_count(&self) -> SimResult<usize> {
        ensure_finite_vec3("spawn position", self.position)?;
        if self.count < 0 {
            return Err(SimError::invalid(format!("spawn count must be non-negative, got {}", self.count)));
        }
        usize::try_from(self.count)
            .map_err(|_| SimError::invalid(format!("spawn count {} is out of range", self.count)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimCommand {
    Spawn(SpawnRequest),
    RandomBurst,
    Toggle,
    Reset,
    SetGravity(f32),
    ClearParticles,
    RandomizeColors,
}

/// Cloneable handle for feeding commands from other threads. Commands are
/// applied at the start of the next tick.
#[derive(Clone)]
pub struct CommandSender(Sender<SimCommand>);

impl CommandSender {
    /// Returns `false` once the controller has been dropped.
    pub fn send(&self, command: SimCommand) -> bool {
        self.0.send(command).is_ok()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub delta: f32,
    pub elapsed: f32,
    pub culled: usize,
    pub animated: bool,
    pub anomaly: Option<ClockAnomaly>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimStats {
    pub elapsed: f32,
    pub frame_count: u64,
    pub fps: Option<u32>,
    pub particle_count: usize,
    pub object_count: usize,
    pub running: bool,
}

pub struct SimulationController {
    state: RunState,
    clock: Clock,
    scene: SceneWorld,
    gravity: f32,
    bursts: BurstConfig,
    button_spread: f32,
    button_height: f32,
    palette: (f32, f32),
    command_tx: Sender<SimCommand>,
    command_rx: Receiver<SimCommand>,
}

impl SimulationController {
    pub fn new(scene: SceneWorld, cfg: &PlaygroundConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let gravity = if cfg.particles.gravity.is_finite() { cfg.particles.gravity } else { 0.0 };
        Self {
            state: RunState::Running,
            clock: Clock::new(cfg.clock.max_delta, cfg.clock.fps_sample_frames),
            scene,
            gravity,
            bursts: cfg.particles.bursts,
            button_spread: cfg.particles.button_spread.abs(),
            button_height: cfg.particles.button_height,
            palette: (cfg.scene.shape_palette_saturation, cfg.scene.shape_palette_lightness),
            command_tx,
            command_rx,
        }
    }

    /// Controller over the default spiral roster described by `cfg`.
    pub fn with_demo_scene(cfg: &PlaygroundConfig) -> Self {
        let mut scene = SceneWorld::new(ParticleParams::from_config(&cfg.particles));
        let roster = spawn_demo_roster(&mut scene, &cfg.scene);
        scene.install_director(AnimationDirector::new(roster, &cfg.animation));
        Self::new(scene, cfg)
    }

    /// One frame: queued commands, then the clock, then particles and the
    /// director on the same delta.
    pub fn tick(&mut self, raw_timestamp_ms: f64) -> FrameReport {
        self.drain_commands();
        let running = self.state.is_running();
        let tick = self.clock.tick(raw_timestamp_ms, running);
        if let Some(anomaly) = tick.anomaly {
            self.scene.push_event(SimEvent::ClockAnomaly { anomaly });
        }
        // Particles stay live while paused; only the director is gated.
        let culled = match self.scene.integrate_particles(tick.delta, self.gravity) {
            Ok(culled) => culled,
            Err(err) => {
                warn!(target: "controller", %err, "particle integration skipped");
                0
            }
        };
        if running {
            self.scene.animate(tick.elapsed, tick.delta);
        }
        FrameReport { delta: tick.delta, elapsed: tick.elapsed, culled, animated: running, anomaly: tick.anomaly }
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            if let Err(err) = self.apply(command.clone()) {
                warn!(target: "controller", ?command, %err, "queued command rejected");
            }
        }
    }

    pub fn apply(&mut self, command: SimCommand) -> SimResult<()> {
        match command {
            SimCommand::Spawn(request) => self.request_spawn(request).map(|_| ()),
            SimCommand::RandomBurst => self.spawn_random_burst().map(|_| ()),
            SimCommand::Toggle => {
                self.toggle();
                Ok(())
            }
            SimCommand::Reset => {
                self.reset();
                Ok(())
            }
            SimCommand::SetGravity(value) => self.set_gravity(value),
            SimCommand::ClearParticles => {
                self.clear_particles();
                Ok(())
            }
            SimCommand::RandomizeColors => {
                self.randomize_shape_colors();
                Ok(())
            }
        }
    }

    pub fn command_sender(&self) -> CommandSender {
        CommandSender(self.command_tx.clone())
    }

    // ---------- Run state ----------
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn toggle(&mut self) -> RunState {
        self.state = self.state.toggled();
        let running = self.state.is_running();
        info!(target: "controller", running, "run state changed");
        self.scene.push_event(SimEvent::RunStateChanged { running });
        self.state
    }

    /// Back to a running, empty, zero-time simulation. Gravity and other
    /// user-set parameters are kept.
    pub fn reset(&mut self) {
        self.state = RunState::Running;
        self.clock.reset();
        let cleared = self.scene.clear_particles();
        info!(target: "controller", cleared, "simulation reset");
        self.scene.push_event(SimEvent::Reset);
    }

    // ---------- Parameters ----------
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn set_gravity(&mut self, value: f32) -> SimResult<()> {
        ensure_finite("gravity", value)?;
        self.gravity = value;
        Ok(())
    }

    // ---------- Particles ----------
    pub fn burst_size(&self, source: SpawnSource) -> usize {
        let size = match source {
            SpawnSource::Pick => self.bursts.pick,
            SpawnSource::Button => self.bursts.button,
            SpawnSource::Default => self.bursts.default,
        };
        size as usize
    }

    pub fn explode(&mut self, position: Vec3, count: usize) -> SimResult<usize> {
        self.scene.explode(position, count).map(|ids| ids.len())
    }

    pub fn request_spawn(&mut self, request: SpawnRequest) -> SimResult<usize> {
        let count = request.validated_count()?;
        self.explode(request.position, count)
    }

    pub fn spawn_burst(&mut self, position: Vec3, source: SpawnSource) -> SimResult<usize> {
        let count = self.burst_size(source);
        self.explode(position, count)
    }

    /// Burst from a random point above the scene, returning its origin.
    pub fn spawn_random_burst(&mut self) -> SimResult<Vec3> {
        let mut rng = rand::thread_rng();
        let spread = self.button_spread;
        let (x, z) = if spread > 0.0 {
            (rng.gen_range(-spread..spread), rng.gen_range(-spread..spread))
        } else {
            (0.0, 0.0)
        };
        let origin = Vec3::new(x, self.button_height, z);
        self.spawn_burst(origin, SpawnSource::Button)?;
        Ok(origin)
    }

    /// Casts a pointer ray against the shapes and bursts at the nearest hit.
    /// A miss spawns nothing.
    pub fn pick_and_spawn(&mut self, ray_origin: Vec3, ray_direction: Vec3) -> SimResult<Option<Vec3>> {
        ensure_finite_vec3("ray origin", ray_origin)?;
        ensure_finite_vec3("ray direction", ray_direction)?;
        let Some((_, point)) = self.scene.pick_shape(ray_origin, ray_direction) else {
            return Ok(None);
        };
        self.spawn_burst(point, SpawnSource::Pick)?;
        Ok(Some(point))
    }

    pub fn clear_particles(&mut self) -> usize {
        self.scene.clear_particles()
    }

    pub fn particle_count(&self) -> usize {
        self.scene.particle_count()
    }

    // ---------- Scene ----------
    pub fn randomize_shape_colors(&mut self) -> usize {
        let (saturation, lightness) = self.palette;
        self.scene.randomize_shape_colors(saturation, lightness)
    }

    pub fn attach_model(&mut self, entity: Entity) -> SimResult<()> {
        self.scene.attach_model(entity)
    }

    pub fn scene(&self) -> &SceneWorld {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneWorld {
        &mut self.scene
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed_seconds()
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            elapsed: self.clock.elapsed_seconds(),
            frame_count: self.clock.ticks(),
            fps: self.clock.fps(),
            particle_count: self.scene.particle_count(),
            object_count: self.scene.object_count(),
            running: self.state.is_running(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.scene.drain_events()
    }

    pub fn system_timings(&self) -> Vec<SystemTimingSummary> {
        self.scene.system_timings()
    }
}
