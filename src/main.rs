use anyhow::Result;
use glam::Vec3;
use orbit_playground::cli::CliOverrides;
use orbit_playground::config::PlaygroundConfig;
use orbit_playground::scene::spawn_loaded_model;
use orbit_playground::{SimCommand, SimulationController};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG_PATH: &str = "config/playground.json";
const DEFAULT_FRAMES: u32 = 600;
const DEFAULT_FRAME_MS: f64 = 1000.0 / 60.0;
const CAMERA_POSITION: Vec3 = Vec3::new(20.0, 15.0, 20.0);

fn main() {
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    init_tracing(cli.verbose());
    if let Err(err) = run(&cli) {
        eprintln!("Application error: {err:?}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
}

fn run(cli: &CliOverrides) -> Result<()> {
    let mut config = match cli.config_path() {
        Some(path) => PlaygroundConfig::load(path)?,
        None => PlaygroundConfig::load_or_default(DEFAULT_CONFIG_PATH),
    };
    let overrides = cli.config_overrides();
    if !overrides.is_empty() {
        info!(fields = ?overrides.applied_fields(), "applying command line overrides");
        config.apply_overrides(&overrides);
    }

    let frames = cli.frames().unwrap_or(DEFAULT_FRAMES);
    let frame_ms = cli.frame_ms().unwrap_or(DEFAULT_FRAME_MS);
    let report_every = u64::from(config.clock.fps_sample_frames.max(1));

    let mut sim = SimulationController::with_demo_scene(&config);
    let ui = sim.command_sender();
    info!(frames, frame_ms, shapes = config.scene.shape_count, gravity = sim.gravity(), "starting playground");

    let mut timestamp_ms = 0.0;
    for frame in 0..frames {
        script_frame(&mut sim, &ui, frame, frames)?;
        // A backgrounded tab halfway through delivers one long gap.
        timestamp_ms += if frame == frames / 2 { 5000.0 } else { frame_ms };
        sim.tick(timestamp_ms);
        for event in sim.drain_events() {
            debug!(target: "events", "{event}");
        }
        let stats = sim.stats();
        if stats.frame_count > 0 && stats.frame_count % report_every == 0 {
            info!(
                frame = stats.frame_count,
                elapsed = format_args!("{:.1}", stats.elapsed),
                fps = stats.fps.unwrap_or(0),
                particles = stats.particle_count,
                objects = stats.object_count,
                running = stats.running,
                "stats"
            );
        }
    }

    for timing in sim.system_timings() {
        debug!(
            system = timing.name,
            avg_ms = format_args!("{:.4}", timing.average_ms),
            max_ms = format_args!("{:.4}", timing.max_ms),
            samples = timing.samples,
            "system timing"
        );
    }
    let stats = sim.stats();
    info!(elapsed = stats.elapsed, particles = stats.particle_count, "playground finished");
    Ok(())
}

/// Scripted stand-in for the interactive UI: picks, buttons, the async model
/// load, pause/resume and a reset, spread over the run.
fn script_frame(
    sim: &mut SimulationController,
    ui: &orbit_playground::CommandSender,
    frame: u32,
    frames: u32,
) -> Result<()> {
    let at = |fraction: f32| (frames as f32 * fraction) as u32;
    if frame == at(0.05) {
        let target = sim.scene().director().shapes().first().and_then(|track| sim.scene().transform(track.entity));
        if let Some(target) = target {
            match sim.pick_and_spawn(CAMERA_POSITION, target.translation - CAMERA_POSITION)? {
                Some(point) => info!(x = point.x, y = point.y, z = point.z, "pick burst"),
                None => warn!("pick ray missed every shape"),
            }
        }
    }
    if frame == at(0.10) {
        let origin = sim.spawn_random_burst()?;
        info!(x = origin.x, z = origin.z, "button burst");
    }
    if frame == at(0.15) {
        let model = spawn_loaded_model(sim.scene_mut());
        sim.attach_model(model)?;
    }
    if frame == at(0.25) {
        ui.send(SimCommand::RandomizeColors);
        ui.send(SimCommand::Toggle);
    }
    if frame == at(0.35) {
        ui.send(SimCommand::Toggle);
        ui.send(SimCommand::SetGravity(9.8));
    }
    if frame == at(0.70) {
        ui.send(SimCommand::RandomBurst);
    }
    if frame == at(0.85) {
        ui.send(SimCommand::Reset);
    }
    Ok(())
}
