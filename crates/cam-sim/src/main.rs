//! Headless viewpoint runner
//!
//! Replays a scripted session against the viewpoint rig with recording
//! backends and writes every transition to `events.jsonl`, next to the
//! resolved `config.toml`.

use cam_sim::{EventLogger, Scenario, Simulation};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use viewpoint::{RigConfig, ViewOwner};

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "cam_sim")]
#[command(about = "Replays a scripted session against the viewpoint rig")]
struct Args {
    /// Rig configuration (TOML); falls back to the scenario's [rig] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenario file (TOML)
    #[arg(long)]
    scenario: PathBuf,

    /// Seed for feed jitter; overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per simulated second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seconds to simulate; defaults to the scenario duration
    #[arg(long)]
    seconds: Option<f32>,

    /// Directory for events.jsonl and config.toml
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let scenario = match Scenario::from_file(&args.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Error: could not load scenario {}: {}", args.scenario.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut config = match &args.config {
        Some(path) => match RigConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: could not load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => scenario.rig.clone().unwrap_or_default(),
    };
    if let Some(seed) = args.seed {
        config.feeds.seed = Some(seed);
    }

    let seconds = args.seconds.unwrap_or(scenario.duration);

    println!("Viewpoint Runner");
    println!("================");
    println!("Scenario: {}", scenario.name);
    println!("Seed: {}", config.feeds.seed.map_or("entropy".to_string(), |s| s.to_string()));
    println!("FPS: {}", args.fps);
    println!("Seconds: {}", seconds);
    println!("Steps: {}", scenario.steps.len());
    println!();

    fs::create_dir_all(&args.output).unwrap_or_else(|e| {
        eprintln!("Warning: Could not create output directory: {}", e);
    });
    let config_path = args.output.join("config.toml");
    match config.to_toml() {
        Ok(toml) => {
            if let Err(e) = fs::write(&config_path, toml) {
                eprintln!("Warning: Could not write {}: {}", config_path.display(), e);
            }
        }
        Err(e) => eprintln!("Warning: Could not serialize config: {}", e),
    }

    let log_path = args.output.join("events.jsonl");
    let logger = match EventLogger::new(&log_path) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Warning: Could not open {}: {}; events will not be written", log_path.display(), e);
            EventLogger::null()
        }
    };

    let mut sim = match Simulation::new(&config, &scenario, args.fps, logger) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rig = sim.rig();
    println!("Feed groups: {}", rig.feeds().len());
    println!("Trail cams: {}", rig.trail().len());
    println!("Doors: {}", rig.doors().doors().len());
    println!();
    println!("Running...");

    let frames = sim.run_for(seconds);
    if let Err(e) = sim.flush() {
        eprintln!("Warning: Failed to flush event log: {}", e);
    }

    println!();
    println!("Simulation complete. Ran {} frames ({:.2}s).", frames, sim.clock().time());
    println!("Logged {} events to {}", sim.logger().event_count(), log_path.display());
    for (name, count) in sim.logger().counts() {
        println!("  {:<24} {}", name, count);
    }

    let backends = sim.backends();
    println!("Cues played: {}", backends.audio.total());
    println!("Messages shown: {}", backends.display.message_count());

    let rig = sim.rig();
    println!();
    println!("Final view: {}", describe_view(rig.view()));
    println!("Device: {}", rig.devices().current());
    for group in rig.feeds().groups() {
        println!(
            "  {:<12} {:<8} feed {}/{}",
            group.name(),
            if group.is_active() { "online" } else { "offline" },
            group.index() + 1,
            group.len()
        );
    }

    ExitCode::SUCCESS
}

fn describe_view(owner: ViewOwner) -> String {
    match owner {
        ViewOwner::FreeLook => "free look".to_string(),
        ViewOwner::Trail(index) => format!("trail cam {}", index + 1),
        ViewOwner::Viewfinder => "camcorder viewfinder".to_string(),
        ViewOwner::Docking(group) => format!("docking into group {}", group.0),
        ViewOwner::Docked(group) => format!("docked at group {}", group.0),
    }
}
