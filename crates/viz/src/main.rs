//! Viewpoint viewer
//!
//! Run with: cargo run -p viz
//!
//! Examples:
//!   cargo run -p viz -- --config rig.toml
//!   cargo run -p viz -- --room crates/cam-sim/tests/fixtures/office_tour.toml

use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use viewpoint::RigConfig;
use viz::input::ActionMap;
use viz::room::ViewerSetup;
use viz::ViewpointVizPlugin;

/// Viewpoint viewer
#[derive(Parser, Debug)]
#[command(name = "viz")]
#[command(about = "Interactive viewer for the viewpoint rig")]
struct Args {
    /// Rig configuration (TOML); falls back to the room's [rig] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Room layout (scenario TOML); the built-in office when unset
    #[arg(long)]
    room: Option<PathBuf>,

    /// Seed for feed jitter
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let room = match viz::load_room(args.room.as_deref()) {
        Ok(room) => room,
        Err(e) => {
            eprintln!("Error: could not load room: {}", e);
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
        None => room.rig.clone().unwrap_or_default(),
    };
    if args.seed.is_some() {
        config.feeds.seed = args.seed;
    }

    App::new()
        .insert_resource(ActionMap::from_config(&config.bindings))
        .insert_resource(ViewerSetup { config, room })
        .add_plugins(ViewpointVizPlugin)
        .run();

    ExitCode::SUCCESS
}
