//! Interactive viewer: the viewpoint rig driving a Bevy scene.

use cam_sim::{Scenario, ScenarioError};
use std::path::Path;

pub mod bridge;
pub mod controls;
pub mod driver;
pub mod hud;
pub mod input;
pub mod plugin;
pub mod room;

pub use driver::ViewerRig;
pub use plugin::ViewpointVizPlugin;

/// The built-in security office, used when no room file is given.
pub const DEFAULT_ROOM: &str = include_str!("../rooms/office.toml");

/// Loads a room layout from `path`, or the built-in office when unset.
pub fn load_room(path: Option<&Path>) -> Result<Scenario, ScenarioError> {
    match path {
        Some(path) => Scenario::from_file(path),
        None => Scenario::from_str(DEFAULT_ROOM),
    }
}
