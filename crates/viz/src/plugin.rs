//! Main viewer plugin that ties all systems together.

use bevy::prelude::*;

use crate::bridge::apply_render_ops;
use crate::controls::{free_look, grab_cursor, LookSettings};
use crate::driver::{drive_rig, ViewerRig};
use crate::hud::HudPlugin;
use crate::input::{sample_input, FrameInput};
use crate::room::{setup_room, sync_transforms};

/// Main plugin for the interactive viewer.
///
/// Expects [`ViewerSetup`](crate::room::ViewerSetup) and
/// [`ActionMap`](crate::input::ActionMap) to be inserted before it runs.
pub struct ViewpointVizPlugin;

impl Plugin for ViewpointVizPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Viewpoint".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .init_resource::<FrameInput>()
        .init_resource::<LookSettings>()
        .add_systems(Startup, (setup_room, grab_cursor))
        .add_systems(
            Update,
            (
                sample_input,
                free_look,
                drive_rig,
                apply_render_ops,
                sync_transforms,
            )
                .chain()
                .run_if(resource_exists::<ViewerRig>),
        )
        .add_plugins(HudPlugin);
    }
}
