//! Owns the rig inside the Bevy app and ticks it once per frame.

use bevy::prelude::*;
use cam_events::Pose;
use viewpoint::headless::HeadlessScene;
use viewpoint::{EventQueue, InputSnapshot, Rig, RigConfig, Services, SetupError};

use crate::bridge::{CueLog, HudState, RenderOps};
use crate::input::FrameInput;

/// The rig, its eye pose and the viewer's service backends.
///
/// The scene directory doubles as the ray-cast target: monitors, buttons and
/// door panels keep the flat colliders the room was spawned from.
#[derive(Resource, Debug)]
pub struct ViewerRig {
    pub rig: Rig,
    pub eye: Pose,
    pub scene: HeadlessScene,
    pub render: RenderOps,
    pub audio: CueLog,
    pub hud: HudState,
    pub events: EventQueue,
}

impl ViewerRig {
    pub fn setup(config: &RigConfig, scene: HeadlessScene, eye: Pose) -> Result<Self, SetupError> {
        let mut render = RenderOps::new();
        let mut audio = CueLog::default();
        let mut hud = HudState::default();
        let mut events = EventQueue::new();
        let rig = {
            let mut services = Services::new(&mut render, &mut audio, &mut hud, &mut events);
            Rig::setup(config, &scene, &mut services)?
        };

        Ok(Self {
            rig,
            eye,
            scene,
            render,
            audio,
            hud,
            events,
        })
    }

    pub fn tick(&mut self, dt: f32, input: &InputSnapshot) {
        let mut services = Services::new(
            &mut self.render,
            &mut self.audio,
            &mut self.hud,
            &mut self.events,
        );
        self.rig
            .tick(dt, input, &self.scene, &mut self.eye, &mut services);
        self.hud.tick(dt);

        for event in self.events.drain() {
            tracing::info!("{:?}", event);
        }
    }
}

pub fn drive_rig(time: Res<Time>, frame: Res<FrameInput>, mut viewer: ResMut<ViewerRig>) {
    viewer.tick(time.delta_seconds(), &frame.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RenderOp;
    use cam_sim::Scenario;
    use viewpoint::{Action, ViewOwner};

    fn viewer() -> ViewerRig {
        let room = Scenario::from_str(crate::DEFAULT_ROOM).unwrap();
        let config = room.rig.clone().unwrap();
        ViewerRig::setup(&config, room.build_scene(), room.eye.pose()).unwrap()
    }

    #[test]
    fn test_setup_queues_group_surfaces() {
        let mut viewer = viewer();
        let ops = viewer.render.drain();

        let surfaces = ops
            .iter()
            .filter(|op| matches!(op, RenderOp::AllocateSurface { .. }))
            .count();
        // Two monitor groups plus the camcorder live view and polaroid print.
        assert!(surfaces >= 2);
        assert!(ops.iter().any(|op| matches!(
            op,
            RenderOp::SetEnabled { camera, enabled: true } if *camera == viewer.rig.eye_camera()
        )));
    }

    #[test]
    fn test_trail_view_binds_to_screen() {
        let mut viewer = viewer();
        viewer.render.drain();

        viewer.tick(1.0 / 60.0, &InputSnapshot::new().press(Action::Cycle));

        assert_eq!(viewer.rig.view(), ViewOwner::Trail(0));
        let ops = viewer.render.drain();
        assert!(ops.contains(&RenderOp::SetEnabled {
            camera: viewer.rig.eye_camera(),
            enabled: false
        }));
        let trail = viewer.rig.trail().cameras().next().unwrap();
        assert!(ops.contains(&RenderOp::SetEnabled {
            camera: trail,
            enabled: true
        }));
        assert_eq!(viewer.hud.message(), Some("TRAIL CAM 1"));
    }
}
