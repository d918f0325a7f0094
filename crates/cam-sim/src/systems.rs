//! ECS resources and the per-frame systems of the headless runner.
//!
//! The rig is a plain struct; each frame the schedule feeds it scripted
//! input, ticks it against the recording backends, then drains its events
//! into the log.

use bevy_ecs::prelude::*;
use bevy_math::Vec3;
use cam_events::{look_rotation, CamEvent, Pose};
use viewpoint::headless::{HeadlessAudio, HeadlessDisplay, HeadlessRender, HeadlessScene};
use viewpoint::{EventQueue, InputSnapshot, Rig, Services, ViewOwner};

use crate::logger::EventLogger;
use crate::scenario::Timeline;

/// Frame counter and fixed timestep.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimClock {
    pub tick: u64,
    pub dt: f32,
}

impl SimClock {
    pub fn new(fps: u32) -> Self {
        Self {
            tick: 0,
            dt: 1.0 / fps as f32,
        }
    }

    /// Seconds at the start of the current frame.
    pub fn time(&self) -> f32 {
        self.tick as f32 * self.dt
    }
}

#[derive(Resource, Debug)]
pub struct PlayerRig(pub Rig);

/// The free-look pose of the player's camera.
#[derive(Resource, Debug, Clone, Copy)]
pub struct EyePose(pub Pose);

#[derive(Resource, Debug)]
pub struct RoomScene(pub HeadlessScene);

/// Recording service backends shared by every frame.
#[derive(Resource, Debug, Default)]
pub struct Backends {
    pub render: HeadlessRender,
    pub audio: HeadlessAudio,
    pub display: HeadlessDisplay,
    pub events: EventQueue,
}

impl Backends {
    pub fn services(&mut self) -> Services<'_> {
        Services::new(
            &mut self.render,
            &mut self.audio,
            &mut self.display,
            &mut self.events,
        )
    }
}

/// The scenario timeline and the input it produced this frame.
#[derive(Resource, Debug)]
pub struct ScriptedInput {
    pub timeline: Timeline,
    pub frame: InputSnapshot,
}

impl ScriptedInput {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            frame: InputSnapshot::new(),
        }
    }
}

/// Samples the timeline and turns the eye toward any due look target.
///
/// Look targets only apply while the player controls the eye; a docked or
/// trail view owns the screen and would otherwise be knocked off its pose.
pub fn apply_scenario_input(
    clock: Res<SimClock>,
    rig: Res<PlayerRig>,
    mut script: ResMut<ScriptedInput>,
    mut eye: ResMut<EyePose>,
) {
    let (frame, look_at) = script.timeline.advance(clock.time());
    script.frame = frame;

    let Some(target) = look_at else {
        return;
    };
    match rig.0.view() {
        ViewOwner::FreeLook | ViewOwner::Viewfinder => {
            eye.0.rotation = look_rotation(target - eye.0.position, Vec3::Y);
        }
        owner => {
            tracing::debug!("Tick {}: look_at ignored while view is {:?}", clock.tick, owner);
        }
    }
}

pub fn tick_rig(
    clock: Res<SimClock>,
    script: Res<ScriptedInput>,
    scene: Res<RoomScene>,
    mut rig: ResMut<PlayerRig>,
    mut eye: ResMut<EyePose>,
    mut backends: ResMut<Backends>,
) {
    let mut services = backends.services();
    rig.0
        .tick(clock.dt, &script.frame, &scene.0, &mut eye.0, &mut services);
}

pub fn log_events(
    clock: Res<SimClock>,
    mut backends: ResMut<Backends>,
    mut logger: ResMut<EventLogger>,
) {
    for kind in backends.events.drain() {
        tracing::debug!("Tick {}: {}", clock.tick, kind.name());
        let event = CamEvent::new(clock.tick, clock.time(), kind);
        if let Err(e) = logger.log(&event) {
            tracing::warn!("Could not log event at tick {}: {}", clock.tick, e);
        }
    }
}

pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.tick += 1;
}
