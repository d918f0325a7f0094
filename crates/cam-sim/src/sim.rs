//! World and schedule setup for a scripted session.

use bevy_ecs::prelude::*;
use cam_events::Pose;
use thiserror::Error;
use viewpoint::{Rig, RigConfig, SetupError};

use crate::logger::EventLogger;
use crate::scenario::{Scenario, Timeline};
use crate::systems::{
    advance_clock, apply_scenario_input, log_events, tick_rig, Backends, EyePose, PlayerRig,
    RoomScene, ScriptedInput, SimClock,
};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("rig setup failed: {0}")]
    Setup(#[from] SetupError),

    #[error("frame rate must be positive")]
    InvalidFps,
}

/// A rig running against a scripted scene.
pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    pub fn new(
        config: &RigConfig,
        scenario: &Scenario,
        fps: u32,
        logger: EventLogger,
    ) -> Result<Self, SimError> {
        if fps == 0 {
            return Err(SimError::InvalidFps);
        }

        let scene = scenario.build_scene();
        let mut backends = Backends::default();
        let rig = Rig::setup(config, &scene, &mut backends.services())?;

        let mut world = World::new();
        world.insert_resource(SimClock::new(fps));
        world.insert_resource(PlayerRig(rig));
        world.insert_resource(EyePose(scenario.eye.pose()));
        world.insert_resource(RoomScene(scene));
        world.insert_resource(backends);
        world.insert_resource(ScriptedInput::new(Timeline::new(scenario.steps.clone())));
        world.insert_resource(logger);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (apply_scenario_input, tick_rig, log_events, advance_clock).chain(),
        );

        Ok(Self { world, schedule })
    }

    /// Runs a single frame.
    pub fn step(&mut self) {
        self.schedule.run(&mut self.world);
    }

    /// Runs whole frames until `seconds` of simulated time have passed.
    /// Returns the number of frames run.
    pub fn run_for(&mut self, seconds: f32) -> u64 {
        let frames = (seconds / self.clock().dt).round().max(0.0) as u64;
        for _ in 0..frames {
            self.step();
        }
        frames
    }

    pub fn clock(&self) -> SimClock {
        *self.world.resource::<SimClock>()
    }

    pub fn rig(&self) -> &Rig {
        &self.world.resource::<PlayerRig>().0
    }

    pub fn eye(&self) -> Pose {
        self.world.resource::<EyePose>().0
    }

    pub fn backends(&self) -> &Backends {
        self.world.resource::<Backends>()
    }

    pub fn logger(&self) -> &EventLogger {
        self.world.resource::<EventLogger>()
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.world.resource_mut::<EventLogger>().flush()
    }
}
