//! The top-level per-frame driver.
//!
//! `Rig::tick` runs every state machine once, in a fixed order, and decides
//! which of them may react to input this frame. Trail view, docking and the
//! camcorder viewfinder each take over the screen, so only one of them can
//! be entered at a time.

use bevy_math::Vec2;
use cam_events::{CameraId, GroupId, ModelId, Pose};

use crate::config::RigConfig;
use crate::device::DeviceSwitcher;
use crate::docking::{DockState, DockingController};
use crate::door::DoorSet;
use crate::error::SetupError;
use crate::feeds::FeedRegistry;
use crate::input::{Action, InputSource};
use crate::services::{SceneDirectory, SceneQuery, Services};
use crate::trail::{TrailCycler, TrailState};

/// Who owns the screen this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOwner {
    FreeLook,
    Trail(usize),
    Viewfinder,
    Docking(GroupId),
    Docked(GroupId),
}

/// All viewpoint state machines for one player.
#[derive(Debug)]
pub struct Rig {
    eye_camera: CameraId,
    devices: DeviceSwitcher,
    trail: TrailCycler,
    feeds: FeedRegistry,
    docking: DockingController,
    doors: DoorSet,
}

impl Rig {
    /// Wires every component. Only a missing eye camera is fatal; every other
    /// missing reference disables just the component that needs it.
    pub fn setup(
        config: &RigConfig,
        directory: &dyn SceneDirectory,
        services: &mut Services,
    ) -> Result<Self, SetupError> {
        let eye_camera = directory
            .eye_camera()
            .ok_or_else(|| SetupError::missing("rig", "eye camera"))?;
        services.render.set_camera_enabled(eye_camera, true);

        let devices = DeviceSwitcher::setup(&config.devices, eye_camera, directory, services);
        let trail = TrailCycler::setup(&config.trail, eye_camera, directory, services);
        let feeds = FeedRegistry::setup(config, directory, services);
        let docking = DockingController::new(eye_camera, config.docking.clone());
        let doors = DoorSet::setup(&config.doors, directory);

        tracing::info!(
            "Rig ready: {} feed groups, {} trail cams, {} doors",
            feeds.len(),
            trail.len(),
            doors.doors().len()
        );

        Ok(Self {
            eye_camera,
            devices,
            trail,
            feeds,
            docking,
            doors,
        })
    }

    /// Advances one frame. `eye` is the free-look pose, which docking moves
    /// and restores.
    pub fn tick(
        &mut self,
        dt: f32,
        input: &dyn InputSource,
        scene: &dyn SceneQuery,
        eye: &mut Pose,
        services: &mut Services,
    ) {
        if input.pressed(Action::Cancel) {
            self.devices.release_view(services);
            self.trail.cancel(services);
            self.docking.cancel(eye, &mut self.feeds, services);
        }

        if input.pressed(Action::SwitchDevice) {
            self.devices.trigger(eye, services);
        }

        if input.pressed(Action::Cycle)
            && self.docking.is_free_look()
            && !self.devices.viewfinder_open()
        {
            self.trail.cycle(services);
        }

        let allow_dock = !self.trail.is_viewing() && !self.devices.viewfinder_open();
        self.docking
            .handle_input(input, eye, scene, &mut self.feeds, allow_dock, services);

        if self.docking.is_free_look() && !self.trail.is_viewing() {
            self.doors.handle_input(input, eye, scene, services);
            self.devices.handle_input(input, eye, services);
        } else {
            self.doors.clear_aim(services);
        }

        self.devices.tick(dt, eye, services);
        self.docking.tick(dt, eye, &mut self.feeds, services);
        self.feeds.tick(dt, services);
        self.doors.tick(dt);
    }

    pub fn view(&self) -> ViewOwner {
        match self.docking.state() {
            DockState::Docking { group } => return ViewOwner::Docking(group),
            DockState::Docked { group } => return ViewOwner::Docked(group),
            DockState::FreeLook => {}
        }
        if let TrailState::Viewing(index) = self.trail.state() {
            return ViewOwner::Trail(index);
        }
        if self.devices.viewfinder_open() {
            return ViewOwner::Viewfinder;
        }
        ViewOwner::FreeLook
    }

    /// Look input the host should apply to the eye. Passed through in
    /// free-look and while aiming through the camcorder viewfinder, zero
    /// whenever a trail or docked feed owns the screen.
    pub fn look_delta(&self, input: &dyn InputSource) -> Vec2 {
        match self.view() {
            ViewOwner::FreeLook | ViewOwner::Viewfinder => input.look_axis(),
            _ => Vec2::ZERO,
        }
    }

    /// World poses of the device models attached to the eye.
    pub fn model_poses(&self, eye: &Pose) -> Vec<(ModelId, Pose)> {
        self.devices.model_poses(eye)
    }

    /// Current hinge pose of every door.
    pub fn door_poses(&self) -> Vec<(ModelId, Pose)> {
        self.doors
            .doors()
            .iter()
            .map(|d| (d.model(), d.pose()))
            .collect()
    }

    pub fn eye_camera(&self) -> CameraId {
        self.eye_camera
    }

    pub fn devices(&self) -> &DeviceSwitcher {
        &self.devices
    }

    pub fn trail(&self) -> &TrailCycler {
        &self.trail
    }

    pub fn feeds(&self) -> &FeedRegistry {
        &self.feeds
    }

    pub fn docking(&self) -> &DockingController {
        &self.docking
    }

    pub fn doors(&self) -> &DoorSet {
        &self.doors
    }

    /// Flips a group directly, as a toggle button would.
    pub fn toggle_group(&mut self, group: GroupId, services: &mut Services) -> bool {
        self.feeds.toggle(group, services)
    }

    /// Leaves any docking state; a no-op in free-look.
    pub fn cancel_docking(&mut self, eye: &mut Pose, services: &mut Services) {
        self.docking.cancel(eye, &mut self.feeds, services);
    }
}
