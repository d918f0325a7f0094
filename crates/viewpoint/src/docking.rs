//! Moving the free-look eye into a monitor and taking over its feed.
//!
//! The session holds the pose saved at dock start. Its `target` is present
//! only while the eye is still travelling; clearing it marks arrival.
//! Cancelling always snaps back to the saved pose without animation.

use bevy_math::Vec3;
use cam_events::{CameraId, CamEventKind, GroupId, Pose};

use crate::animator::{PoseApproach, Step};
use crate::config::DockingConfig;
use crate::feeds::FeedRegistry;
use crate::input::{Action, InputSource};
use crate::services::{RayHit, SceneQuery, Services};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockState {
    FreeLook,
    Docking { group: GroupId },
    Docked { group: GroupId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewpointSession {
    pub group: GroupId,
    /// Authoritative pose to restore on exit. Set once per dock.
    pub saved_pose: Pose,
    /// Where the eye is heading; `None` once docked.
    pub target: Option<Pose>,
}

/// Docking state machine for the free-look eye.
#[derive(Debug)]
pub struct DockingController {
    eye: CameraId,
    config: DockingConfig,
    session: Option<ViewpointSession>,
    /// Set when interact starts a dock; cleared when interact is let go.
    latched: bool,
}

impl DockingController {
    pub fn new(eye: CameraId, config: DockingConfig) -> Self {
        Self {
            eye,
            config,
            session: None,
            latched: false,
        }
    }

    pub fn state(&self) -> DockState {
        match self.session {
            None => DockState::FreeLook,
            Some(ViewpointSession {
                group,
                target: Some(_),
                ..
            }) => DockState::Docking { group },
            Some(ViewpointSession { group, target: None, .. }) => DockState::Docked { group },
        }
    }

    pub fn session(&self) -> Option<&ViewpointSession> {
        self.session.as_ref()
    }

    pub fn is_free_look(&self) -> bool {
        self.session.is_none()
    }

    /// Reacts to this frame's input. `allow_start` is false while another
    /// view (trail, viewfinder) owns the screen.
    pub fn handle_input(
        &mut self,
        input: &dyn InputSource,
        eye: &mut Pose,
        scene: &dyn SceneQuery,
        feeds: &mut FeedRegistry,
        allow_start: bool,
        services: &mut Services,
    ) {
        let holding = input.held(Action::Interact);

        match self.state() {
            DockState::FreeLook => {
                if !holding {
                    self.latched = false;
                    return;
                }
                if !allow_start {
                    return;
                }
                let Some(hit) = scene.raycast(eye.position, eye.forward(), self.config.interact_range)
                else {
                    return;
                };

                if let Some(group) = feeds.group_for_monitor(hit.model) {
                    if !self.latched && feeds.is_dockable(group) {
                        self.start(group, &hit, eye, services);
                    }
                    self.latched = true;
                } else if let Some(group) = feeds.group_for_toggle(hit.model) {
                    if input.pressed(Action::Interact) {
                        feeds.toggle(group, services);
                    }
                }
            }
            DockState::Docking { .. } => {
                if !holding {
                    self.latched = false;
                    self.abort(eye, services);
                }
            }
            DockState::Docked { group } => {
                if !holding {
                    self.latched = false;
                }
                if input.pressed(Action::Cycle) {
                    feeds.cycle_docked(group, services);
                }
            }
        }
    }

    /// Moves the eye one frame toward the monitor and completes the dock on
    /// arrival.
    pub fn tick(&mut self, dt: f32, eye: &mut Pose, feeds: &mut FeedRegistry, services: &mut Services) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(target) = session.target else {
            return;
        };

        match PoseApproach::new(target, self.config.lerp_speed).step(eye, dt) {
            Step::Moving(pose) => *eye = pose,
            Step::Arrived(pose) => {
                *eye = pose;
                let group = session.group;
                match feeds.present(group, services) {
                    Some(camera) => {
                        session.target = None;
                        services.render.set_camera_enabled(self.eye, false);
                        tracing::info!("Docked into group {} ({})", group, camera);
                        services.emit(CamEventKind::Docked { group, camera });
                    }
                    None => self.abort(eye, services),
                }
            }
        }
    }

    /// Leaves whatever docking state is active. A no-op in free-look.
    pub fn cancel(&mut self, eye: &mut Pose, feeds: &mut FeedRegistry, services: &mut Services) {
        match self.state() {
            DockState::FreeLook => {}
            DockState::Docking { .. } => self.abort(eye, services),
            DockState::Docked { group } => {
                feeds.withdraw(group, services);
                self.restore(eye, services);
                tracing::info!("Undocked from group {}", group);
                services.emit(CamEventKind::Undocked { group });
            }
        }
    }

    fn start(&mut self, group: GroupId, hit: &RayHit, eye: &Pose, services: &mut Services) {
        let target = docking_target(hit, self.config.standoff);
        self.session = Some(ViewpointSession {
            group,
            saved_pose: *eye,
            target: Some(target),
        });
        tracing::info!("Docking into group {}", group);
        services.emit(CamEventKind::DockingStarted { group });
    }

    fn abort(&mut self, eye: &mut Pose, services: &mut Services) {
        if let Some(group) = self.restore(eye, services) {
            tracing::info!("Docking into group {} aborted", group);
            services.emit(CamEventKind::DockingAborted { group });
        }
    }

    fn restore(&mut self, eye: &mut Pose, services: &mut Services) -> Option<GroupId> {
        let session = self.session.take()?;
        *eye = session.saved_pose;
        services.render.set_camera_enabled(self.eye, true);
        Some(session.group)
    }
}

/// Pose `standoff` in front of the hit surface, facing into it.
pub fn docking_target(hit: &RayHit, standoff: f32) -> Pose {
    let normal = hit.normal.try_normalize().unwrap_or(Vec3::Z);
    Pose::looking_to(hit.origin + normal * standoff, -normal, Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cam_events::ModelId;

    #[test]
    fn test_docking_target_faces_surface() {
        let hit = RayHit {
            model: ModelId(0),
            distance: 2.0,
            origin: Vec3::new(0.0, 1.5, -3.0),
            normal: Vec3::Z,
        };
        let target = docking_target(&hit, 0.5);

        assert!(target.position.distance(Vec3::new(0.0, 1.5, -2.5)) < 1e-5);
        assert!(target.forward().distance(Vec3::NEG_Z) < 1e-5);
    }

    #[test]
    fn test_fresh_controller_is_free_look() {
        let docking = DockingController::new(CameraId(0), DockingConfig::default());
        assert_eq!(docking.state(), DockState::FreeLook);
        assert!(docking.session().is_none());
    }
}
