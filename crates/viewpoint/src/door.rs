//! Hinged doors: toggle from a distance, peek up close, slam shut.
//!
//! Each door chases a target rotation about its hinge at a speed chosen by
//! what it is doing. Glow is recomputed from the player's distance every frame
//! the door is aimed at.

use cam_events::{CamEventKind, DoorId, DoorMotion, Glow, ModelId, Pose, Quat};

use crate::animator::{chase_rotation, ANGLE_TOLERANCE};
use crate::config::DoorConfig;
use crate::input::{Action, InputSource};
use crate::services::{SceneDirectory, SceneQuery, Services};

/// Glow level for a player `distance` away from the door.
pub fn glow_for_distance(distance: f32, near: f32, far: f32) -> Glow {
    if distance <= near {
        Glow::Near
    } else if distance <= far {
        Glow::Far
    } else {
        Glow::Off
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorMode {
    Swinging,
    Peeking,
    Slamming,
}

#[derive(Debug, Clone)]
pub struct Door {
    id: DoorId,
    name: String,
    model: ModelId,
    hinge: Pose,
    rotation: Quat,
    target: Quat,
    mode: DoorMode,
    open: bool,
    peek_cue_played: bool,
    glow: Glow,
}

impl Door {
    pub fn new(id: DoorId, name: impl Into<String>, model: ModelId, hinge: Pose) -> Self {
        Self {
            id,
            name: name.into(),
            model,
            hinge,
            rotation: hinge.rotation,
            target: hinge.rotation,
            mode: DoorMode::Swinging,
            open: false,
            peek_cue_played: false,
            glow: Glow::Off,
        }
    }

    pub fn id(&self) -> DoorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> DoorMode {
        self.mode
    }

    pub fn glow(&self) -> Glow {
        self.glow
    }

    /// Current hinge pose in world space.
    pub fn pose(&self) -> Pose {
        Pose::new(self.hinge.position, self.rotation)
    }

    pub fn target(&self) -> Quat {
        self.target
    }

    fn swung(&self, degrees: f32) -> Quat {
        (Quat::from_rotation_y(degrees.to_radians()) * self.hinge.rotation).normalize()
    }

    pub fn toggle_open(&mut self, config: &DoorConfig, services: &mut Services) {
        self.open = !self.open;
        self.mode = DoorMode::Swinging;
        let (target, cue, motion) = if self.open {
            (self.swung(config.open_angle), &config.open_cue, DoorMotion::Opened)
        } else {
            (self.hinge.rotation, &config.close_cue, DoorMotion::Closed)
        };
        self.target = target;
        services.cue(cue.as_deref(), self.hinge.position);
        self.emit(motion, services);
    }

    /// Opens to `amount` of the peek angle. The cue plays once per peek.
    pub fn peek(&mut self, amount: f32, config: &DoorConfig, services: &mut Services) {
        self.mode = DoorMode::Peeking;
        self.target = self.swung(config.peek_angle * amount.clamp(0.0, 1.0));
        if !self.peek_cue_played {
            self.peek_cue_played = true;
            services.cue(config.peek_cue.as_deref(), self.hinge.position);
            self.emit(DoorMotion::PeekStarted, services);
        }
    }

    pub fn stop_peek(&mut self, services: &mut Services) {
        if self.mode != DoorMode::Peeking {
            return;
        }
        self.mode = DoorMode::Swinging;
        self.target = self.hinge.rotation;
        self.peek_cue_played = false;
        self.emit(DoorMotion::PeekStopped, services);
    }

    pub fn slam_close(&mut self, config: &DoorConfig, services: &mut Services) {
        self.mode = DoorMode::Slamming;
        self.open = false;
        self.peek_cue_played = false;
        self.target = self.hinge.rotation;
        services.cue(config.slam_cue.as_deref(), self.hinge.position);
        self.emit(DoorMotion::Slammed, services);
    }

    pub fn tick(&mut self, dt: f32, config: &DoorConfig) {
        let speed = match self.mode {
            DoorMode::Peeking => config.peek_speed,
            DoorMode::Slamming => config.slam_speed,
            DoorMode::Swinging => config.open_speed,
        };
        self.rotation = chase_rotation(self.rotation, self.target, speed, dt);
        if self.rotation.angle_between(self.target) < ANGLE_TOLERANCE {
            self.rotation = self.target;
            if self.mode == DoorMode::Slamming {
                self.mode = DoorMode::Swinging;
            }
        }
    }

    fn set_glow(&mut self, glow: Glow, services: &mut Services) {
        if self.glow != glow {
            self.glow = glow;
            services.render.set_glow(self.id, glow);
        }
    }

    fn emit(&self, motion: DoorMotion, services: &mut Services) {
        tracing::debug!("Door {} {:?}", self.name, motion);
        services.emit(CamEventKind::Door {
            door: self.id,
            motion,
        });
    }
}

/// All managed doors and the one currently aimed at.
#[derive(Debug)]
pub struct DoorSet {
    doors: Vec<Door>,
    config: DoorConfig,
    aimed: Option<usize>,
    /// A slam holds off peeking until interact is let go.
    peek_blocked: bool,
}

impl DoorSet {
    pub fn setup(config: &DoorConfig, directory: &dyn SceneDirectory) -> Self {
        let doors = config
            .names
            .iter()
            .filter_map(|name| match directory.door(name) {
                Some((id, model, hinge)) => Some(Door::new(id, name.clone(), model, hinge)),
                None => {
                    tracing::warn!("door {}: missing from scene, skipping", name);
                    None
                }
            })
            .collect();

        Self {
            doors,
            config: config.clone(),
            aimed: None,
            peek_blocked: false,
        }
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn aimed(&self) -> Option<&Door> {
        self.aimed.and_then(|i| self.doors.get(i))
    }

    /// Ray-casts from the eye and applies interact to the door it hits.
    pub fn handle_input(
        &mut self,
        input: &dyn InputSource,
        eye: &Pose,
        scene: &dyn SceneQuery,
        services: &mut Services,
    ) {
        if !input.held(Action::Interact) {
            self.peek_blocked = false;
        }

        let hit = scene
            .raycast(eye.position, eye.forward(), self.config.interact_range)
            .and_then(|hit| self.doors.iter().position(|d| d.model == hit.model));

        if self.aimed != hit {
            self.clear_aim(services);
        }
        let Some(index) = hit else {
            return;
        };
        self.aimed = Some(index);

        let config = &self.config;
        let door = &mut self.doors[index];
        let distance = eye.position.distance(door.hinge.position);
        door.set_glow(
            glow_for_distance(distance, config.near_distance, config.far_distance),
            services,
        );

        if distance <= config.near_distance {
            if input.pressed(Action::Interact) && door.open {
                door.slam_close(config, services);
                self.peek_blocked = true;
            } else if input.held(Action::Interact) && !self.peek_blocked {
                door.peek(config.peek_amount, config, services);
            } else if input.released(Action::Interact) {
                door.stop_peek(services);
            }
        } else if distance <= config.far_distance && input.pressed(Action::Interact) {
            door.toggle_open(config, services);
        }
    }

    /// Resets the glow of the door that is no longer aimed at.
    pub fn clear_aim(&mut self, services: &mut Services) {
        if let Some(door) = self.aimed.take().and_then(|i| self.doors.get_mut(i)) {
            door.set_glow(Glow::Off, services);
        }
    }

    pub fn tick(&mut self, dt: f32) {
        for door in &mut self.doors {
            door.tick(dt, &self.config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessAudio, HeadlessDisplay, HeadlessRender};
    use crate::services::EventQueue;
    use bevy_math::Vec3;

    #[test]
    fn test_glow_thresholds() {
        assert_eq!(glow_for_distance(1.0, 2.0, 4.0), Glow::Near);
        assert_eq!(glow_for_distance(2.0, 2.0, 4.0), Glow::Near);
        assert_eq!(glow_for_distance(3.0, 2.0, 4.0), Glow::Far);
        assert_eq!(glow_for_distance(4.0, 2.0, 4.0), Glow::Far);
        assert_eq!(glow_for_distance(4.5, 2.0, 4.0), Glow::Off);
    }

    #[test]
    fn test_toggle_then_chase_to_open_angle() {
        let mut render = HeadlessRender::new();
        let mut audio = HeadlessAudio::default();
        let mut display = HeadlessDisplay::default();
        let mut events = EventQueue::new();
        let mut services = Services::new(&mut render, &mut audio, &mut display, &mut events);
        let config = DoorConfig::default();
        let mut door = Door::new(DoorId(0), "office_door", ModelId(0), Pose::from_position(Vec3::ZERO));

        door.toggle_open(&config, &mut services);
        for _ in 0..600 {
            door.tick(1.0 / 60.0, &config);
        }

        assert!(door.is_open());
        assert_eq!(door.pose().rotation, door.target());
        assert!((door.pose().rotation.angle_between(Quat::IDENTITY) - 90f32.to_radians()).abs() < 1e-3);
        drop(services);
        assert_eq!(audio.played("event:/Door/Open"), 1);
    }

    #[test]
    fn test_peek_cue_plays_once_and_slam_closes() {
        let mut render = HeadlessRender::new();
        let mut audio = HeadlessAudio::default();
        let mut display = HeadlessDisplay::default();
        let mut events = EventQueue::new();
        let mut services = Services::new(&mut render, &mut audio, &mut display, &mut events);
        let config = DoorConfig::default();
        let mut door = Door::new(DoorId(0), "office_door", ModelId(0), Pose::IDENTITY);

        for _ in 0..5 {
            door.peek(0.5, &config, &mut services);
        }
        door.stop_peek(&mut services);
        door.toggle_open(&config, &mut services);
        door.slam_close(&config, &mut services);

        assert!(!door.is_open());
        assert_eq!(door.mode(), DoorMode::Slamming);
        assert_eq!(door.target(), Quat::IDENTITY);
        drop(services);
        assert_eq!(audio.played("event:/Door/Peek"), 1);
        assert_eq!(audio.played("event:/Door/Slam"), 1);
    }
}
