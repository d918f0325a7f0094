//! Scripted sessions: a room layout plus a timeline of input.
//!
//! A scenario file describes everything the headless backends need to stand
//! in for a real scene (camera names, panel and door colliders, the eye's
//! starting pose) and the input steps to replay against it.

use bevy_math::{Vec2, Vec3};
use cam_events::Pose;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use viewpoint::headless::HeadlessScene;
use viewpoint::{Action, InputSnapshot, Quad, RigConfig};

/// Errors that can occur while loading a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// A complete scripted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Seconds to run when the command line does not say otherwise
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default)]
    pub eye: EyeStart,
    #[serde(default)]
    pub scene: SceneLayout,
    /// Inline rig configuration, used when no config file is given
    #[serde(default)]
    pub rig: Option<RigConfig>,
    #[serde(default)]
    pub steps: Vec<InputStep>,
}

fn default_duration() -> f32 {
    10.0
}

/// Where the player starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EyeStart {
    pub position: Vec3,
    /// Point to face; straight down -Z when unset
    #[serde(default)]
    pub look_at: Option<Vec3>,
}

impl Default for EyeStart {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.5, 0.0),
            look_at: None,
        }
    }
}

impl EyeStart {
    pub fn pose(&self) -> Pose {
        match self.look_at {
            Some(target) => Pose::looking_to(self.position, target - self.position, Vec3::Y),
            None => Pose::from_position(self.position),
        }
    }
}

/// Named objects and colliders of the room.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLayout {
    /// Monitors and toggle buttons
    pub panels: Vec<PanelLayout>,
    pub doors: Vec<DoorLayout>,
    /// Security cameras with recording indicators
    pub feeds: Vec<String>,
    /// Other cameras (trail cams, device cameras)
    pub cameras: Vec<String>,
    /// Models without colliders (device models, markers)
    pub models: Vec<String>,
}

/// A wall-mounted rectangle the player can aim at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelLayout {
    pub name: String,
    pub center: Vec3,
    pub normal: Vec3,
    pub size: Vec2,
}

/// A door hinged at `hinge` with a rectangular panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorLayout {
    pub name: String,
    pub hinge: Vec3,
    pub center: Vec3,
    pub normal: Vec3,
    pub size: Vec2,
}

/// Input applied on the first frame at or after `at` seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputStep {
    pub at: f32,
    /// Go down this frame and stay held until released
    #[serde(default)]
    pub press: Vec<Action>,
    /// Held with no press edge
    #[serde(default)]
    pub hold: Vec<Action>,
    #[serde(default)]
    pub release: Vec<Action>,
    /// Turn the eye toward this point (free-look only)
    #[serde(default)]
    pub look_at: Option<Vec3>,
}

impl Scenario {
    /// Loads a scenario from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates a scenario from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ScenarioError> {
        let mut scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        scenario.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if let Some(step) = self.steps.iter().find(|s| !(s.at.is_finite() && s.at >= 0.0)) {
            return Err(ScenarioError::Invalid(format!(
                "step time must be non-negative, got {}",
                step.at
            )));
        }
        Ok(())
    }

    /// Builds the recording scene the rig resolves its names against.
    pub fn build_scene(&self) -> HeadlessScene {
        let mut scene = HeadlessScene::new();
        scene.add_eye();

        for panel in &self.scene.panels {
            scene.add_panel(&panel.name, panel.center, panel.normal, panel.size);
        }
        for door in &self.scene.doors {
            scene.add_door(
                &door.name,
                Pose::from_position(door.hinge),
                Quad::new(door.center, door.normal, Vec3::Y, door.size),
            );
        }
        for name in &self.scene.feeds {
            scene.add_feed(name);
        }
        for name in &self.scene.cameras {
            scene.add_camera(name);
        }
        for name in &self.scene.models {
            scene.add_model(name);
        }
        scene
    }
}

/// Replays scenario steps frame by frame.
#[derive(Debug, Clone)]
pub struct Timeline {
    steps: Vec<InputStep>,
    cursor: usize,
    current: InputSnapshot,
}

impl Timeline {
    /// `steps` must be sorted by time.
    pub fn new(steps: Vec<InputStep>) -> Self {
        Self {
            steps,
            cursor: 0,
            current: InputSnapshot::new(),
        }
    }

    /// Input for the frame starting at `time`, and the last look target due.
    ///
    /// Keys held by earlier steps stay held; edges last one frame.
    pub fn advance(&mut self, time: f32) -> (InputSnapshot, Option<Vec3>) {
        let mut frame = self.current.carry_over();
        let mut look_at = None;

        while let Some(step) = self.steps.get(self.cursor) {
            if step.at > time {
                break;
            }
            for &action in &step.release {
                frame.set_released(action);
            }
            for &action in &step.hold {
                frame.set_held(action);
            }
            for &action in &step.press {
                frame.set_pressed(action);
            }
            if step.look_at.is_some() {
                look_at = step.look_at;
            }
            self.cursor += 1;
        }

        self.current = frame.clone();
        (frame, look_at)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewpoint::{InputSource, SceneDirectory};

    const SMALL: &str = r#"
name = "small"
duration = 2.0

[eye]
position = [0.0, 1.5, 0.0]
look_at = [0.0, 1.5, -3.0]

[scene]
feeds = ["lobby_cam_1"]
cameras = ["trail_cam_1"]
models = ["camcorder"]

[[scene.panels]]
name = "lobby_monitor"
center = [0.0, 1.5, -3.0]
normal = [0.0, 0.0, 1.0]
size = [1.0, 0.6]

[[steps]]
at = 1.0
release = ["interact"]

[[steps]]
at = 0.5
press = ["interact"]
look_at = [0.0, 1.5, -3.0]
"#;

    #[test]
    fn test_parse_and_sort_steps() {
        let scenario = Scenario::from_str(SMALL).unwrap();

        assert_eq!(scenario.name, "small");
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.steps[0].at, 0.5);
        assert_eq!(scenario.steps[0].press, vec![Action::Interact]);
        assert!(scenario.rig.is_none());
    }

    #[test]
    fn test_negative_step_rejected() {
        let content = "name = \"bad\"\n[[steps]]\nat = -1.0\n";
        let result = Scenario::from_str(content);
        assert!(matches!(result, Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = Scenario::from_str("name = \"bad\"\nduration = 0.0\n");
        assert!(matches!(result, Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_build_scene_registers_names() {
        let scenario = Scenario::from_str(SMALL).unwrap();
        let scene = scenario.build_scene();

        assert!(scene.eye_camera().is_some());
        assert!(scene.camera("lobby_cam_1").is_some());
        assert!(scene.indicator("lobby_cam_1").is_some());
        assert!(scene.camera("trail_cam_1").is_some());
        assert!(scene.indicator("trail_cam_1").is_none());
        assert!(scene.model("lobby_monitor").is_some());
        assert!(scene.model("camcorder").is_some());
    }

    #[test]
    fn test_eye_start_faces_target() {
        let scenario = Scenario::from_str(SMALL).unwrap();
        let pose = scenario.eye.pose();
        assert!(pose.forward().distance(Vec3::NEG_Z) < 1e-5);
    }

    #[test]
    fn test_timeline_edges_last_one_frame() {
        let scenario = Scenario::from_str(SMALL).unwrap();
        let mut timeline = Timeline::new(scenario.steps);

        let (frame, look) = timeline.advance(0.0);
        assert!(frame.is_idle());
        assert!(look.is_none());

        let (frame, look) = timeline.advance(0.5);
        assert!(frame.pressed(Action::Interact));
        assert!(look.is_some());

        let (frame, _) = timeline.advance(0.6);
        assert!(!frame.pressed(Action::Interact));
        assert!(frame.held(Action::Interact));

        let (frame, _) = timeline.advance(1.0);
        assert!(frame.released(Action::Interact));
        assert!(!frame.held(Action::Interact));
        assert!(timeline.is_finished());
    }

    #[test]
    fn test_timeline_catches_up_on_late_frames() {
        let steps = vec![
            InputStep {
                at: 0.1,
                hold: vec![Action::Aim],
                ..Default::default()
            },
            InputStep {
                at: 0.2,
                press: vec![Action::Cycle],
                ..Default::default()
            },
        ];
        let mut timeline = Timeline::new(steps);

        let (frame, _) = timeline.advance(0.5);
        assert!(frame.held(Action::Aim));
        assert!(!frame.pressed(Action::Aim));
        assert!(frame.pressed(Action::Cycle));
        assert_eq!(timeline.remaining(), 0);
    }
}
