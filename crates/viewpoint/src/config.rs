//! Configuration loading for the rig.
//!
//! All tuning and scene names are loaded from a TOML file. Every section is
//! optional; missing values fall back to the defaults below.

use bevy_math::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, TomlSerializeError};
use crate::input::Action;

/// Complete rig configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigConfig {
    /// Key names per logical action
    #[serde(default)]
    pub bindings: KeyBindings,
    /// Handheld device settings
    #[serde(default)]
    pub devices: DeviceConfig,
    /// Feed group timing and surfaces
    #[serde(default)]
    pub feeds: FeedConfig,
    /// Monitor docking settings
    #[serde(default)]
    pub docking: DockingConfig,
    /// Door tuning and door names
    #[serde(default)]
    pub doors: DoorConfig,
    /// Auxiliary trail feeds
    #[serde(default)]
    pub trail: TrailConfig,
    /// Feed groups, in handle order
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl RigConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Key names for each action. Hosts translate names into their own key codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub switch_device: String,
    pub cycle: String,
    pub cancel: String,
    pub interact: String,
    pub aim: String,
    pub capture: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            switch_device: "q".to_string(),
            cycle: "tab".to_string(),
            cancel: "escape".to_string(),
            interact: "e".to_string(),
            aim: "mouse_right".to_string(),
            capture: "mouse_right".to_string(),
        }
    }
}

impl KeyBindings {
    /// Key name bound to `action`.
    pub fn key_for(&self, action: Action) -> &str {
        match action {
            Action::SwitchDevice => &self.switch_device,
            Action::Cycle => &self.cycle,
            Action::Cancel => &self.cancel,
            Action::Interact => &self.interact,
            Action::Aim => &self.aim,
            Action::Capture => &self.capture,
        }
    }
}

/// Handheld device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Offset added to a device's rest position when lowered
    pub lowered_offset: Vec3,
    /// Exponential approach rate for raise/lower
    pub switch_speed: f32,
    /// Height of the polaroid relative to the eye while raised
    pub polaroid_raised_height: f32,
    /// Size of device surfaces (LCD, viewfinder, photo)
    pub surface_size: u32,
    pub neutral: NeutralConfig,
    pub camcorder: HandheldConfig,
    pub polaroid: HandheldConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            lowered_offset: Vec3::new(0.0, -0.5, 0.0),
            switch_speed: 5.0,
            polaroid_raised_height: 0.2,
            surface_size: 512,
            neutral: NeutralConfig::default(),
            camcorder: HandheldConfig {
                model: Some("camcorder".to_string()),
                camera: Some("camcorder_cam".to_string()),
                held_photo: None,
                rest_offset: Vec3::new(0.35, -0.3, -0.6),
                raise_cue: Some("event:/Camcorder/Raise".to_string()),
                lower_cue: Some("event:/Camcorder/Lower".to_string()),
                shutter_cue: None,
            },
            polaroid: HandheldConfig {
                model: Some("polaroid".to_string()),
                camera: Some("polaroid_cam".to_string()),
                held_photo: Some("held_photo".to_string()),
                rest_offset: Vec3::new(0.3, -0.3, -0.55),
                raise_cue: Some("event:/Polaroid/Raise".to_string()),
                lower_cue: Some("event:/Polaroid/Lower".to_string()),
                shutter_cue: Some("event:/Polaroid/Shutter".to_string()),
            },
        }
    }
}

/// The empty-hands state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeutralConfig {
    /// Marker model shown while nothing is held
    pub model: Option<String>,
}

impl Default for NeutralConfig {
    fn default() -> Self {
        Self {
            model: Some("empty_hands".to_string()),
        }
    }
}

/// One handheld device. Unset names disable the device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HandheldConfig {
    pub model: Option<String>,
    pub camera: Option<String>,
    /// Photo model shown after a capture (polaroid only)
    pub held_photo: Option<String>,
    /// Raised position relative to the eye
    pub rest_offset: Vec3,
    pub raise_cue: Option<String>,
    pub lower_cue: Option<String>,
    pub shutter_cue: Option<String>,
}

/// Feed group timing and surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base auto-cycle interval in seconds
    pub cycle_interval: f32,
    /// Lower bound of the per-cycle jitter (inclusive)
    pub jitter_min: f32,
    /// Upper bound of the per-cycle jitter (exclusive)
    pub jitter_max: f32,
    /// Edge length of each group's display surface
    pub surface_size: u32,
    /// Half-period of the recording indicator blink
    pub blink_interval: f32,
    /// How long toggle feedback text stays up
    pub message_duration: f32,
    /// Seed for the jitter generator; entropy when unset
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            cycle_interval: 2.0,
            jitter_min: 0.1,
            jitter_max: 0.3,
            surface_size: 512,
            blink_interval: 1.0,
            message_duration: 2.0,
            seed: None,
        }
    }
}

/// Monitor docking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingConfig {
    /// Maximum aim distance to a monitor or toggle button
    pub interact_range: f32,
    /// Exponential approach rate toward the docked pose
    pub lerp_speed: f32,
    /// Distance in front of the monitor where the eye docks
    pub standoff: f32,
}

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            interact_range: 4.0,
            lerp_speed: 4.0,
            standoff: 0.5,
        }
    }
}

/// Door tuning and door names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    /// Scene names of the doors to manage
    pub names: Vec<String>,
    /// Open angle in degrees
    pub open_angle: f32,
    /// Full peek angle in degrees
    pub peek_angle: f32,
    pub open_speed: f32,
    pub peek_speed: f32,
    pub slam_speed: f32,
    /// Fraction of the peek angle used while interact is held
    pub peek_amount: f32,
    /// Distance at or below which the door peeks and glows near
    pub near_distance: f32,
    /// Distance at or below which the door toggles and glows far
    pub far_distance: f32,
    pub interact_range: f32,
    pub open_cue: Option<String>,
    pub close_cue: Option<String>,
    pub peek_cue: Option<String>,
    pub slam_cue: Option<String>,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            open_angle: 90.0,
            peek_angle: 30.0,
            open_speed: 3.0,
            peek_speed: 1.5,
            slam_speed: 6.0,
            peek_amount: 0.5,
            near_distance: 2.0,
            far_distance: 4.0,
            interact_range: 4.0,
            open_cue: Some("event:/Door/Open".to_string()),
            close_cue: Some("event:/Door/Close".to_string()),
            peek_cue: Some("event:/Door/Peek".to_string()),
            slam_cue: Some("event:/Door/Slam".to_string()),
        }
    }
}

/// Auxiliary trail feeds, viewed full-screen one at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Camera names, in cycle order
    pub feeds: Vec<String>,
    /// How long the "TRAIL CAM n" label stays up
    pub label_duration: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            label_duration: 1.5,
        }
    }
}

/// One feed group: a monitor, an optional toggle button, and its cameras.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub monitor: String,
    #[serde(default)]
    pub toggle: Option<String>,
    #[serde(default)]
    pub feeds: Vec<String>,
    /// Overrides `feeds.cycle_interval` for this group
    #[serde(default)]
    pub cycle_interval: Option<f32>,
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Viewpoint rig configuration

[bindings]
switch_device = "q"
cycle = "tab"
cancel = "escape"
interact = "e"
aim = "mouse_right"
capture = "mouse_right"

[devices]
lowered_offset = [0.0, -0.5, 0.0]
switch_speed = 5.0
polaroid_raised_height = 0.2
surface_size = 512

[devices.neutral]
model = "empty_hands"

[devices.camcorder]
model = "camcorder"
camera = "camcorder_cam"
rest_offset = [0.35, -0.3, -0.6]
raise_cue = "event:/Camcorder/Raise"
lower_cue = "event:/Camcorder/Lower"

[devices.polaroid]
model = "polaroid"
camera = "polaroid_cam"
held_photo = "held_photo"
rest_offset = [0.3, -0.3, -0.55]
raise_cue = "event:/Polaroid/Raise"
lower_cue = "event:/Polaroid/Lower"
shutter_cue = "event:/Polaroid/Shutter"

[feeds]
cycle_interval = 2.0
jitter_min = 0.1
jitter_max = 0.3
surface_size = 512
blink_interval = 1.0
message_duration = 2.0

[docking]
interact_range = 4.0
lerp_speed = 4.0
standoff = 0.5

[doors]
names = ["office_door"]
open_angle = 90.0
peek_angle = 30.0
open_speed = 3.0
peek_speed = 1.5
slam_speed = 6.0
peek_amount = 0.5
near_distance = 2.0
far_distance = 4.0
interact_range = 4.0

[trail]
feeds = ["trail_cam_1", "trail_cam_2", "trail_cam_3"]
label_duration = 1.5

[[groups]]
name = "Lobby"
monitor = "lobby_monitor"
toggle = "lobby_button"
feeds = ["lobby_cam_1", "lobby_cam_2", "lobby_cam_3"]

[[groups]]
name = "Warehouse"
monitor = "warehouse_monitor"
toggle = "warehouse_button"
feeds = ["warehouse_cam_1", "warehouse_cam_2"]
cycle_interval = 3.0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RigConfig::default();

        assert_eq!(config.feeds.cycle_interval, 2.0);
        assert_eq!(config.feeds.jitter_min, 0.1);
        assert_eq!(config.feeds.jitter_max, 0.3);
        assert_eq!(config.docking.standoff, 0.5);
        assert_eq!(config.devices.switch_speed, 5.0);
        assert!(config.groups.is_empty());
    }

    #[test]
    fn test_door_config_default() {
        let doors = DoorConfig::default();

        assert_eq!(doors.open_angle, 90.0);
        assert_eq!(doors.peek_speed, 1.5);
        assert_eq!(doors.slam_speed, 6.0);
        assert_eq!(doors.near_distance, 2.0);
        assert_eq!(doors.far_distance, 4.0);
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            [feeds]
            cycle_interval = 5.0
            seed = 7

            [docking]
            standoff = 0.8

            [[groups]]
            name = "Vault"
            monitor = "vault_monitor"
            feeds = ["vault_a", "vault_b"]
        "#;

        let config = RigConfig::from_str(toml).unwrap();

        assert_eq!(config.feeds.cycle_interval, 5.0);
        assert_eq!(config.feeds.seed, Some(7));
        assert_eq!(config.docking.standoff, 0.8);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].toggle, None);
        assert_eq!(config.groups[0].feeds, vec!["vault_a", "vault_b"]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [feeds]
            cycle_interval = 1.0
        "#;

        let config = RigConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.feeds.cycle_interval, 1.0);
        // Default values
        assert_eq!(config.feeds.jitter_max, 0.3);
        assert_eq!(config.docking.interact_range, 4.0);
        assert_eq!(config.bindings.interact, "e");
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = RigConfig::from_str(&default_config_toml()).unwrap();

        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.groups[1].cycle_interval, Some(3.0));
        assert_eq!(config.trail.feeds.len(), 3);
        assert_eq!(config.devices.lowered_offset, Vec3::new(0.0, -0.5, 0.0));
        assert_eq!(config.doors.names, vec!["office_door"]);
    }

    #[test]
    fn test_config_to_toml() {
        let toml = RigConfig::default().to_toml().unwrap();

        assert!(toml.contains("[feeds]"));
        assert!(toml.contains("[docking]"));
    }

    #[test]
    fn test_config_toml_round_trip() {
        let original = RigConfig::from_str(&default_config_toml()).unwrap();
        let reparsed = RigConfig::from_str(&original.to_toml().unwrap()).unwrap();

        assert_eq!(reparsed.bindings.cycle, original.bindings.cycle);
        assert_eq!(reparsed.devices.lowered_offset, original.devices.lowered_offset);
        assert_eq!(reparsed.devices.polaroid.held_photo, original.devices.polaroid.held_photo);
        assert_eq!(reparsed.feeds.seed, None);
        assert_eq!(reparsed.doors.names, original.doors.names);
        assert_eq!(reparsed.trail.feeds, original.trail.feeds);
        assert_eq!(reparsed.groups.len(), 2);
        assert_eq!(reparsed.groups[0].toggle.as_deref(), Some("lobby_button"));
        assert_eq!(reparsed.groups[1].cycle_interval, Some(3.0));
        assert_eq!(reparsed.groups[1].feeds, original.groups[1].feeds);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.toml");
        std::fs::write(&path, default_config_toml()).unwrap();

        let config = RigConfig::from_file(&path).unwrap();
        assert_eq!(config.groups[0].name, "Lobby");

        let missing = RigConfig::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_key_for_action() {
        let bindings = KeyBindings::default();

        assert_eq!(bindings.key_for(Action::SwitchDevice), "q");
        assert_eq!(bindings.key_for(Action::Cancel), "escape");
        assert_eq!(bindings.key_for(Action::Capture), "mouse_right");
    }
}
