//! Observable transitions emitted by the core, one per JSONL line.

use serde::{Deserialize, Serialize};

use crate::handles::{CameraId, DeviceKind, DoorId, GroupId};

/// A single logged transition with the frame it happened on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamEvent {
    /// Frame counter of the driving loop.
    pub tick: u64,
    /// Seconds since session start.
    pub time: f32,
    #[serde(flatten)]
    pub kind: CamEventKind,
}

impl CamEvent {
    pub fn new(tick: u64, time: f32, kind: CamEventKind) -> Self {
        Self { tick, time, kind }
    }

    /// Serializes to a single JSON line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses one JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Why a group's displayed feed changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleCause {
    /// The group's own timer fired.
    Auto,
    /// The player cycled while docked.
    Manual,
}

/// Sub-mode of the device currently in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandheldMode {
    ViewfinderOpened,
    ViewfinderClosed,
    PhotoCaptured,
    PhotoHeld,
    PhotoPutAway,
}

/// What a door started doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorMotion {
    Opened,
    Closed,
    PeekStarted,
    PeekStopped,
    Slammed,
}

/// Every transition a host may want to log or react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CamEventKind {
    DeviceSwitchStarted { from: DeviceKind, to: DeviceKind },
    DeviceSwitchCompleted { device: DeviceKind },
    Handheld { device: DeviceKind, mode: HandheldMode },
    TrailViewEntered { index: usize, camera: CameraId },
    TrailViewCycled { index: usize, camera: CameraId },
    TrailViewExited,
    FeedCycled { group: GroupId, index: usize, cause: CycleCause },
    GroupToggled { group: GroupId, active: bool },
    DockingStarted { group: GroupId },
    DockingAborted { group: GroupId },
    Docked { group: GroupId, camera: CameraId },
    Undocked { group: GroupId },
    Door { door: DoorId, motion: DoorMotion },
}

impl CamEventKind {
    /// Short snake_case name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            CamEventKind::DeviceSwitchStarted { .. } => "device_switch_started",
            CamEventKind::DeviceSwitchCompleted { .. } => "device_switch_completed",
            CamEventKind::Handheld { .. } => "handheld",
            CamEventKind::TrailViewEntered { .. } => "trail_view_entered",
            CamEventKind::TrailViewCycled { .. } => "trail_view_cycled",
            CamEventKind::TrailViewExited => "trail_view_exited",
            CamEventKind::FeedCycled { .. } => "feed_cycled",
            CamEventKind::GroupToggled { .. } => "group_toggled",
            CamEventKind::DockingStarted { .. } => "docking_started",
            CamEventKind::DockingAborted { .. } => "docking_aborted",
            CamEventKind::Docked { .. } => "docked",
            CamEventKind::Undocked { .. } => "undocked",
            CamEventKind::Door { .. } => "door",
        }
    }
}
