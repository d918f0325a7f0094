//! Opaque handles for the resources the core refers to.
//!
//! Handles are allocated by whichever backend owns the real resource
//! (headless recorder or the Bevy viewer). The core never looks inside them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

handle!(
    /// A camera: the free-look eye, a feed, or a handheld device camera.
    CameraId,
    "cam"
);
handle!(
    /// A render surface a camera can draw into.
    SurfaceId,
    "surface"
);
handle!(
    /// A display material whose texture input can be retargeted.
    MaterialId,
    "mat"
);
handle!(
    /// A visible model (device body, held photo, empty-hands marker).
    ModelId,
    "model"
);
handle!(
    /// A small on/off indicator such as a recording light.
    IndicatorId,
    "ind"
);
handle!(
    /// A door with a hinge pivot.
    DoorId,
    "door"
);

/// Dense index of a feed group, assigned at setup.
///
/// The group's name is kept on the group itself for configuration and logs;
/// lookups on the hot path are a bounds check on this index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group_{}", self.0)
    }
}

/// Where a camera's image goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "surface")]
pub enum RenderTarget {
    /// Straight to the player's screen.
    Screen,
    /// Into an offscreen surface.
    Surface(SurfaceId),
}

/// What a display material currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "surface")]
pub enum MaterialBinding {
    /// A live surface written by a camera.
    Live(SurfaceId),
    /// The static "camera offline" placeholder texture.
    Placeholder,
}

impl MaterialBinding {
    /// Returns the bound surface if the binding is live.
    pub fn surface(&self) -> Option<SurfaceId> {
        match self {
            MaterialBinding::Live(surface) => Some(*surface),
            MaterialBinding::Placeholder => None,
        }
    }
}

/// Interaction highlight level on a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glow {
    #[default]
    Off,
    /// Within toggle range.
    Far,
    /// Within peek range.
    Near,
}

/// Handheld devices, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Empty hands.
    #[default]
    Neutral,
    /// Live-view recorder with an LCD screen.
    Camcorder,
    /// Still camera that produces a held photo.
    Polaroid,
}

impl DeviceKind {
    /// The cycle order, starting at `Neutral`.
    pub const CYCLE: [DeviceKind; 3] = [
        DeviceKind::Neutral,
        DeviceKind::Camcorder,
        DeviceKind::Polaroid,
    ];

    /// Returns the next device in cycle order.
    pub fn next(self) -> Self {
        match self {
            DeviceKind::Neutral => DeviceKind::Camcorder,
            DeviceKind::Camcorder => DeviceKind::Polaroid,
            DeviceKind::Polaroid => DeviceKind::Neutral,
        }
    }

    /// Position in [`DeviceKind::CYCLE`].
    pub fn index(self) -> usize {
        match self {
            DeviceKind::Neutral => 0,
            DeviceKind::Camcorder => 1,
            DeviceKind::Polaroid => 2,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Neutral => write!(f, "neutral"),
            DeviceKind::Camcorder => write!(f, "camcorder"),
            DeviceKind::Polaroid => write!(f, "polaroid"),
        }
    }
}
