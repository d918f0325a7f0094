//! Shared handle, pose and event types for the viewpoint workspace.
//!
//! This crate contains pure data structures with no state-machine logic.
//! The core library, the headless runner and the viewer all depend on it.

pub mod event;
pub mod handles;
pub mod pose;

pub use event::{CamEvent, CamEventKind, CycleCause, DoorMotion, HandheldMode};
pub use handles::{
    CameraId, DeviceKind, DoorId, Glow, GroupId, IndicatorId, MaterialBinding, MaterialId,
    ModelId, RenderTarget, SurfaceId,
};
pub use pose::{look_rotation, Pose};

pub use bevy_math::{Quat, Vec2, Vec3};
